//! Runtime configuration: where the API token comes from and where logs go.

use std::path::PathBuf;

/// Environment variables consulted for the API token, most specific first.
/// The community never settled on one name, so we accept the usual suspects.
pub const TOKEN_ENV_VARS: &[&str] = &[
    "DIGITALOCEAN_ACCESS_TOKEN",
    "DIGITALOCEAN_TOKEN",
    "DIGITAL_OCEAN_TOKEN",
    "DIGITAL_OCEAN_ACCESS_TOKEN",
    "DO_TOKEN",
];

/// Resolve the API token: an explicit flag wins, then the environment.
pub fn resolve_token(flag: Option<&str>) -> Option<String> {
    if let Some(token) = flag {
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }
    for var in TOKEN_ENV_VARS {
        if let Ok(token) = std::env::var(var) {
            if !token.is_empty() {
                return Some(token);
            }
        }
    }
    None
}

/// Where debug logs land when logging is enabled.
pub fn log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("dolua").join("dolua.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".dolua").join("dolua.log");
    }
    PathBuf::from("dolua.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_environment() {
        assert_eq!(
            resolve_token(Some("from-flag")),
            Some("from-flag".to_string())
        );
    }

    #[test]
    fn empty_flag_is_ignored() {
        std::env::remove_var("DIGITALOCEAN_ACCESS_TOKEN");
        std::env::set_var("DO_TOKEN", "from-env");
        assert_eq!(resolve_token(Some("")), Some("from-env".to_string()));
        std::env::remove_var("DO_TOKEN");
    }
}
