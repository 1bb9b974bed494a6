use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};
use dolua::api::Sdk;
use dolua::cloud::spy::SpyCloud;
use dolua::cloud::{use_sdk, Cloud, CloudClient};
use dolua::script::{self, ScriptHost};
use dolua::{config, repl};
use mlua::Lua;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Version injected at compile time via DOLUA_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("DOLUA_VERSION") {
    Some(v) => v,
    None => "dev",
};

/// Lua REPL and script runner for the DigitalOcean cloud
#[derive(Parser, Debug)]
#[command(name = "dolua", version, about, long_about = None)]
struct Args {
    /// DigitalOcean API token, overrides the environment
    #[arg(long = "api.token", value_name = "TOKEN")]
    api_token: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    /// Lua scripts to run instead of the interactive prompt
    scripts: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = config::log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("dolua started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let Some(token) = config::resolve_token(args.api_token.as_deref()) else {
        bail!(
            "no API token found, set --api.token or one of: {}",
            config::TOKEN_ENV_VARS.join(", ")
        );
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let cancel = CancellationToken::new();

    let sdk = Sdk::new(token)?;
    let client = CloudClient::new(cancel.clone(), vec![use_sdk(sdk)])?;
    let spy = SpyCloud::new(Arc::new(client));

    let account = runtime
        .block_on(spy.accounts().get())
        .context("can't query DigitalOcean account, is your token valid?")?;
    tracing::info!("authenticated as {}", account.email);

    let host = ScriptHost::new(
        spy.clone() as Arc<dyn Cloud>,
        runtime.handle().clone(),
        cancel.clone(),
    );
    let lua = Lua::new();
    script::install(&lua, &host).map_err(|e| anyhow!("preparing the scripting runtime: {e}"))?;

    let result = if args.scripts.is_empty() {
        println!("Welcome to the DigitalOcean REPL, where all your dreams come true!");
        println!("logged in as {}", account.email);
        repl::run(&lua)
    } else {
        run_scripts(&lua, &args.scripts)
    };

    cancel.cancel();

    let leftovers = spy.report();
    if !leftovers.is_empty() {
        eprintln!("quitting! the following resources were created and not deleted:");
        for line in leftovers {
            eprintln!("  {line}");
        }
    }

    result
}

fn run_scripts(lua: &Lua, scripts: &[PathBuf]) -> Result<()> {
    for path in scripts {
        run_script(lua, path)?;
    }
    Ok(())
}

fn run_script(lua: &Lua, path: &Path) -> Result<()> {
    let source =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let values = lua
        .load(strip_shebang(&source))
        .set_name(path.display().to_string())
        .eval::<mlua::MultiValue>()
        .map_err(|e| anyhow!("{e}"))?;
    // One compact document per script, even when the script returns nothing.
    let value = values.into_iter().next().unwrap_or(mlua::Value::Nil);
    let rendered = serde_json::to_string(&value).unwrap_or_else(|_| "null".to_string());
    println!("{rendered}");
    Ok(())
}

// Scripts may start with `#!/usr/bin/env dolua`; Lua has no shebang support
// of its own so the first line is dropped here.
fn strip_shebang(src: &str) -> &str {
    if let Some(rest) = src.strip_prefix("#!") {
        match rest.find('\n') {
            Some(i) => &rest[i + 1..],
            None => "",
        }
    } else {
        src
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shebang_line_is_dropped() {
        assert_eq!(strip_shebang("#!/usr/bin/env dolua\nprint(1)"), "print(1)");
        assert_eq!(strip_shebang("print(1)"), "print(1)");
        assert_eq!(strip_shebang("#!/usr/bin/env dolua"), "");
    }
}
