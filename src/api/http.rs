//! HTTP plumbing for the DigitalOcean REST API.

use super::error::ApiError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://api.digitalocean.com/";

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        format!(
            "{}... [truncated, {} bytes total]",
            &body[..MAX_LOG_BODY_LENGTH],
            body.len()
        )
    } else {
        body.to_string()
    };
    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// The thin SDK every resource client is built on: a `reqwest` client, a base
/// URL and an optional bearer token. Anonymous instances are accepted so the
/// mock harness can stand in without credentials.
#[derive(Debug, Clone)]
pub struct Sdk {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl Sdk {
    /// Create an SDK authenticated with the given API token.
    pub fn new(token: impl Into<String>) -> Result<Self, ApiError> {
        let mut sdk = Self::anonymous()?;
        sdk.token = Some(token.into());
        Ok(sdk)
    }

    /// Create an SDK with no credentials. Every live call will be rejected by
    /// the provider, which is the desired failure mode when a test forgets to
    /// install a mock.
    pub fn anonymous() -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("dolua/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            token: None,
        })
    }

    /// Point the SDK at another API endpoint. Used by tests to target a local
    /// mock server.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(&format!("v2/{path}"))
            .map_err(|e| ApiError::Remote(format!("invalid API path {path:?}: {e}")))
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = req.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(ApiError::from_status(status, &body));
        }

        // 204s and action-less deletes come back bodyless.
        let body = if body.is_empty() { "null" } else { &body };
        serde_json::from_str(body)
            .map_err(|e| ApiError::Remote(format!("failed to parse response JSON: {e}")))
    }

    /// GET `path` and decode the envelope.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        tracing::debug!("GET {}", path);
        let req = self.authorize(self.client.get(self.url(path)?));
        self.execute(req).await
    }

    /// POST a JSON body to `path` and decode the envelope.
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        tracing::debug!("POST {}", path);
        let req = self.authorize(self.client.post(self.url(path)?)).json(body);
        self.execute(req).await
    }

    /// PUT a JSON body to `path` and decode the envelope.
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        tracing::debug!("PUT {}", path);
        let req = self.authorize(self.client.put(self.url(path)?)).json(body);
        self.execute(req).await
    }

    /// DELETE `path`, tolerating an empty response body.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        tracing::debug!("DELETE {}", path);
        let req = self.authorize(self.client.delete(self.url(path)?));
        let _: serde_json::Value = self.execute(req).await?;
        Ok(())
    }

    /// DELETE `path` with a JSON body (rule/membership removals).
    pub async fn delete_with_body(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<(), ApiError> {
        tracing::debug!("DELETE {}", path);
        let req = self
            .authorize(self.client.delete(self.url(path)?))
            .json(body);
        let _: serde_json::Value = self.execute(req).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_join_under_v2() {
        let sdk = Sdk::anonymous().unwrap();
        assert_eq!(
            sdk.url("droplets?page=1&per_page=200").unwrap().as_str(),
            "https://api.digitalocean.com/v2/droplets?page=1&per_page=200"
        );
        assert_eq!(
            sdk.url("domains/example.com/records").unwrap().as_str(),
            "https://api.digitalocean.com/v2/domains/example.com/records"
        );
    }

    #[test]
    fn sanitize_truncates_long_bodies() {
        let long = "x".repeat(500);
        let cleaned = sanitize_for_log(&long);
        assert!(cleaned.contains("truncated, 500 bytes total"));
    }
}
