//! Client configuration: where the API lives and how long to wait for it.

use hrdesk_core::error::{HrdeskError, HrdeskResult};
use std::time::Duration;
use url::Url;

/// Base address used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";

/// Per-request timeout used when nothing else is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variables the CLI falls back to for these settings.
pub const ENV_BASE_URL: &str = "HRDESK_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "HRDESK_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Validated absolute http(s) address, without a trailing slash.
    base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Validates `base_url` and applies the default timeout.
    ///
    /// ```ignore
    /// let config = ClientConfig::new("https://hr.example.com/api/v1")?;
    /// ```
    pub fn new(base_url: &str) -> HrdeskResult<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(HrdeskError::InvalidInput("API base URL must not be empty".into()));
        }

        let parsed = Url::parse(trimmed)
            .map_err(|e| HrdeskError::InvalidInput(format!("invalid API base URL {trimmed:?}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(HrdeskError::InvalidInput(format!(
                "API base URL must be http or https, got {:?}",
                parsed.scheme()
            )));
        }

        Ok(Self {
            base_url: trimmed.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base address concatenated with a resource path.
    pub fn url_for(&self, path: &str) -> String {
        if path.is_empty() || path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped() {
        let c = ClientConfig::new("http://hr.local/api/v1/").unwrap();
        assert_eq!(c.base_url(), "http://hr.local/api/v1");
        assert_eq!(c.url_for("/employees"), "http://hr.local/api/v1/employees");
        assert_eq!(c.url_for("employees/7"), "http://hr.local/api/v1/employees/7");
    }

    #[test]
    fn rejects_empty_and_non_http() {
        assert!(ClientConfig::new("  ").is_err());
        assert!(ClientConfig::new("not a url").is_err());
        assert!(ClientConfig::new("ftp://hr.local").is_err());
    }

    #[test]
    fn default_points_at_local_server() {
        assert_eq!(ClientConfig::default().base_url(), DEFAULT_BASE_URL);
        assert_eq!(ClientConfig::default().timeout, DEFAULT_TIMEOUT);
    }
}
