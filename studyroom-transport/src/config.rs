use std::time::Duration;

/// Environment variable holding the API origin, e.g. `https://api.example.com`.
pub const API_URL_ENV: &str = "STUDYROOM_API_URL";
/// Environment variable holding the per-request timeout in milliseconds.
pub const REQUEST_TIMEOUT_ENV: &str = "STUDYROOM_REQUEST_TIMEOUT_MS";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportConfig {
    /// Origin every request path is appended to. Stored without a trailing `/`.
    pub base_url: String,
    pub request_timeout: Duration,
}

impl TransportConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn localnet() -> Self {
        Self::new("http://localhost:8080")
    }

    /// Reads [`API_URL_ENV`] and [`REQUEST_TIMEOUT_ENV`], falling back to the
    /// [`localnet`](Self::localnet) values for anything missing or malformed.
    pub fn from_env() -> Self {
        let mut config = match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::localnet(),
        };
        if let Some(timeout) = std::env::var(REQUEST_TIMEOUT_ENV)
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
        {
            config.request_timeout = Duration::from_millis(timeout);
        }
        config
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Joins `path` onto the base url. `path` may or may not start with `/`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::localnet()
    }
}
