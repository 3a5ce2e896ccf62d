use std::time::Duration;

pub const VERIFICATION_TIMEOUT_ENV: &str = "STUDYROOM_VERIFICATION_TIMEOUT_MS";
pub const SUBMIT_TIMEOUT_ENV: &str = "STUDYROOM_SUBMIT_TIMEOUT_MS";

const DEFAULT_VERIFICATION_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(15);

/// How long the forms wait for the network before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormConfig {
    pub verification_timeout: Duration,
    pub submit_timeout: Duration,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            verification_timeout: DEFAULT_VERIFICATION_TIMEOUT,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
        }
    }
}

impl FormConfig {
    /// Defaults, overridden by the `*_TIMEOUT_MS` environment variables when
    /// they hold a number of milliseconds.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let millis = |name: &str| {
            lookup(name)
                .and_then(|raw| raw.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
        };
        let defaults = Self::default();
        Self {
            verification_timeout: millis(VERIFICATION_TIMEOUT_ENV).unwrap_or(defaults.verification_timeout),
            submit_timeout: millis(SUBMIT_TIMEOUT_ENV).unwrap_or(defaults.submit_timeout),
        }
    }

    pub fn with_verification_timeout(mut self, timeout: Duration) -> Self {
        self.verification_timeout = timeout;
        self
    }

    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }
}
