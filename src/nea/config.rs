// src/nea/config.rs
use std::time::Duration;
use crate::utils::error::AppError;

/// NEA haze page carrying the 3-hour and 24-hour PSI readings.
pub const DEFAULT_SOURCE_URL: &str = "http://www.haze.gov.sg/haze-updates/psi";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const SOURCE_URL_ENV: &str = "PSI_SOURCE_URL";
const TIMEOUT_ENV: &str = "PSI_TIMEOUT_SECS";

/// Where and how a `Reading` fetches its page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingConfig {
    pub source_url: String,
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ReadingConfig {
    /// Defaults, overridden by `PSI_SOURCE_URL` and `PSI_TIMEOUT_SECS` when set.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<L>(lookup: L) -> Result<Self, AppError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(SOURCE_URL_ENV) {
            tracing::debug!("Using {} from environment: {}", SOURCE_URL_ENV, url);
            config.source_url = url;
        }

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs = raw.trim().parse::<u64>().map_err(|e| {
                AppError::Config(format!("{} must be a whole number of seconds, got '{}': {}", TIMEOUT_ENV, raw, e))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
