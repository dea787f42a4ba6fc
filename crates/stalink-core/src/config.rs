use embassy_time::Duration;
use thiserror_no_std::Error;

/// Retry budget used when nothing else is configured
pub const DEFAULT_RETRY_LIMIT: u8 = 5;

/// Connect wait used when nothing else is configured
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 15_000;

pub const MAX_RETRY_LIMIT: u8 = 32;
pub const MIN_CONNECT_TIMEOUT_MS: u64 = 100;
pub const MAX_CONNECT_TIMEOUT_MS: u64 = 600_000;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("retry limit is not a number between 0 and 255")]
    InvalidRetryLimit,
    #[error("connect timeout is not a number of milliseconds")]
    InvalidConnectTimeout,
}

/// Connection tuning for [`ConnectionOrchestrator::connect`](crate::ConnectionOrchestrator::connect)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkConfig {
    pub retry_limit: u8,
    pub connect_timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            retry_limit: DEFAULT_RETRY_LIMIT,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }
}

impl LinkConfig {
    pub const fn with_retry_limit(mut self, retry_limit: u8) -> Self {
        self.retry_limit = retry_limit;
        self
    }

    pub const fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Build from optional environment strings, keeping defaults for absent ones
    ///
    /// Firmware feeds this from `option_env!`, the simulator from `std::env`.
    pub fn from_env_strs(
        retry_limit: Option<&str>,
        connect_timeout_ms: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = retry_limit {
            config.retry_limit = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidRetryLimit)?;
        }
        if let Some(value) = connect_timeout_ms {
            let millis: u64 = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidConnectTimeout)?;
            config.connect_timeout = Duration::from_millis(millis);
        }

        Ok(config.sanitized())
    }

    /// Clamp values into the ranges the orchestrator is meant to run with
    pub fn sanitized(self) -> Self {
        let millis = self
            .connect_timeout
            .as_millis()
            .clamp(MIN_CONNECT_TIMEOUT_MS, MAX_CONNECT_TIMEOUT_MS);
        Self {
            retry_limit: self.retry_limit.min(MAX_RETRY_LIMIT),
            connect_timeout: Duration::from_millis(millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LinkConfig::default();

        assert_eq!(config.retry_limit, 5);
        assert_eq!(config.connect_timeout.as_millis(), 15_000);
    }

    #[test]
    fn test_absent_values_keep_defaults() {
        assert_eq!(
            LinkConfig::from_env_strs(None, None),
            Ok(LinkConfig::default())
        );
    }

    #[test]
    fn test_parses_values() {
        let config = LinkConfig::from_env_strs(Some("3"), Some(" 20000 ")).unwrap();

        assert_eq!(config.retry_limit, 3);
        assert_eq!(config.connect_timeout.as_millis(), 20_000);
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(
            LinkConfig::from_env_strs(Some("five"), None),
            Err(ConfigError::InvalidRetryLimit)
        );
        assert_eq!(
            LinkConfig::from_env_strs(None, Some("-1")),
            Err(ConfigError::InvalidConnectTimeout)
        );
    }

    #[test]
    fn test_sanitized_clamps() {
        let config = LinkConfig::default()
            .with_retry_limit(200)
            .with_connect_timeout(Duration::from_millis(5))
            .sanitized();

        assert_eq!(config.retry_limit, MAX_RETRY_LIMIT);
        assert_eq!(config.connect_timeout.as_millis(), MIN_CONNECT_TIMEOUT_MS);
    }
}
