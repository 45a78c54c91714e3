//! Retry configuration.

use infercache_core::{QueryError, QueryResult};
use std::time::Duration;

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,
    /// Base delay for rate-limit and timeout backoff.
    pub base_delay: Duration,
    /// Upper bound on a single request.
    pub request_timeout: Duration,
    /// Wait used when a cold-start response carries no estimate.
    pub cold_start_default_wait: Duration,
    /// Cap applied to the server's cold-start estimate.
    pub cold_start_max_wait: Duration,
    /// Number of body characters kept in error diagnostics.
    pub excerpt_len: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(5),
            request_timeout: Duration::from_secs(120),
            cold_start_default_wait: Duration::from_secs(30),
            cold_start_max_wait: Duration::from_secs(60),
            excerpt_len: 200,
        }
    }
}

impl RetryConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max attempts.
    #[must_use]
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the base backoff delay.
    #[must_use]
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the base backoff delay in (fractional) seconds.
    ///
    /// Non-positive and non-finite values give a zero delay, which
    /// `validate` rejects. Values beyond `Duration` saturate.
    #[must_use]
    pub fn base_delay_secs(self, secs: f64) -> Self {
        let delay = if secs.is_finite() && secs > 0.0 {
            Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        };
        self.base_delay(delay)
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the cold-start default wait and its cap.
    #[must_use]
    pub fn cold_start_wait(mut self, default: Duration, max: Duration) -> Self {
        self.cold_start_default_wait = default;
        self.cold_start_max_wait = max;
        self
    }

    /// Set the diagnostic excerpt length.
    #[must_use]
    pub fn excerpt_len(mut self, len: usize) -> Self {
        self.excerpt_len = len;
        self
    }

    /// Check the invariants the executor relies on.
    pub fn validate(&self) -> QueryResult<()> {
        if self.max_attempts == 0 {
            return Err(QueryError::configuration("max_attempts must be at least 1"));
        }
        if self.base_delay.is_zero() {
            return Err(QueryError::configuration("base_delay must be positive"));
        }
        if self.request_timeout.is_zero() {
            return Err(QueryError::configuration("request_timeout must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.base_delay, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert_eq!(config.cold_start_default_wait, Duration::from_secs(30));
        assert_eq!(config.cold_start_max_wait, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = RetryConfig::new()
            .max_attempts(5)
            .base_delay_secs(0.5)
            .excerpt_len(40);

        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.base_delay, Duration::from_millis(500));
        assert_eq!(config.excerpt_len, 40);
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let err = RetryConfig::new().max_attempts(0).validate().unwrap_err();
        assert!(matches!(err, QueryError::Configuration(_)));
    }

    #[test]
    fn test_validate_rejects_bad_delay() {
        assert!(RetryConfig::new().base_delay_secs(-1.0).validate().is_err());
        assert!(RetryConfig::new().base_delay_secs(f64::NAN).validate().is_err());
        assert_eq!(RetryConfig::new().base_delay_secs(1e20).base_delay, Duration::MAX);
    }
}
