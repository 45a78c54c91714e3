//! # infercache-retries
//!
//! Retry and backoff handling for hosted inference endpoints.
//!
//! [`ResilientExecutor`] runs one logical query through a [`Transport`],
//! absorbing the transient failures such endpoints produce:
//!
//! | Condition | Handling |
//! |-----------|----------|
//! | 2xx | return the parsed body |
//! | 503 (model loading) | wait `min(estimated_time, 60s)` (default 30s), retry |
//! | 429 (rate limited) | wait `base_delay * 2^attempt`, retry |
//! | timeout | wait `base_delay`, retry; fail on the last attempt |
//! | anything else | fail immediately |
//!
//! Every attempt counts against [`RetryConfig::max_attempts`]. Waits are
//! tokio suspension points and can be interrupted with a
//! `CancellationToken`.
//!
//! ## Example
//!
//! ```ignore
//! use infercache_core::{ApiToken, QueryExecutor};
//! use infercache_retries::{ReqwestTransport, ResilientExecutor, RetryConfig};
//!
//! let transport = ReqwestTransport::new(ApiToken::from_env()?);
//! let executor = ResilientExecutor::new(
//!     transport,
//!     RetryConfig::new().max_attempts(5).base_delay_secs(2.0),
//! )?;
//!
//! let body = executor.execute("openrouter/auto", &payload).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod backoff;
pub mod config;
pub mod error;
pub mod executor;
pub mod transport;

// Re-exports
pub use backoff::{ResponseClass, WaitReason, STATUS_MODEL_LOADING, STATUS_RATE_LIMITED};
pub use config::RetryConfig;
pub use error::TransportError;
pub use executor::{AttemptInfo, AttemptOutcome, ResilientExecutor, RetryState};
pub use transport::{
    default_endpoint, ReqwestTransport, ReqwestTransportBuilder, Transport, TransportResponse,
    DEFAULT_ENDPOINT,
};
pub use tokio_util::sync::CancellationToken;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{ReqwestTransport, ResilientExecutor, RetryConfig, RetryState, Transport};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let config = RetryConfig::new().max_attempts(5);
        assert_eq!(config.max_attempts, 5);
    }

    #[test]
    fn test_config_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.base_delay, Duration::from_secs(5));
    }

    #[test]
    fn test_status_constants() {
        assert_eq!(ResponseClass::of(STATUS_MODEL_LOADING), ResponseClass::ModelLoading);
        assert_eq!(ResponseClass::of(STATUS_RATE_LIMITED), ResponseClass::RateLimited);
        assert!(ResponseClass::ModelLoading.is_retryable());
        assert!(!ResponseClass::Fatal.is_retryable());
    }
}
