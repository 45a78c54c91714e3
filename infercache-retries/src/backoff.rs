//! Response classification and backoff computation.

use crate::config::RetryConfig;
use std::time::Duration;

/// Status returned while the backing model is still loading.
pub const STATUS_MODEL_LOADING: u16 = 503;

/// Status returned when the caller is rate limited.
pub const STATUS_RATE_LIMITED: u16 = 429;

/// How a response status is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// 2xx: return the body.
    Success,
    /// Cold start: wait for the server's estimate, then retry.
    ModelLoading,
    /// Rate limited: exponential backoff, then retry.
    RateLimited,
    /// Anything else: fail without retrying.
    Fatal,
}

impl ResponseClass {
    /// Classify an HTTP status code.
    pub fn of(status: u16) -> Self {
        match status {
            200..=299 => Self::Success,
            STATUS_MODEL_LOADING => Self::ModelLoading,
            STATUS_RATE_LIMITED => Self::RateLimited,
            _ => Self::Fatal,
        }
    }

    /// Whether this class leads to another attempt.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::ModelLoading | Self::RateLimited)
    }
}

/// Why the executor is about to wait.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WaitReason {
    /// Cold start, with the server's estimate if it sent one.
    ModelLoading {
        /// Estimated time until the model is ready.
        estimated: Option<Duration>,
    },
    /// Rate limited.
    RateLimited,
    /// The request timed out.
    Timeout,
}

impl WaitReason {
    /// Calculate the wait before the next attempt.
    ///
    /// `attempt_index` is zero-based: the first rate-limit wait is
    /// `base_delay`, the second `2 * base_delay`, and so on.
    pub fn wait(&self, config: &RetryConfig, attempt_index: u32) -> Duration {
        match self {
            WaitReason::ModelLoading { estimated } => estimated
                .unwrap_or(config.cold_start_default_wait)
                .min(config.cold_start_max_wait),
            WaitReason::RateLimited => config
                .base_delay
                .saturating_mul(2u32.saturating_pow(attempt_index)),
            WaitReason::Timeout => config.base_delay,
        }
    }
}

/// Read `estimated_time` (seconds) from a cold-start body.
///
/// Missing, unparsable, negative and non-finite values yield `None`.
/// Values too large for a `Duration` saturate to `Duration::MAX`.
pub fn estimated_time(body: &str) -> Option<Duration> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let secs = value.get("estimated_time")?.as_f64()?;
    if secs.is_finite() && secs >= 0.0 {
        Some(Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
    } else {
        None
    }
}
