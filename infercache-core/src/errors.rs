//! Error types for infercache.
//!
//! Every failure a query can end in surfaces as a [`QueryError`]. The
//! retry layer produces the HTTP and timeout variants, the cache layer
//! produces [`CacheError`], and credential loading produces
//! [`CredentialError`].

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// The main error type for infercache operations.
#[derive(Error, Debug)]
pub enum QueryError {
    /// Non-retryable status returned by the remote endpoint.
    #[error("HTTP error {status}: {body}")]
    FatalHttp {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Retryable conditions persisted past the attempt budget.
    #[error(
        "Failed after {attempts} attempts. Last status: {}, Body: {body_excerpt}",
        LastStatus(.last_status)
    )]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Status of the last response, if any response was received.
        last_status: Option<u16>,
        /// Truncated body of the last response.
        body_excerpt: String,
    },

    /// The final attempt timed out.
    #[error("Request timed out after {timeout:?} on final attempt {attempts}")]
    TimeoutExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Per-request timeout that was exceeded.
        timeout: Duration,
    },

    /// Transport failure other than a timeout.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Successful status with a body that could not be used.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The request was rejected before being sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The call was cancelled.
    #[error("Query cancelled")]
    Cancelled,

    /// Credential problem.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Cache store failure.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl QueryError {
    /// Create a fatal HTTP error.
    pub fn fatal_http(status: u16, body: impl Into<String>) -> Self {
        Self::FatalHttp {
            status,
            body: body.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an invalid response error.
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Create an invalid request error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Get the HTTP status associated with this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::FatalHttp { status, .. } => Some(*status),
            Self::RetriesExhausted { last_status, .. } => *last_status,
            _ => None,
        }
    }

    /// Whether the failure came from conditions that are retryable in
    /// principle (the budget ran out rather than the server refusing).
    #[must_use]
    pub fn is_retryable_condition(&self) -> bool {
        matches!(
            self,
            Self::RetriesExhausted { .. } | Self::TimeoutExhausted { .. }
        )
    }
}

/// Displays a last-seen status, or `none` when nothing was received.
struct LastStatus<'a>(&'a Option<u16>);

impl fmt::Display for LastStatus<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(status) => write!(f, "{}", status),
            None => f.write_str("none"),
        }
    }
}

/// Errors raised while loading or validating an API token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// No token in the environment.
    #[error("{var} not found. Set the environment variable to your API token.")]
    Missing {
        /// Environment variable that was consulted.
        var: String,
    },

    /// Token does not carry a known prefix.
    #[error("Invalid token format. Expected HuggingFace (hf_) or OpenRouter (sk-or-v1-) token.")]
    InvalidFormat,
}

/// Errors raised by cache stores.
#[derive(Error, Debug)]
pub enum CacheError {
    /// IO error.
    #[error("Cache IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;
