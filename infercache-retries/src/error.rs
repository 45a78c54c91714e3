//! Transport error types.

use thiserror::Error;

/// Errors raised while sending a single request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete in time.
    #[error("Timeout")]
    Timeout,

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Other error.
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl TransportError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Check if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connection(err.to_string())
        } else {
            TransportError::Other(err.into())
        }
    }
}

/// Keep at most `len` characters of a response body.
pub fn excerpt(body: &str, len: usize) -> String {
    body.chars().take(len).collect()
}
