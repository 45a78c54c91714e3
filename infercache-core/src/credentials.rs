//! API token loading and validation.

use crate::errors::CredentialError;
use std::fmt;

/// Primary environment variable holding the API token.
pub const TOKEN_ENV_VAR: &str = "HUGGINGFACE_API_TOKEN";

/// Fallback environment variable.
pub const FALLBACK_TOKEN_ENV_VAR: &str = "HF_TOKEN";

const ACCEPTED_PREFIXES: &[&str] = &["hf_", "sk-or-v1-"];

/// A validated bearer token.
///
/// The token value is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Validate a token string.
    pub fn new(token: impl Into<String>) -> Result<Self, CredentialError> {
        let token = token.into();
        let token = token.trim();
        if token.is_empty() {
            return Err(CredentialError::Missing {
                var: TOKEN_ENV_VAR.to_string(),
            });
        }
        if !ACCEPTED_PREFIXES.iter().any(|p| token.starts_with(p)) {
            return Err(CredentialError::InvalidFormat);
        }
        Ok(Self(token.to_string()))
    }

    /// Load from `HUGGINGFACE_API_TOKEN`, falling back to `HF_TOKEN`.
    pub fn from_env() -> Result<Self, CredentialError> {
        let token = std::env::var(TOKEN_ENV_VAR)
            .or_else(|_| std::env::var(FALLBACK_TOKEN_ENV_VAR))
            .map_err(|_| CredentialError::Missing {
                var: TOKEN_ENV_VAR.to_string(),
            })?;
        Self::new(token)
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// The raw token.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiToken").field(&"<redacted>").finish()
    }
}
