//! Cache configuration.

use std::path::PathBuf;

/// Default cache directory, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = ".cache/hf_responses";

/// Configuration for the response cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Directory holding cache entries.
    pub directory: PathBuf,
    /// When false, every query goes to the executor and nothing is stored.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_CACHE_DIR),
            enabled: true,
        }
    }
}

impl CacheConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache directory.
    #[must_use]
    pub fn directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directory = dir.into();
        self
    }

    /// Enable or disable caching.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}
