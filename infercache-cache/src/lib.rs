//! # infercache-cache
//!
//! Content-addressed local cache for inference responses.
//!
//! [`CachingClient`] wraps any [`QueryExecutor`](infercache_core::QueryExecutor)
//! and answers repeated identical queries from a [`CacheStore`] instead of
//! the network.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheKey`] | SHA-256 over the key-sorted JSON of `{model, payload}` |
//! | [`CacheStore`] | Trait for cache backends |
//! | [`DiskCache`] | One `<key>.json` file per entry, written atomically |
//! | [`MemoryCache`] | In-process backend |
//! | [`CachingClient`] | The decorator itself |
//! | [`CacheStats`] | Hit/miss/store counters |
//!
//! Only non-empty bodies without a top-level `error` key are stored.
//! Entries never expire.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod key;
pub mod store;

pub use client::{CacheStats, CachingClient};
pub use config::{CacheConfig, DEFAULT_CACHE_DIR};
pub use key::{canonical_json, canonicalize, CacheKey};
pub use store::{CacheStore, DiskCache, MemoryCache};
