//! # infercache - Resilient, cached access to hosted inference endpoints
//!
//! infercache sends prompts to a remote, OpenAI-compatible chat-completion
//! endpoint and survives the usual failures of shared inference services:
//! cold-starting models, rate limits and slow responses. Successful answers
//! are kept on local disk so identical queries never hit the network twice.
//!
//! ## Quick Start
//!
//! ```ignore
//! use infercache::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = InferenceClient::from_env()?;
//!     let answer = client
//!         .text_generation("What is retrieval-augmented generation?", None)
//!         .await?;
//!     println!("{answer}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`infercache_core`] - Query types, tokens, errors, the executor trait
//! - [`infercache_retries`] - HTTP transport and the retrying executor
//! - [`infercache_cache`] - Content-addressed response cache
//!
//! ## Environment
//!
//! | Variable | Purpose |
//! |----------|---------|
//! | `HUGGINGFACE_API_TOKEN` | API token (`hf_` or `sk-or-v1-` prefix); `HF_TOKEN` is also read |
//! | `INFERENCE_ENDPOINT_URL` | Override the chat-completion endpoint |
//! | `INFERENCE_CACHE_DIR` | Override the cache directory (default `.cache/hf_responses`) |

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod tasks;

pub use client::{
    DefaultExecutor, EndpointConfig, InferenceClient, InferenceClientBuilder, CACHE_DIR_ENV_VAR,
    ENDPOINT_ENV_VAR,
};
pub use tasks::DEFAULT_MODEL;

pub use infercache_cache::{CacheConfig, CacheStats, CachingClient, DiskCache, MemoryCache};
pub use infercache_core::{
    ApiToken, CredentialError, Payload, Query, QueryError, QueryExecutor, QueryResult,
    ResponseBody,
};
pub use infercache_retries::{
    CancellationToken, ReqwestTransport, ResilientExecutor, RetryConfig, RetryState,
};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        ApiToken, CacheConfig, InferenceClient, Payload, Query, QueryError, QueryExecutor,
        QueryResult, RetryConfig,
    };
}
