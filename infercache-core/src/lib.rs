//! # infercache-core
//!
//! Core types, the executor trait, and error handling shared by the
//! infercache crates.
//!
//! - **Queries**: [`Query`], [`Payload`], [`ResponseBody`]
//! - **Executor seam**: [`QueryExecutor`], implemented by the retrying
//!   executor and the caching decorator
//! - **Errors**: [`QueryError`] and its source types
//! - **Credentials**: [`ApiToken`]
//! - **Dialects**: [`translate::to_chat_request`] and [`response`] helpers
//!
//! ## Example
//!
//! ```rust
//! use infercache_core::{response, translate, Query};
//! use serde_json::json;
//!
//! let query = Query::from_value(
//!     "openrouter/auto",
//!     json!({"inputs": "Hello!", "parameters": {"max_new_tokens": 50}}),
//! )
//! .unwrap();
//!
//! let wire = translate::to_chat_request(&query.model, &query.payload);
//! assert_eq!(wire["max_tokens"], json!(50));
//! assert!(!response::has_error_indicator(&wire));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod credentials;
pub mod errors;
pub mod query;
pub mod response;
pub mod translate;

pub use credentials::ApiToken;
pub use errors::{CacheError, CredentialError, QueryError, QueryResult};
pub use query::{ensure_model, Payload, Query, QueryExecutor, ResponseBody};
