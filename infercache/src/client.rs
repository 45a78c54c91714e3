//! High-level inference client: retrying executor behind a disk cache.

use crate::tasks;
use infercache_cache::{CacheConfig, CacheStats, CacheStore, CachingClient, DiskCache};
use infercache_core::{
    credentials, response, ApiToken, CredentialError, Payload, QueryError, QueryExecutor,
    QueryResult, ResponseBody,
};
use infercache_retries::{
    default_endpoint, CancellationToken, ReqwestTransport, ResilientExecutor, RetryConfig,
};
use std::path::PathBuf;
use tracing::debug;
use url::Url;

/// Environment variable overriding the endpoint URL.
pub const ENDPOINT_ENV_VAR: &str = "INFERENCE_ENDPOINT_URL";

/// Environment variable overriding the cache directory.
pub const CACHE_DIR_ENV_VAR: &str = "INFERENCE_CACHE_DIR";

/// The executor stack built by [`InferenceClientBuilder`].
pub type DefaultExecutor = ResilientExecutor<ReqwestTransport>;

/// Client combining retries, caching and task helpers.
///
/// # Example
///
/// ```ignore
/// use infercache::InferenceClient;
///
/// let client = InferenceClient::from_env()?;
/// let answer = client
///     .text_generation("List 3 benefits of RAG:", None)
///     .await?;
/// ```
pub struct InferenceClient<E = DefaultExecutor, S = DiskCache> {
    inner: CachingClient<E, S>,
}

impl InferenceClient {
    /// Create a builder.
    pub fn builder() -> InferenceClientBuilder {
        InferenceClientBuilder::new()
    }

    /// Build from `HUGGINGFACE_API_TOKEN` (or `HF_TOKEN`), with optional
    /// `INFERENCE_ENDPOINT_URL` and `INFERENCE_CACHE_DIR` overrides.
    pub fn from_env() -> QueryResult<Self> {
        Self::builder().from_env()?.build()
    }
}

impl<E: QueryExecutor, S: CacheStore> InferenceClient<E, S> {
    /// Wrap an already assembled caching client.
    pub fn from_caching(inner: CachingClient<E, S>) -> Self {
        Self { inner }
    }

    /// The underlying caching client.
    pub fn caching(&self) -> &CachingClient<E, S> {
        &self.inner
    }

    /// Cache counters.
    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }

    /// Query, serving repeats from the cache.
    pub async fn query(&self, model: &str, payload: &Payload) -> QueryResult<ResponseBody> {
        self.inner.query(model, payload).await
    }

    /// Query, consulting the cache only when `use_cache` is true.
    pub async fn query_with(
        &self,
        model: &str,
        payload: &Payload,
        use_cache: bool,
    ) -> QueryResult<ResponseBody> {
        self.inner.query_with(model, payload, use_cache).await
    }

    /// Generate text from a prompt.
    pub async fn text_generation(&self, prompt: &str, model: Option<&str>) -> QueryResult<String> {
        self.complete(model, tasks::text_generation(prompt)).await
    }

    /// Summarize a long text into a few sentences.
    pub async fn summarization(&self, text: &str, model: Option<&str>) -> QueryResult<String> {
        self.complete(model, tasks::summarization(text)).await
    }

    /// Classify text sentiment.
    pub async fn text_classification(
        &self,
        text: &str,
        model: Option<&str>,
    ) -> QueryResult<String> {
        self.complete(model, tasks::text_classification(text)).await
    }

    async fn complete(&self, model: Option<&str>, payload: Payload) -> QueryResult<String> {
        let model = model.unwrap_or(tasks::DEFAULT_MODEL);
        let body = self.query(model, &payload).await?;
        response::completion_text(&body)
            .map(str::to_owned)
            .ok_or_else(|| QueryError::invalid_response("missing choices[0].message.content"))
    }
}

/// Where requests go and how they are authorized.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Chat-completion endpoint URL.
    pub url: Url,
    /// Bearer token.
    pub token: ApiToken,
}

impl EndpointConfig {
    /// Target the default endpoint with `token`.
    pub fn new(token: ApiToken) -> Self {
        Self {
            url: default_endpoint(),
            token,
        }
    }

    /// Override the endpoint URL.
    #[must_use]
    pub fn url(mut self, url: Url) -> Self {
        self.url = url;
        self
    }

    /// Read the token and optional `INFERENCE_ENDPOINT_URL` from the environment.
    pub fn from_env() -> QueryResult<Self> {
        let mut config = Self::new(ApiToken::from_env()?);
        if let Ok(raw) = std::env::var(ENDPOINT_ENV_VAR) {
            config.url = parse_endpoint(&raw)?;
        }
        Ok(config)
    }
}

/// Builder for the default [`InferenceClient`].
#[derive(Debug, Default)]
pub struct InferenceClientBuilder {
    token: Option<ApiToken>,
    endpoint: Option<Url>,
    retry: RetryConfig,
    cache: CacheConfig,
    cancel: Option<CancellationToken>,
}

impl InferenceClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API token.
    #[must_use]
    pub fn token(mut self, token: ApiToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Set the endpoint URL.
    #[must_use]
    pub fn endpoint(mut self, url: Url) -> Self {
        self.endpoint = Some(url);
        self
    }

    /// Set the retry configuration.
    #[must_use]
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Set the cache configuration.
    #[must_use]
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// Set the cache directory.
    #[must_use]
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache = self.cache.directory(dir);
        self
    }

    /// Cancel in-flight attempts and waits when `token` fires.
    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Set token and URL together.
    #[must_use]
    pub fn endpoint_config(mut self, config: EndpointConfig) -> Self {
        self.token = Some(config.token);
        self.endpoint = Some(config.url);
        self
    }

    /// Fill the endpoint and cache directory from the environment.
    pub fn from_env(mut self) -> QueryResult<Self> {
        self = self.endpoint_config(EndpointConfig::from_env()?);
        if let Ok(dir) = std::env::var(CACHE_DIR_ENV_VAR) {
            self.cache = self.cache.directory(dir);
        }
        Ok(self)
    }

    /// Build the client.
    pub fn build(self) -> QueryResult<InferenceClient> {
        let token = self.token.ok_or_else(|| CredentialError::Missing {
            var: credentials::TOKEN_ENV_VAR.to_string(),
        })?;

        let mut transport = ReqwestTransport::builder(token);
        if let Some(url) = self.endpoint {
            transport = transport.endpoint(url);
        }
        let transport = transport
            .build()
            .map_err(|e| QueryError::configuration(format!("HTTP client: {}", e)))?;

        debug!(
            endpoint = %transport.endpoint(),
            cache_dir = %self.cache.directory.display(),
            max_attempts = self.retry.max_attempts,
            "Building inference client"
        );

        let mut executor = ResilientExecutor::new(transport, self.retry)?;
        if let Some(token) = self.cancel {
            executor = executor.with_cancellation(token);
        }

        Ok(InferenceClient {
            inner: CachingClient::new(executor, &self.cache)?,
        })
    }
}

fn parse_endpoint(raw: &str) -> QueryResult<Url> {
    Url::parse(raw).map_err(|e| QueryError::configuration(format!("invalid endpoint {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use infercache_cache::MemoryCache;
    use infercache_retries::DEFAULT_ENDPOINT;
    use serde_json::json;

    struct Scripted {
        body: ResponseBody,
    }

    #[async_trait]
    impl QueryExecutor for Scripted {
        async fn execute(&self, _model: &str, _payload: &Payload) -> QueryResult<ResponseBody> {
            Ok(self.body.clone())
        }
    }

    fn client_returning(body: serde_json::Value) -> InferenceClient<Scripted, MemoryCache> {
        let executor = Scripted {
            body: body.as_object().cloned().unwrap(),
        };
        InferenceClient::from_caching(CachingClient::with_store(executor, MemoryCache::new()))
    }

    #[tokio::test]
    async fn test_text_generation_extracts_content() {
        let client = client_returning(json!({
            "choices": [{"message": {"role": "assistant", "content": "1. Grounding"}}]
        }));

        let text = client.text_generation("List benefits", None).await.unwrap();
        assert_eq!(text, "1. Grounding");

        // second identical call is a cache hit
        client.text_generation("List benefits", None).await.unwrap();
        assert_eq!(client.stats().hits, 1);
    }

    #[tokio::test]
    async fn test_missing_content_is_invalid_response() {
        let client = client_returning(json!({"choices": []}));
        let err = client.summarization("text", Some("m")).await.unwrap_err();
        assert!(matches!(err, QueryError::InvalidResponse(_)));
    }

    #[test]
    fn test_build_requires_token() {
        let err = InferenceClient::builder().build().err().unwrap();
        assert!(matches!(
            err,
            QueryError::Credential(CredentialError::Missing { .. })
        ));
    }

    #[test]
    fn test_build_rejects_invalid_retry_config() {
        let dir = tempfile::tempdir().unwrap();
        let err = InferenceClient::builder()
            .token(ApiToken::new("hf_x").unwrap())
            .cache_dir(dir.path())
            .retry(RetryConfig::new().max_attempts(0))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, QueryError::Configuration(_)));
    }

    #[test]
    fn test_build_creates_cache_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join("nested").join("responses");
        let client = InferenceClient::builder()
            .token(ApiToken::new("sk-or-v1-x").unwrap())
            .cache_dir(&cache_dir)
            .build()
            .unwrap();

        assert!(cache_dir.is_dir());
        assert_eq!(
            client.caching().executor().transport().endpoint().as_str(),
            DEFAULT_ENDPOINT
        );
    }

    #[test]
    fn test_endpoint_config() {
        let token = ApiToken::new("hf_abc").unwrap();
        let config = EndpointConfig::new(token);
        assert_eq!(config.url.as_str(), DEFAULT_ENDPOINT);

        let local = Url::parse("http://127.0.0.1:9000/v1/chat/completions").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let client = InferenceClient::builder()
            .endpoint_config(config.url(local.clone()))
            .cache_dir(dir.path())
            .build()
            .unwrap();
        assert_eq!(client.caching().executor().transport().endpoint(), &local);
    }

    #[test]
    fn test_parse_endpoint() {
        assert!(parse_endpoint("http://localhost:8080/v1/chat/completions").is_ok());
        assert!(matches!(
            parse_endpoint("not a url"),
            Err(QueryError::Configuration(_))
        ));
    }
}
