//! HTTP transport for a single inference request.

use crate::error::TransportError;
use async_trait::async_trait;
use infercache_core::{translate, ApiToken, Payload};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default chat-completions endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Raw outcome of one request: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl TransportResponse {
    /// Create a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends one request for a model and returns whatever the server said.
///
/// Implementations do not interpret status codes; that is the executor's
/// job.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a single request.
    async fn send(&self, model: &str, payload: &Payload)
        -> Result<TransportResponse, TransportError>;
}

/// `reqwest`-backed transport posting chat-completions requests.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    endpoint: Url,
    token: ApiToken,
}

impl ReqwestTransport {
    /// Create a transport for the default endpoint.
    pub fn new(token: ApiToken) -> Self {
        Self {
            client: Client::new(),
            endpoint: default_endpoint(),
            token,
        }
    }

    /// Create a builder.
    pub fn builder(token: ApiToken) -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::new(token)
    }

    /// Get the endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        model: &str,
        payload: &Payload,
    ) -> Result<TransportResponse, TransportError> {
        let body = translate::to_chat_request(model, payload);

        debug!(model, url = %self.endpoint, "Making HTTP request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, self.token.bearer())
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;

        Ok(TransportResponse::new(status, text))
    }
}

/// Builder for [`ReqwestTransport`].
#[derive(Debug)]
pub struct ReqwestTransportBuilder {
    token: ApiToken,
    client: Option<Client>,
    endpoint: Option<Url>,
    timeout: Option<Duration>,
}

impl ReqwestTransportBuilder {
    /// Create a new builder.
    pub fn new(token: ApiToken) -> Self {
        Self {
            token,
            client: None,
            endpoint: None,
            timeout: None,
        }
    }

    /// Set the underlying HTTP client.
    #[must_use]
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the endpoint URL.
    #[must_use]
    pub fn endpoint(mut self, url: Url) -> Self {
        self.endpoint = Some(url);
        self
    }

    /// Set a client-level timeout (ignored when a client is supplied).
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the transport.
    pub fn build(self) -> Result<ReqwestTransport, TransportError> {
        let client = match self.client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(ReqwestTransport {
            client,
            endpoint: self.endpoint.unwrap_or_else(default_endpoint),
            token: self.token,
        })
    }
}

/// [`DEFAULT_ENDPOINT`] as a parsed URL.
pub fn default_endpoint() -> Url {
    Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token() -> ApiToken {
        ApiToken::new("hf_test_token").unwrap()
    }

    fn payload(v: serde_json::Value) -> Payload {
        v.as_object().cloned().unwrap()
    }

    async fn transport_for(server: &MockServer) -> ReqwestTransport {
        let url = Url::parse(&format!("{}/v1/chat/completions", server.uri())).unwrap();
        ReqwestTransport::builder(token())
            .endpoint(url)
            .build()
            .unwrap()
    }

    #[test]
    fn test_default_endpoint() {
        let transport = ReqwestTransport::new(token());
        assert_eq!(transport.endpoint().as_str(), DEFAULT_ENDPOINT);
    }

    #[tokio::test]
    async fn test_sends_translated_body_with_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer hf_test_token"))
            .and(body_json(json!({
                "model": "openrouter/auto",
                "messages": [{"role": "user", "content": "hi"}],
                "max_tokens": 10
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport_for(&server).await;
        let response = transport
            .send(
                "openrouter/auto",
                &payload(json!({"inputs": "hi", "parameters": {"max_new_tokens": 10}})),
            )
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"choices":[]}"#);
    }

    #[tokio::test]
    async fn test_non_success_status_is_returned_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string(r#"{"estimated_time": 20}"#))
            .mount(&server)
            .await;

        let transport = transport_for(&server).await;
        let response = transport.send("m", &Payload::new()).await.unwrap();

        assert_eq!(response.status, 503);
        assert!(response.body.contains("estimated_time"));
    }

    #[tokio::test]
    async fn test_client_timeout_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/v1/chat/completions", server.uri())).unwrap();
        let transport = ReqwestTransport::builder(token())
            .endpoint(url)
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();

        let err = transport.send("m", &Payload::new()).await.unwrap_err();
        assert!(err.is_timeout());
    }
}
