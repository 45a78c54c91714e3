//! Logical queries and the executor seam.

use crate::errors::{QueryError, QueryResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request parameters sent to a model.
pub type Payload = Map<String, Value>;

/// Parsed response body returned by the endpoint.
pub type ResponseBody = Map<String, Value>;

/// A logical "query this model with this payload" request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Model identifier (e.g., "openrouter/auto").
    pub model: String,
    /// Request parameters.
    pub payload: Payload,
}

impl Query {
    /// Create a new query, rejecting an empty model identifier.
    pub fn new(model: impl Into<String>, payload: Payload) -> QueryResult<Self> {
        let model = model.into();
        ensure_model(&model)?;
        Ok(Self { model, payload })
    }

    /// Build a query from any JSON value, which must be an object.
    pub fn from_value(model: impl Into<String>, payload: Value) -> QueryResult<Self> {
        match payload {
            Value::Object(map) => Self::new(model, map),
            other => Err(QueryError::invalid_request(format!(
                "payload must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

/// Reject empty or whitespace-only model identifiers.
pub fn ensure_model(model: &str) -> QueryResult<()> {
    if model.trim().is_empty() {
        return Err(QueryError::invalid_request("model identifier is empty"));
    }
    Ok(())
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Anything that can answer a query with a response body.
///
/// Implemented by the retrying executor and by the caching decorator, so
/// the decorator can wrap either a real executor or a test double.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Execute one logical query.
    async fn execute(&self, model: &str, payload: &Payload) -> QueryResult<ResponseBody>;

    /// Execute a prepared [`Query`].
    async fn execute_query(&self, query: &Query) -> QueryResult<ResponseBody> {
        self.execute(&query.model, &query.payload).await
    }
}

#[async_trait]
impl<T: QueryExecutor + ?Sized> QueryExecutor for std::sync::Arc<T> {
    async fn execute(&self, model: &str, payload: &Payload) -> QueryResult<ResponseBody> {
        (**self).execute(model, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl QueryExecutor for Echo {
        async fn execute(&self, model: &str, payload: &Payload) -> QueryResult<ResponseBody> {
            let mut body = payload.clone();
            body.insert("model".into(), json!(model));
            Ok(body)
        }
    }

    #[test]
    fn test_query_rejects_empty_model() {
        let err = Query::new("  ", Payload::new()).unwrap_err();
        assert!(matches!(err, QueryError::InvalidRequest(_)));
    }

    #[test]
    fn test_query_from_value_requires_object() {
        assert!(Query::from_value("m", json!({"inputs": "hi"})).is_ok());
        let err = Query::from_value("m", json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[tokio::test]
    async fn test_execute_query_delegates() {
        let query = Query::from_value("gpt", json!({"inputs": "hi"})).unwrap();
        let body = std::sync::Arc::new(Echo).execute_query(&query).await.unwrap();
        assert_eq!(body["model"], json!("gpt"));
        assert_eq!(body["inputs"], json!("hi"));
    }
}
