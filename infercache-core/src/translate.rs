//! Conversion of HuggingFace-style payloads to the chat-completions dialect.
//!
//! A payload carrying `inputs` (and optionally `parameters`) is rewritten
//! into `{"model", "messages", "max_tokens", "temperature"}`. Anything else
//! is assumed to already be a chat-completions body and passes through.

use crate::query::Payload;
use serde_json::{json, Value};

/// Build the wire body for `model` from a caller payload.
#[must_use]
pub fn to_chat_request(model: &str, payload: &Payload) -> Payload {
    let Some(inputs) = payload.get("inputs") else {
        return payload.clone();
    };

    let mut body = Payload::new();
    body.insert("model".into(), json!(model));
    body.insert(
        "messages".into(),
        json!([{ "role": "user", "content": inputs }]),
    );

    if let Some(Value::Object(params)) = payload.get("parameters") {
        if let Some(max) = params.get("max_new_tokens") {
            body.insert("max_tokens".into(), max.clone());
        }
        if let Some(temp) = params.get("temperature") {
            body.insert("temperature".into(), temp.clone());
        }
    }

    body
}
