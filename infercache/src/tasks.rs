//! Payload builders for common tasks.

use infercache_core::Payload;
use serde_json::{json, Value};

/// Model used by the task helpers when none is given.
pub const DEFAULT_MODEL: &str = "openrouter/auto";

fn object(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        _ => Payload::new(),
    }
}

/// Payload for free-form text generation.
pub fn text_generation(prompt: &str) -> Payload {
    object(json!({
        "inputs": prompt,
        "parameters": {
            "max_new_tokens": 200,
            "temperature": 0.7,
            "return_full_text": false,
        },
    }))
}

/// Payload asking for a 2-3 sentence summary.
pub fn summarization(text: &str) -> Payload {
    object(json!({
        "inputs": format!("Summarize this text in 2-3 sentences: {}", text),
        "parameters": {"max_length": 130, "min_length": 30},
    }))
}

/// Payload asking for a POSITIVE/NEGATIVE sentiment label.
pub fn text_classification(text: &str) -> Payload {
    object(json!({
        "inputs": format!(
            "Classify the sentiment of this text as POSITIVE or NEGATIVE: {}",
            text
        ),
    }))
}
