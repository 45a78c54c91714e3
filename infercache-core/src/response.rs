//! Helpers for reading chat-completions response bodies.

use crate::query::ResponseBody;

/// Key whose presence at the top level marks an error-bearing body.
pub const ERROR_KEY: &str = "error";

/// Extract `choices[0].message.content`.
#[must_use]
pub fn completion_text(body: &ResponseBody) -> Option<&str> {
    body.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
}

/// Whether the body carries a top-level error indicator.
#[must_use]
pub fn has_error_indicator(body: &ResponseBody) -> bool {
    body.contains_key(ERROR_KEY)
}

/// Whether a body is worth persisting: non-empty and not an error.
#[must_use]
pub fn is_cacheable(body: &ResponseBody) -> bool {
    !body.is_empty() && !has_error_indicator(body)
}
