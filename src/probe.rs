//! # Response Probes
//!
//! Exploratory inspection of a chat-completion response. Probes never fail:
//! a missing field is an answer, not an error.

use crate::schemas::ChatResponse;

/// Return `body.choices[0].message.content`.
///
/// `None` when `choices` is missing, not an array, empty, or when the first
/// choice has no string `message.content`.
pub fn extract_message_content(response: &ChatResponse) -> Option<String> {
    response
        .body
        .get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .get("content")?
        .as_str()
        .map(str::to_owned)
}

/// Heuristic: true when `text` contains both `{` and `}`, in any order.
///
/// This is a substring check, not a JSON parse. `"} not json {"` passes.
pub fn looks_like_json(text: &str) -> bool {
    text.contains('{') && text.contains('}')
}
