//! Tolerant transcript extraction
//!
//! Speech servers disagree on the response shape, and the same server has
//! changed it between versions. Each strategy below understands one shape;
//! they are tried in order and the first non-empty text wins.

use serde_json::Value;
use tracing::{debug, warn};

/// One response shape: returns trimmed, non-empty text or `None`
pub type Extractor = fn(&Value) -> Option<String>;

/// Strategies in priority order
pub const EXTRACTORS: &[(&str, Extractor)] = &[
    ("list", from_list),
    ("result-list", from_result_list),
    ("field", from_known_field),
    ("string", from_bare_string),
];

/// Fields that may carry the transcript directly on the top-level object
const TEXT_FIELDS: &[&str] = &["text", "result", "transcription", "asr_result"];

/// Per-item fields, cleaned text first
const ITEM_FIELDS: &[&str] = &["clean_text", "text"];

/// Run the strategies; "" when none matches
pub fn extract_text(payload: &Value) -> String {
    for (name, extractor) in EXTRACTORS {
        if let Some(text) = extractor(payload) {
            debug!("Transcript extracted with '{}' strategy", name);
            return text;
        }
    }
    String::new()
}

/// `[{"key": "audio1", "clean_text": "...", "text": "..."}]`
pub fn from_list(payload: &Value) -> Option<String> {
    first_item_text(payload.as_array()?)
}

/// `{"result": [{"key": "audio1", "text": "..."}]}`
pub fn from_result_list(payload: &Value) -> Option<String> {
    first_item_text(payload.get("result")?.as_array()?)
}

/// `{"text": "..."}`, `{"transcription": 42}`, ...
pub fn from_known_field(payload: &Value) -> Option<String> {
    let object = payload.as_object()?;
    TEXT_FIELDS
        .iter()
        .find_map(|field| object.get(*field).and_then(scalar_text))
}

/// `"..."`
pub fn from_bare_string(payload: &Value) -> Option<String> {
    payload.as_str().and_then(non_empty)
}

fn first_item_text(items: &[Value]) -> Option<String> {
    let item = items.first()?.as_object()?;
    ITEM_FIELDS
        .iter()
        .find_map(|field| item.get(*field).and_then(scalar_text))
}

/// Strings as-is, numbers and booleans stringified; containers and null rejected
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s),
        Value::Number(n) => {
            warn!("Transcript field is a number ({}), coercing to text", n);
            non_empty(&n.to_string())
        }
        Value::Bool(b) => {
            warn!("Transcript field is a boolean ({}), coercing to text", b);
            non_empty(&b.to_string())
        }
        _ => None,
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
