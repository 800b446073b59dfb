//! Keyword heuristics shared by passthrough adapters.
//!
//! All checks are case-insensitive substring matches. They are deliberately loose:
//! `"deliver"` matches `"live"`, and a `live`/`realtime` *key* in the params counts
//! even when its value is `false`.

use serde_json::{Map, Value as JsonValue};

/// Endpoint tokens that mark a streaming request.
pub const STREAMING_ENDPOINT_KEYWORDS: [&str; 3] = ["stream", "live", "realtime"];

/// Tokens that select the real-time sub-protocol.
pub const REALTIME_KEYWORDS: [&str; 2] = ["live", "realtime"];

pub const STREAM_PARAM: &str = "stream";

pub type JsonMap = Map<String, JsonValue>;

pub fn contains_keyword(haystack: &str, keywords: &[&str]) -> bool {
    if haystack.is_empty() {
        return false;
    }
    let lowered = haystack.to_lowercase();
    keywords.iter().any(|keyword| lowered.contains(keyword))
}

pub fn is_realtime(value: &str) -> bool {
    contains_keyword(value, &REALTIME_KEYWORDS)
}

/// JSON truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are falsy.
pub fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(items) => !items.is_empty(),
        JsonValue::Object(map) => !map.is_empty(),
    }
}

/// Streaming classification: endpoint tokens, a truthy `stream` param, or the mere
/// presence of a `live`/`realtime` key.
pub fn classify_streaming(endpoint: &str, params: &JsonMap) -> bool {
    contains_keyword(endpoint, &STREAMING_ENDPOINT_KEYWORDS)
        || params.get(STREAM_PARAM).is_some_and(is_truthy)
        || REALTIME_KEYWORDS.iter().any(|key| params.contains_key(*key))
}
