//! Illustrative callee logic, free of any marshaling.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{Map, Value};

use spillbuf_core::error::{Error, Result};

/// Unicode-aware upper-casing. ASCII input keeps its byte length; other
/// scripts may grow (`ß` -> `SS`), which the output spill absorbs.
pub fn to_upper(input: &str) -> String {
    input.to_uppercase()
}

/// Remove top-level keys whose value is the string `disallowed`.
///
/// Key order of the remaining entries is preserved.
pub fn filter_json(input: Value, disallowed: &str) -> Result<Map<String, Value>> {
    let map = match input {
        Value::Object(map) => map,
        other => {
            return Err(Error::Computation(format!(
                "expected a JSON object, found {}",
                kind(&other)
            )))
        }
    };
    Ok(map
        .into_iter()
        .filter(|(_, v)| v.as_str() != Some(disallowed))
        .collect())
}

/// Standard base64 with padding.
pub fn base64_encode(input: &[u8]) -> String {
    STANDARD.encode(input)
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
