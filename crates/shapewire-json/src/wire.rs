//! JSON spellings shared by the serializer, deserializer and documents

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use shapewire_core::{ShapeError, ShapeResult};

pub const NAN: &str = "NaN";
pub const INFINITY: &str = "Infinity";
pub const NEG_INFINITY: &str = "-Infinity";

/// Non-finite floats travel as strings
pub fn non_finite_name(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some(NAN)
    } else if value == f64::INFINITY {
        Some(INFINITY)
    } else if value == f64::NEG_INFINITY {
        Some(NEG_INFINITY)
    } else {
        None
    }
}

pub fn parse_non_finite(text: &str) -> Option<f64> {
    match text {
        NAN => Some(f64::NAN),
        INFINITY => Some(f64::INFINITY),
        NEG_INFINITY => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

pub fn kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Exact JSON number from the decimal text of a big value
pub fn number(text: &str) -> ShapeResult<serde_json::Number> {
    text.parse()
        .map_err(|e| ShapeError::Serialization(format!("`{text}` is not a JSON number: {e}")))
}

pub fn encode_blob(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_blob(text: &str) -> ShapeResult<Vec<u8>> {
    STANDARD
        .decode(text)
        .map_err(|e| ShapeError::Deserialization(format!("invalid base64 blob: {e}")))
}
