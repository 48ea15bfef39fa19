//! Shape discriminators in JSON
//!
//! A JSON value carries the shape id of the type it encodes in one of two
//! forms:
//!
//! - structures and unions embed it as a `"__type"` key next to their members
//! - every other value is nested as `{"__type": "ns#Name", "__value": ...}`
//!
//! Structure and union deserializers skip the `"__type"` key, so a tagged
//! object still reads as the plain shape.

use serde_json::{Map, Value};
use shapewire_core::{Schema, ShapeError, ShapeId, ShapeResult};

/// Key holding the shape id
pub const TYPE_KEY: &str = "__type";

/// Key holding the payload of the nested form
pub const VALUE_KEY: &str = "__value";

/// Tag `value`, written under `schema`, with the schema's shape id
pub fn wrap(schema: &Schema, value: Value) -> Value {
    let shape = schema.shape();
    let id = Value::String(shape.id().to_string());
    match value {
        Value::Object(members) if shape.shape_type().is_structure_like() => {
            let mut tagged = Map::with_capacity(members.len() + 1);
            tagged.insert(TYPE_KEY.to_string(), id);
            tagged.extend(members);
            Value::Object(tagged)
        }
        other => {
            let mut envelope = Map::with_capacity(2);
            envelope.insert(TYPE_KEY.to_string(), id);
            envelope.insert(VALUE_KEY.to_string(), other);
            Value::Object(envelope)
        }
    }
}

/// Shape id carried by `value`, if any
pub fn discriminator(value: &Value) -> ShapeResult<Option<ShapeId>> {
    let Some(tag) = value.as_object().and_then(|members| members.get(TYPE_KEY)) else {
        return Ok(None);
    };
    let tag = tag
        .as_str()
        .ok_or_else(|| ShapeError::Deserialization(format!("`{TYPE_KEY}` must be a string")))?;
    ShapeId::parse(tag).map(Some)
}

/// The value without its nested envelope
///
/// Embedded tags are left in place; readers skip them.
pub fn payload(value: &Value) -> &Value {
    match value.as_object() {
        Some(members) if members.len() == 2 && members.contains_key(TYPE_KEY) => {
            members.get(VALUE_KEY).unwrap_or(value)
        }
        _ => value,
    }
}
