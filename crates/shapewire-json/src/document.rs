//! Documents parsed from JSON
//!
//! JSON has no blob or timestamp types, so a document parsed from JSON holds
//! them as strings and numbers. [`JsonDocument`] keeps the parsed JSON next
//! to the [`Document`] and reinterprets it on demand: `as_blob` decodes
//! base64, `as_timestamp` applies the configured format, and `as_shape`
//! reads through [`JsonShapeDeserializer`] so member names, blobs and
//! timestamps follow the schema.

use crate::deserializer::JsonShapeDeserializer;
use crate::envelope::{self, TYPE_KEY};
use crate::wire;
use serde_json::{Number, Value};
use shapewire_core::timestamp::{from_epoch_integer, from_epoch_seconds};
use shapewire_core::{
    BigDecimal, BigInt, DateTime, DeserializeShape, Document, DynamicShape, IndexMap, Schema, SerdeConfig,
    ShapeError, ShapeId, ShapeResult, ShapeSchema, ShapeType, TimestampFormat, TypeRegistry, Utc,
};
use std::ops::Deref;

/// A [`Document`] that remembers the JSON it was parsed from
///
/// Dereferences to the document; a `"__type"` tag becomes the document's
/// discriminator and is not one of its members.
#[derive(Clone)]
pub struct JsonDocument {
    document: Document,
    type_tag: Option<ShapeId>,
    raw: Value,
    config: SerdeConfig,
    use_json_name: bool,
}

impl JsonDocument {
    /// Wrap parsed JSON using the default configuration
    pub fn from_value(raw: Value) -> ShapeResult<Self> {
        Self::with_settings(raw, SerdeConfig::default(), true)
    }

    pub(crate) fn with_settings(raw: Value, config: SerdeConfig, use_json_name: bool) -> ShapeResult<Self> {
        let mut document = value_to_document(envelope::payload(&raw));
        let type_tag = envelope::discriminator(&raw)?;
        if let Some(id) = &type_tag {
            document = document.with_discriminator(id.clone());
        }
        Ok(Self {
            document,
            type_tag,
            raw,
            config,
            use_json_name,
        })
    }

    /// The JSON as parsed, envelope included
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The JSON without a nested `__type`/`__value` envelope
    pub fn payload(&self) -> &Value {
        envelope::payload(&self.raw)
    }

    /// Shape id from the JSON `"__type"` key, when present
    pub fn type_tag(&self) -> Option<&ShapeId> {
        self.type_tag.as_ref()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Decode a base64 string
    pub fn as_blob(&self) -> ShapeResult<Vec<u8>> {
        match self.payload() {
            Value::String(text) => wire::decode_blob(text),
            other => Err(ShapeError::mismatch(ShapeType::Blob, wire::kind(other))),
        }
    }

    /// Epoch seconds from numbers; strings in the configured text format,
    /// else RFC 3339
    pub fn as_timestamp(&self) -> ShapeResult<DateTime<Utc>> {
        match self.payload() {
            Value::Number(number) => match number.as_i64() {
                Some(seconds) => from_epoch_integer(seconds),
                None => from_epoch_seconds(number.as_f64().ok_or_else(|| ShapeError::OutOfRange {
                    value: number.to_string(),
                    target: ShapeType::Timestamp,
                })?),
            },
            Value::String(text) => {
                let format = match self.config.default_timestamp_format {
                    TimestampFormat::EpochSeconds => TimestampFormat::DateTime,
                    text_format => text_format,
                };
                format.parse(text)
            }
            other => Err(ShapeError::mismatch(ShapeType::Timestamp, wire::kind(other))),
        }
    }

    /// Read a shape value using its own schema
    pub fn as_shape<T: ShapeSchema + DeserializeShape>(&self) -> ShapeResult<T> {
        self.as_shape_with(T::schema())
    }

    pub fn as_shape_with<T: DeserializeShape>(&self, schema: &'static Schema) -> ShapeResult<T> {
        T::deserialize_shape(schema, &mut self.deserializer())
    }

    /// Construct the registered type named by the `"__type"` tag
    pub fn to_dynamic(&self, registry: &TypeRegistry) -> ShapeResult<Box<dyn DynamicShape>> {
        let id = self
            .type_tag()
            .ok_or_else(|| ShapeError::Deserialization("JSON document has no `__type` discriminator".to_string()))?;
        registry.deserialize_with(id, &mut self.deserializer())
    }

    fn deserializer(&self) -> JsonShapeDeserializer<'_> {
        JsonShapeDeserializer::new(self.payload(), &self.config).use_json_name(self.use_json_name)
    }
}

impl Deref for JsonDocument {
    type Target = Document;

    fn deref(&self) -> &Document {
        &self.document
    }
}

impl std::fmt::Debug for JsonDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.document, f)
    }
}

/// Untyped document for a JSON value
pub(crate) fn value_to_document(value: &Value) -> Document {
    match value {
        Value::Null => Document::null(),
        Value::Bool(v) => Document::from(*v),
        Value::Number(number) => number_to_document(number),
        Value::String(v) => Document::from(v.as_str()),
        Value::Array(items) => Document::from(items.iter().map(value_to_document).collect::<Vec<_>>()),
        Value::Object(members) => Document::from(
            members
                .iter()
                .filter(|(key, _)| key.as_str() != TYPE_KEY)
                .map(|(key, value)| (key.clone(), value_to_document(value)))
                .collect::<IndexMap<_, _>>(),
        ),
    }
}

/// Integers become longs, else big integers; fractions become doubles
/// unless that would lose digits
fn number_to_document(number: &Number) -> Document {
    if let Some(v) = number.as_i64() {
        return Document::from(v);
    }
    let text = number.to_string();
    if !number.is_f64() {
        if let Ok(big) = text.parse::<BigInt>() {
            return Document::from(big);
        }
    }
    let exact = text.parse::<BigDecimal>().ok();
    match (number.as_f64(), exact) {
        (Some(double), Some(exact)) if double.to_string().parse::<BigDecimal>().ok().as_ref() == Some(&exact) => {
            Document::from(double)
        }
        (_, Some(exact)) => Document::from(exact),
        (Some(double), None) => Document::from(double),
        (None, None) => Document::from(text),
    }
}
