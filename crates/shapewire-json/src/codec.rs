//! Codec trait and JSON implementation

use crate::deserializer::JsonShapeDeserializer;
use crate::document::JsonDocument;
use crate::envelope;
use crate::serializer::JsonShapeSerializer;
use serde_json::Value;
use shapewire_core::{
    DeserializeShape, Document, DynamicShape, Schema, SerdeConfig, SerializeShape, ShapeError, ShapeResult,
    ShapeSchema, TypeRegistry,
};

/// Trait for shape encoding and decoding
pub trait Codec: Send + Sync {
    /// Encode a value under its own schema
    fn encode<T: ShapeSchema + SerializeShape + ?Sized>(&self, value: &T) -> ShapeResult<Vec<u8>>;

    /// Decode a value under its own schema
    fn decode<T: ShapeSchema + DeserializeShape>(&self, data: &[u8]) -> ShapeResult<T>;

    /// Get the content type for this codec
    fn content_type(&self) -> &'static str;
}

/// JSON codec driven by shape schemas
#[derive(Debug, Clone)]
pub struct JsonCodec {
    config: SerdeConfig,
    /// Whether to pretty-print output (default: false for efficiency)
    pretty: bool,
    /// Whether `jsonName` traits rename members on the wire (default: true)
    use_json_name: bool,
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self {
            config: SerdeConfig::default(),
            pretty: false,
            use_json_name: true,
        }
    }
}

impl JsonCodec {
    /// Create a new JSON codec
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a JSON codec that pretty-prints output
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    pub fn with_config(mut self, config: SerdeConfig) -> Self {
        self.config = config;
        self
    }

    /// Key members by member name even when they carry `jsonName`
    pub fn ignore_json_name(mut self) -> Self {
        self.use_json_name = false;
        self
    }

    pub fn config(&self) -> &SerdeConfig {
        &self.config
    }

    /// Encode a value under an explicit schema
    pub fn encode_with_schema<T: SerializeShape + ?Sized>(
        &self,
        schema: &'static Schema,
        value: &T,
    ) -> ShapeResult<Vec<u8>> {
        let json = self.to_value(schema, value)?;
        self.write_bytes(&json)
    }

    /// Decode a value under an explicit schema
    pub fn decode_with_schema<T: DeserializeShape>(&self, schema: &'static Schema, data: &[u8]) -> ShapeResult<T> {
        let json = parse(data)?;
        self.from_value(schema, &json)
    }

    /// Write a value into a JSON tree
    pub fn to_value<T: SerializeShape + ?Sized>(&self, schema: &'static Schema, value: &T) -> ShapeResult<Value> {
        let mut serializer = self.serializer();
        value.serialize_shape(schema, &mut serializer)?;
        serializer.finish()
    }

    /// Read a value from a JSON tree
    pub fn from_value<T: DeserializeShape>(&self, schema: &'static Schema, json: &Value) -> ShapeResult<T> {
        T::deserialize_shape(schema, &mut self.deserializer(json))
    }

    /// Encode a value directly to a JSON string
    pub fn encode_string<T: ShapeSchema + SerializeShape + ?Sized>(&self, value: &T) -> ShapeResult<String> {
        let json = self.to_value(T::schema(), value)?;
        let text = if self.pretty {
            serde_json::to_string_pretty(&json)
        } else {
            serde_json::to_string(&json)
        };
        text.map_err(|e| ShapeError::Serialization(e.to_string()))
    }

    /// Decode a JSON string to a value
    pub fn decode_str<T: ShapeSchema + DeserializeShape>(&self, data: &str) -> ShapeResult<T> {
        self.decode(data.as_bytes())
    }

    /// Encode a document, typed documents following their schema
    pub fn encode_document(&self, doc: &Document) -> ShapeResult<Vec<u8>> {
        self.encode_with_schema(doc.schema(), doc)
    }

    /// Parse JSON into a document, picking up any `__type` discriminator
    pub fn decode_document(&self, data: &[u8]) -> ShapeResult<JsonDocument> {
        JsonDocument::with_settings(parse(data)?, self.config.clone(), self.use_json_name)
    }

    /// Encode a value tagged with its shape id
    pub fn encode_dynamic(&self, value: &dyn DynamicShape) -> ShapeResult<Vec<u8>> {
        let mut serializer = self.serializer();
        value.serialize_dyn(&mut serializer)?;
        let json = envelope::wrap(value.shape_schema(), serializer.finish()?);
        self.write_bytes(&json)
    }

    /// Decode a tagged value into the type registered for its shape id
    pub fn decode_dynamic(&self, registry: &TypeRegistry, data: &[u8]) -> ShapeResult<Box<dyn DynamicShape>> {
        let doc = self.decode_document(data)?;
        tracing::trace!(type_tag = ?doc.type_tag(), "decoding tagged JSON");
        doc.to_dynamic(registry)
    }

    fn serializer(&self) -> JsonShapeSerializer<'_> {
        JsonShapeSerializer::new(&self.config).use_json_name(self.use_json_name)
    }

    fn deserializer<'a>(&'a self, json: &'a Value) -> JsonShapeDeserializer<'a> {
        JsonShapeDeserializer::new(json, &self.config).use_json_name(self.use_json_name)
    }

    fn write_bytes(&self, json: &Value) -> ShapeResult<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(json)
        } else {
            serde_json::to_vec(json)
        };
        bytes.map_err(|e| ShapeError::Serialization(e.to_string()))
    }
}

fn parse(data: &[u8]) -> ShapeResult<Value> {
    serde_json::from_slice(data).map_err(Into::into)
}

impl Codec for JsonCodec {
    fn encode<T: ShapeSchema + SerializeShape + ?Sized>(&self, value: &T) -> ShapeResult<Vec<u8>> {
        self.encode_with_schema(T::schema(), value)
    }

    fn decode<T: ShapeSchema + DeserializeShape>(&self, data: &[u8]) -> ShapeResult<T> {
        self.decode_with_schema(T::schema(), data)
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}
