//! Serializer writing shape values as JSON

use crate::wire;
use serde_json::{Map, Number, Value};
use shapewire_core::shape_serde::{ListWriter, MapWriter, ValueWriter};
use shapewire_core::timestamp::to_epoch_seconds;
use shapewire_core::{
    BigDecimal, BigInt, DateTime, Document, DocumentValue, MapSerializer, Schema, SerdeConfig, SerializeShape,
    SerializeStructure, ShapeError, ShapeResult, ShapeSerializer, ShapeType, TimestampFormat, Utc,
};

enum Frame {
    Object(Map<String, Value>),
    Array(Vec<Value>),
    Entries { object: Map<String, Value>, key: Option<String> },
}

/// Builds a `serde_json::Value` from serializer calls
///
/// Structure members are keyed by their `jsonName` trait, falling back to
/// the member name; [`use_json_name(false)`](Self::use_json_name) keys them
/// by member name only.
pub struct JsonShapeSerializer<'a> {
    config: &'a SerdeConfig,
    use_json_name: bool,
    stack: Vec<Frame>,
    result: Option<Value>,
}

impl<'a> JsonShapeSerializer<'a> {
    pub fn new(config: &'a SerdeConfig) -> Self {
        Self {
            config,
            use_json_name: true,
            stack: Vec::new(),
            result: None,
        }
    }

    pub fn use_json_name(mut self, enabled: bool) -> Self {
        self.use_json_name = enabled;
        self
    }

    /// The JSON value written, failing if nothing was written
    pub fn finish(self) -> ShapeResult<Value> {
        self.result
            .ok_or_else(|| ShapeError::Serialization("no value was written".to_string()))
    }

    fn emit(&mut self, schema: &Schema, value: Value) -> ShapeResult<()> {
        let use_json_name = self.use_json_name;
        match self.stack.last_mut() {
            None => {
                self.result = Some(value);
                Ok(())
            }
            Some(Frame::Object(object)) => {
                let key = if use_json_name {
                    schema.json_member_name()
                } else {
                    schema.member_name()
                };
                let key = key.ok_or_else(|| {
                    ShapeError::Serialization(format!("{} written inside a structure is not a member", schema.id()))
                })?;
                object.insert(key.to_string(), value);
                Ok(())
            }
            Some(Frame::Array(items)) => {
                items.push(value);
                Ok(())
            }
            Some(Frame::Entries { object, key }) => {
                let key = key
                    .take()
                    .ok_or_else(|| ShapeError::Serialization("map value written without a key".to_string()))?;
                object.insert(key, value);
                Ok(())
            }
        }
    }

    fn pop(&mut self) -> ShapeResult<Frame> {
        self.stack.pop().ok_or_else(unbalanced)
    }

    /// JSON form of a document
    ///
    /// Typed documents are walked by their schema so member names, blobs and
    /// timestamps follow the same rules as generated shapes.
    fn document_value(&self, doc: &Document) -> ShapeResult<Value> {
        if doc.schema().shape_type() != ShapeType::Document {
            let mut nested = JsonShapeSerializer::new(self.config).use_json_name(self.use_json_name);
            doc.serialize_shape(doc.schema(), &mut nested)?;
            return nested.finish();
        }
        Ok(match doc.value() {
            DocumentValue::Null => Value::Null,
            DocumentValue::Boolean(v) => Value::Bool(*v),
            DocumentValue::Byte(v) => Value::from(*v),
            DocumentValue::Short(v) => Value::from(*v),
            DocumentValue::Integer(v) => Value::from(*v),
            DocumentValue::Long(v) => Value::from(*v),
            DocumentValue::BigInteger(v) => Value::Number(wire::number(&v.to_string())?),
            DocumentValue::Float(v) => float_value(*v)?,
            DocumentValue::Double(v) => double_value(*v),
            DocumentValue::BigDecimal(v) => Value::Number(wire::number(&v.to_string())?),
            DocumentValue::String(v) => Value::String(v.clone()),
            DocumentValue::Blob(v) => Value::String(wire::encode_blob(v)),
            DocumentValue::Timestamp(v) => timestamp_value(v, self.config.default_timestamp_format),
            DocumentValue::List(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.document_value(item))
                    .collect::<ShapeResult<_>>()?,
            ),
            DocumentValue::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| Ok((key.clone(), self.document_value(value)?)))
                    .collect::<ShapeResult<_>>()?,
            ),
        })
    }
}

fn unbalanced() -> ShapeError {
    ShapeError::Serialization("unbalanced JSON frames".to_string())
}

fn double_value(value: f64) -> Value {
    match (wire::non_finite_name(value), Number::from_f64(value)) {
        (None, Some(number)) => Value::Number(number),
        (name, _) => Value::String(name.unwrap_or(wire::NAN).to_string()),
    }
}

/// `f32` is written from its own shortest text, not its widened `f64`
fn float_value(value: f32) -> ShapeResult<Value> {
    match wire::non_finite_name(f64::from(value)) {
        Some(name) => Ok(Value::String(name.to_string())),
        None => wire::number(&value.to_string()).map(Value::Number),
    }
}

fn timestamp_value(value: &DateTime<Utc>, format: TimestampFormat) -> Value {
    match format {
        TimestampFormat::EpochSeconds if value.timestamp_subsec_nanos() == 0 => Value::from(value.timestamp()),
        TimestampFormat::EpochSeconds => double_value(to_epoch_seconds(value)),
        TimestampFormat::DateTime | TimestampFormat::HttpDate => Value::String(format.format(value)),
    }
}

impl ShapeSerializer for JsonShapeSerializer<'_> {
    fn write_struct(&mut self, schema: &'static Schema, value: &dyn SerializeStructure) -> ShapeResult<()> {
        self.stack.push(Frame::Object(Map::new()));
        value.serialize_members(self)?;
        let Frame::Object(object) = self.pop()? else {
            return Err(unbalanced());
        };
        if schema.shape_type() == ShapeType::Union && object.len() != 1 {
            return Err(ShapeError::UnionArity {
                shape: schema.shape().id().clone(),
                count: object.len(),
            });
        }
        self.emit(schema, Value::Object(object))
    }

    fn write_list(&mut self, schema: &'static Schema, len: usize, elements: &mut ListWriter<'_>) -> ShapeResult<()> {
        self.stack.push(Frame::Array(Vec::with_capacity(len)));
        elements(self)?;
        let Frame::Array(items) = self.pop()? else {
            return Err(unbalanced());
        };
        self.emit(schema, Value::Array(items))
    }

    fn write_map(&mut self, schema: &'static Schema, len: usize, entries: &mut MapWriter<'_>) -> ShapeResult<()> {
        self.stack.push(Frame::Entries {
            object: Map::with_capacity(len),
            key: None,
        });
        entries(self)?;
        let Frame::Entries { object, .. } = self.pop()? else {
            return Err(unbalanced());
        };
        self.emit(schema, Value::Object(object))
    }

    fn write_boolean(&mut self, schema: &'static Schema, value: bool) -> ShapeResult<()> {
        self.emit(schema, Value::Bool(value))
    }

    fn write_byte(&mut self, schema: &'static Schema, value: i8) -> ShapeResult<()> {
        self.emit(schema, Value::from(value))
    }

    fn write_short(&mut self, schema: &'static Schema, value: i16) -> ShapeResult<()> {
        self.emit(schema, Value::from(value))
    }

    fn write_integer(&mut self, schema: &'static Schema, value: i32) -> ShapeResult<()> {
        self.emit(schema, Value::from(value))
    }

    fn write_long(&mut self, schema: &'static Schema, value: i64) -> ShapeResult<()> {
        self.emit(schema, Value::from(value))
    }

    fn write_big_integer(&mut self, schema: &'static Schema, value: &BigInt) -> ShapeResult<()> {
        let number = wire::number(&value.to_string())?;
        self.emit(schema, Value::Number(number))
    }

    fn write_float(&mut self, schema: &'static Schema, value: f32) -> ShapeResult<()> {
        let value = float_value(value)?;
        self.emit(schema, value)
    }

    fn write_double(&mut self, schema: &'static Schema, value: f64) -> ShapeResult<()> {
        self.emit(schema, double_value(value))
    }

    fn write_big_decimal(&mut self, schema: &'static Schema, value: &BigDecimal) -> ShapeResult<()> {
        let number = wire::number(&value.to_string())?;
        self.emit(schema, Value::Number(number))
    }

    fn write_string(&mut self, schema: &'static Schema, value: &str) -> ShapeResult<()> {
        self.emit(schema, Value::String(value.to_string()))
    }

    fn write_blob(&mut self, schema: &'static Schema, value: &[u8]) -> ShapeResult<()> {
        self.emit(schema, Value::String(wire::encode_blob(value)))
    }

    fn write_timestamp(&mut self, schema: &'static Schema, value: &DateTime<Utc>) -> ShapeResult<()> {
        let format = self.config.timestamp_format_for(schema);
        self.emit(schema, timestamp_value(value, format))
    }

    fn write_document(&mut self, schema: &'static Schema, value: &Document) -> ShapeResult<()> {
        let json = self.document_value(value)?;
        self.emit(schema, json)
    }

    fn write_null(&mut self, schema: &'static Schema) -> ShapeResult<()> {
        self.emit(schema, Value::Null)
    }
}

impl MapSerializer for JsonShapeSerializer<'_> {
    fn write_entry(&mut self, key: &str, value: &mut ValueWriter<'_>) -> ShapeResult<()> {
        match self.stack.last_mut() {
            Some(Frame::Entries { key: pending, .. }) => *pending = Some(key.to_string()),
            _ => return Err(ShapeError::Serialization("map entry written outside a map".to_string())),
        }
        value(self)
    }
}
