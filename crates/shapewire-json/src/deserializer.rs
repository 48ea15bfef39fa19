//! Deserializer reading shape values from JSON

use crate::document::value_to_document;
use crate::envelope::TYPE_KEY;
use crate::wire;
use serde_json::{Map, Number, Value};
use shapewire_core::shape_serde::{ElementConsumer, EntryConsumer, MemberConsumer};
use shapewire_core::timestamp::{from_epoch_integer, from_epoch_seconds};
use shapewire_core::{
    BigDecimal, BigInt, DateTime, Document, Schema, SerdeConfig, ShapeDeserializer, ShapeError, ShapeResult,
    ShapeType, UnionMember, Utc,
};

/// Reads shape values from a borrowed `serde_json::Value`
///
/// Object keys are matched to members by `jsonName` (else member name)
/// unless [`use_json_name(false)`](Self::use_json_name) is set.
pub struct JsonShapeDeserializer<'a> {
    value: &'a Value,
    config: &'a SerdeConfig,
    use_json_name: bool,
    depth: usize,
}

impl<'a> JsonShapeDeserializer<'a> {
    pub fn new(value: &'a Value, config: &'a SerdeConfig) -> Self {
        Self {
            value,
            config,
            use_json_name: true,
            depth: 0,
        }
    }

    pub fn use_json_name(mut self, enabled: bool) -> Self {
        self.use_json_name = enabled;
        self
    }

    fn child(&self, value: &'a Value) -> JsonShapeDeserializer<'a> {
        JsonShapeDeserializer {
            value,
            config: self.config,
            use_json_name: self.use_json_name,
            depth: self.depth + 1,
        }
    }

    fn enter(&self) -> ShapeResult<()> {
        self.config.check_depth(self.depth + 1)
    }

    fn lookup(&self, schema: &'static Schema, key: &str) -> Option<&'static Schema> {
        if self.use_json_name {
            schema.member_by_json_name(key)
        } else {
            schema.member(key)
        }
    }

    fn mismatch(&self, expected: impl ToString) -> ShapeError {
        ShapeError::mismatch(expected, wire::kind(self.value))
    }

    fn object(&self, expected: ShapeType) -> ShapeResult<&'a Map<String, Value>> {
        self.value.as_object().ok_or_else(|| self.mismatch(expected))
    }

    fn number(&self, expected: ShapeType) -> ShapeResult<&'a Number> {
        match self.value {
            Value::Number(number) => Ok(number),
            _ => Err(self.mismatch(expected)),
        }
    }

    fn integer<T: TryFrom<i64>>(&self, target: ShapeType) -> ShapeResult<T> {
        let number = self.number(target)?;
        if number.is_f64() {
            return Err(ShapeError::mismatch(target, "fractional number"));
        }
        number
            .as_i64()
            .and_then(|wide| T::try_from(wide).ok())
            .ok_or_else(|| ShapeError::OutOfRange {
                value: number.to_string(),
                target,
            })
    }

    fn float(&self, target: ShapeType) -> ShapeResult<f64> {
        match self.value {
            Value::Number(number) => number.as_f64().ok_or_else(|| ShapeError::OutOfRange {
                value: number.to_string(),
                target,
            }),
            Value::String(text) => wire::parse_non_finite(text).ok_or_else(|| self.mismatch(target)),
            _ => Err(self.mismatch(target)),
        }
    }
}

impl ShapeDeserializer for JsonShapeDeserializer<'_> {
    fn read_struct(&mut self, schema: &'static Schema, consumer: &mut MemberConsumer<'_>) -> ShapeResult<()> {
        self.enter()?;
        for (key, value) in self.object(schema.shape_type())? {
            let Some(member) = self.lookup(schema, key) else {
                tracing::trace!(shape = %schema.id(), member = %key, "ignoring unknown member");
                continue;
            };
            if value.is_null() {
                continue;
            }
            consumer(member, &mut self.child(value))?;
        }
        Ok(())
    }

    fn read_union(&mut self, schema: &'static Schema, consumer: &mut MemberConsumer<'_>) -> ShapeResult<UnionMember> {
        self.enter()?;
        let present: Vec<(&String, &Value)> = self
            .object(ShapeType::Union)?
            .iter()
            .filter(|(key, value)| !value.is_null() && key.as_str() != TYPE_KEY)
            .collect();
        let &[(key, value)] = present.as_slice() else {
            return Err(ShapeError::UnionArity {
                shape: schema.shape().id().clone(),
                count: present.len(),
            });
        };
        match self.lookup(schema, key) {
            Some(member) => {
                consumer(member, &mut self.child(value))?;
                Ok(UnionMember::Known(member.expect_member_index()?))
            }
            None => {
                tracing::debug!(shape = %schema.id(), tag = %key, "unknown union member");
                Ok(UnionMember::Unknown(key.clone()))
            }
        }
    }

    fn read_list(&mut self, schema: &'static Schema, consumer: &mut ElementConsumer<'_>) -> ShapeResult<()> {
        self.enter()?;
        let items = self.value.as_array().ok_or_else(|| self.mismatch(ShapeType::List))?;
        let sparse = schema.is_sparse();
        for item in items {
            if item.is_null() && !sparse {
                self.config.null_policy.on_null(schema)?;
                continue;
            }
            consumer(&mut self.child(item))?;
        }
        Ok(())
    }

    fn read_map(&mut self, schema: &'static Schema, consumer: &mut EntryConsumer<'_>) -> ShapeResult<()> {
        self.enter()?;
        let sparse = schema.is_sparse();
        for (key, value) in self.object(ShapeType::Map)? {
            if value.is_null() && !sparse {
                self.config.null_policy.on_null(schema)?;
                continue;
            }
            consumer(key.clone(), &mut self.child(value))?;
        }
        Ok(())
    }

    fn read_boolean(&mut self, _schema: &'static Schema) -> ShapeResult<bool> {
        self.value.as_bool().ok_or_else(|| self.mismatch(ShapeType::Boolean))
    }

    fn read_byte(&mut self, _schema: &'static Schema) -> ShapeResult<i8> {
        self.integer(ShapeType::Byte)
    }

    fn read_short(&mut self, _schema: &'static Schema) -> ShapeResult<i16> {
        self.integer(ShapeType::Short)
    }

    fn read_integer(&mut self, _schema: &'static Schema) -> ShapeResult<i32> {
        self.integer(ShapeType::Integer)
    }

    fn read_long(&mut self, _schema: &'static Schema) -> ShapeResult<i64> {
        self.integer(ShapeType::Long)
    }

    fn read_big_integer(&mut self, _schema: &'static Schema) -> ShapeResult<BigInt> {
        let number = self.number(ShapeType::BigInteger)?;
        if number.is_f64() {
            return Err(ShapeError::mismatch(ShapeType::BigInteger, "fractional number"));
        }
        number
            .to_string()
            .parse()
            .map_err(|e| ShapeError::Deserialization(format!("invalid big integer {number}: {e}")))
    }

    fn read_float(&mut self, _schema: &'static Schema) -> ShapeResult<f32> {
        let wide = self.float(ShapeType::Float)?;
        if wide.is_finite() && wide.abs() > f64::from(f32::MAX) {
            return Err(ShapeError::OutOfRange {
                value: wide.to_string(),
                target: ShapeType::Float,
            });
        }
        Ok(wide as f32)
    }

    fn read_double(&mut self, _schema: &'static Schema) -> ShapeResult<f64> {
        self.float(ShapeType::Double)
    }

    fn read_big_decimal(&mut self, _schema: &'static Schema) -> ShapeResult<BigDecimal> {
        let number = self.number(ShapeType::BigDecimal)?;
        number
            .to_string()
            .parse()
            .map_err(|e| ShapeError::Deserialization(format!("invalid big decimal {number}: {e}")))
    }

    fn read_string(&mut self, _schema: &'static Schema) -> ShapeResult<String> {
        self.value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.mismatch(ShapeType::String))
    }

    fn read_blob(&mut self, _schema: &'static Schema) -> ShapeResult<Vec<u8>> {
        let text = self.value.as_str().ok_or_else(|| self.mismatch(ShapeType::Blob))?;
        wire::decode_blob(text)
    }

    /// Numbers for `epoch-seconds`, strings for the text formats
    fn read_timestamp(&mut self, schema: &'static Schema) -> ShapeResult<DateTime<Utc>> {
        let format = self.config.timestamp_format_for(schema);
        match self.value {
            Value::Number(number) if format.is_numeric() => match number.as_i64() {
                Some(seconds) => from_epoch_integer(seconds),
                None => from_epoch_seconds(number.as_f64().ok_or_else(|| ShapeError::OutOfRange {
                    value: number.to_string(),
                    target: ShapeType::Timestamp,
                })?),
            },
            Value::String(text) if !format.is_numeric() => format.parse(text),
            _ => Err(self.mismatch(format!("{format} timestamp"))),
        }
    }

    fn read_document(&mut self, _schema: &'static Schema) -> ShapeResult<Document> {
        Ok(value_to_document(self.value))
    }

    fn read_unknown_member(&mut self, schema: &'static Schema, tag: &str) -> ShapeResult<Document> {
        self.object(ShapeType::Union)?
            .get(tag)
            .map(value_to_document)
            .ok_or_else(|| ShapeError::UnknownVariant {
                shape: schema.shape().id().clone(),
                tag: tag.to_string(),
            })
    }

    fn is_null(&self) -> bool {
        self.value.is_null()
    }

    fn read_null(&mut self, _schema: &'static Schema) -> ShapeResult<()> {
        if self.value.is_null() {
            Ok(())
        } else {
            Err(self.mismatch("null"))
        }
    }

    fn container_size(&self) -> Option<usize> {
        match self.value {
            Value::Array(items) => Some(items.len()),
            Value::Object(members) => Some(members.len()),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "deserializer/deserializer_tests.rs"]
mod deserializer_tests;
