//! Shape impls for built-in Rust types
//!
//! Scalars map to the matching prelude schema. Collections take their
//! element schema from the list or map schema they are written under, so a
//! `Vec<String>` can be written under any list schema whose member targets
//! a string.

use crate::error::ShapeResult;
use crate::prelude_schemas;
use crate::schema::Schema;
use crate::shape_serde::{DeserializeShape, SerializeShape, ShapeDeserializer, ShapeSchema, ShapeSerializer};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use num_bigint::BigInt;
use std::collections::BTreeMap;

macro_rules! scalar_shape {
    ($($ty:ty => $schema:ident, $write:ident, $read:ident;)*) => {
        $(
            impl ShapeSchema for $ty {
                fn schema() -> &'static Schema {
                    &prelude_schemas::$schema
                }
            }

            impl SerializeShape for $ty {
                fn serialize_shape(&self, schema: &'static Schema, serializer: &mut dyn ShapeSerializer) -> ShapeResult<()> {
                    serializer.$write(schema, *self)
                }
            }

            impl DeserializeShape for $ty {
                fn deserialize_shape(schema: &'static Schema, deserializer: &mut dyn ShapeDeserializer) -> ShapeResult<Self> {
                    deserializer.$read(schema)
                }
            }
        )*
    };
}

scalar_shape! {
    bool => BOOLEAN, write_boolean, read_boolean;
    i8 => BYTE, write_byte, read_byte;
    i16 => SHORT, write_short, read_short;
    i32 => INTEGER, write_integer, read_integer;
    i64 => LONG, write_long, read_long;
    f32 => FLOAT, write_float, read_float;
    f64 => DOUBLE, write_double, read_double;
}

macro_rules! borrowed_shape {
    ($($ty:ty => $schema:ident, $write:ident, $read:ident;)*) => {
        $(
            impl ShapeSchema for $ty {
                fn schema() -> &'static Schema {
                    &prelude_schemas::$schema
                }
            }

            impl SerializeShape for $ty {
                fn serialize_shape(&self, schema: &'static Schema, serializer: &mut dyn ShapeSerializer) -> ShapeResult<()> {
                    serializer.$write(schema, self)
                }
            }

            impl DeserializeShape for $ty {
                fn deserialize_shape(schema: &'static Schema, deserializer: &mut dyn ShapeDeserializer) -> ShapeResult<Self> {
                    deserializer.$read(schema)
                }
            }
        )*
    };
}

borrowed_shape! {
    String => STRING, write_string, read_string;
    BigInt => BIG_INTEGER, write_big_integer, read_big_integer;
    BigDecimal => BIG_DECIMAL, write_big_decimal, read_big_decimal;
    DateTime<Utc> => TIMESTAMP, write_timestamp, read_timestamp;
}

impl ShapeSchema for str {
    fn schema() -> &'static Schema {
        &prelude_schemas::STRING
    }
}

impl SerializeShape for str {
    fn serialize_shape(&self, schema: &'static Schema, serializer: &mut dyn ShapeSerializer) -> ShapeResult<()> {
        serializer.write_string(schema, self)
    }
}

/// Binary data, written with `write_blob`
///
/// `Vec<u8>` is a list of bytes; this newtype is the blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Blob(pub Vec<u8>);

impl Blob {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl std::ops::Deref for Blob {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Blob {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl ShapeSchema for Blob {
    fn schema() -> &'static Schema {
        &prelude_schemas::BLOB
    }
}

impl SerializeShape for Blob {
    fn serialize_shape(&self, schema: &'static Schema, serializer: &mut dyn ShapeSerializer) -> ShapeResult<()> {
        serializer.write_blob(schema, &self.0)
    }
}

impl DeserializeShape for Blob {
    fn deserialize_shape(schema: &'static Schema, deserializer: &mut dyn ShapeDeserializer) -> ShapeResult<Self> {
        deserializer.read_blob(schema).map(Blob)
    }
}

impl<T: SerializeShape> SerializeShape for [T] {
    fn serialize_shape(&self, schema: &'static Schema, serializer: &mut dyn ShapeSerializer) -> ShapeResult<()> {
        let member = schema.list_member()?;
        serializer.write_list(schema, self.len(), &mut |ser| {
            self.iter().try_for_each(|item| item.serialize_shape(member, &mut *ser))
        })
    }
}

impl<T: SerializeShape> SerializeShape for Vec<T> {
    fn serialize_shape(&self, schema: &'static Schema, serializer: &mut dyn ShapeSerializer) -> ShapeResult<()> {
        self.as_slice().serialize_shape(schema, serializer)
    }
}

impl<T: DeserializeShape> DeserializeShape for Vec<T> {
    fn deserialize_shape(schema: &'static Schema, deserializer: &mut dyn ShapeDeserializer) -> ShapeResult<Self> {
        let member = schema.list_member()?;
        let mut items = Vec::with_capacity(deserializer.container_size().unwrap_or(0));
        deserializer.read_list(schema, &mut |de| {
            items.push(T::deserialize_shape(member, de)?);
            Ok(())
        })?;
        Ok(items)
    }
}

fn write_entries<'a, T: SerializeShape + 'a>(
    schema: &'static Schema,
    len: usize,
    entries: impl Iterator<Item = (&'a String, &'a T)> + Clone,
    serializer: &mut dyn ShapeSerializer,
) -> ShapeResult<()> {
    let value_member = schema.map_value()?;
    serializer.write_map(schema, len, &mut |map| {
        entries
            .clone()
            .try_for_each(|(key, value)| map.write_entry(key, &mut |ser| value.serialize_shape(value_member, ser)))
    })
}

impl<T: SerializeShape> SerializeShape for IndexMap<String, T> {
    fn serialize_shape(&self, schema: &'static Schema, serializer: &mut dyn ShapeSerializer) -> ShapeResult<()> {
        write_entries(schema, self.len(), self.iter(), serializer)
    }
}

impl<T: DeserializeShape> DeserializeShape for IndexMap<String, T> {
    fn deserialize_shape(schema: &'static Schema, deserializer: &mut dyn ShapeDeserializer) -> ShapeResult<Self> {
        let value_member = schema.map_value()?;
        let mut entries = IndexMap::with_capacity(deserializer.container_size().unwrap_or(0));
        deserializer.read_map(schema, &mut |key, de| {
            entries.insert(key, T::deserialize_shape(value_member, de)?);
            Ok(())
        })?;
        Ok(entries)
    }
}

impl<T: SerializeShape> SerializeShape for BTreeMap<String, T> {
    fn serialize_shape(&self, schema: &'static Schema, serializer: &mut dyn ShapeSerializer) -> ShapeResult<()> {
        write_entries(schema, self.len(), self.iter(), serializer)
    }
}

impl<T: DeserializeShape> DeserializeShape for BTreeMap<String, T> {
    fn deserialize_shape(schema: &'static Schema, deserializer: &mut dyn ShapeDeserializer) -> ShapeResult<Self> {
        let value_member = schema.map_value()?;
        let mut entries = BTreeMap::new();
        deserializer.read_map(schema, &mut |key, de| {
            entries.insert(key, T::deserialize_shape(value_member, de)?);
            Ok(())
        })?;
        Ok(entries)
    }
}

/// `None` is written as an explicit null; used for sparse collection elements
impl<T: SerializeShape> SerializeShape for Option<T> {
    fn serialize_shape(&self, schema: &'static Schema, serializer: &mut dyn ShapeSerializer) -> ShapeResult<()> {
        match self {
            Some(value) => value.serialize_shape(schema, serializer),
            None => serializer.write_null(schema),
        }
    }
}

impl<T: DeserializeShape> DeserializeShape for Option<T> {
    fn deserialize_shape(schema: &'static Schema, deserializer: &mut dyn ShapeDeserializer) -> ShapeResult<Self> {
        if deserializer.is_null() {
            deserializer.read_null(schema)?;
            return Ok(None);
        }
        T::deserialize_shape(schema, deserializer).map(Some)
    }
}

impl<T: ShapeSchema + ?Sized> ShapeSchema for Box<T> {
    fn schema() -> &'static Schema {
        T::schema()
    }
}

impl<T: SerializeShape + ?Sized> SerializeShape for Box<T> {
    fn serialize_shape(&self, schema: &'static Schema, serializer: &mut dyn ShapeSerializer) -> ShapeResult<()> {
        (**self).serialize_shape(schema, serializer)
    }
}

impl<T: DeserializeShape> DeserializeShape for Box<T> {
    fn deserialize_shape(schema: &'static Schema, deserializer: &mut dyn ShapeDeserializer) -> ShapeResult<Self> {
        T::deserialize_shape(schema, deserializer).map(Box::new)
    }
}

impl<T: SerializeShape + ?Sized> SerializeShape for &T {
    fn serialize_shape(&self, schema: &'static Schema, serializer: &mut dyn ShapeSerializer) -> ShapeResult<()> {
        (**self).serialize_shape(schema, serializer)
    }
}

#[cfg(test)]
#[path = "value/value_tests.rs"]
mod value_tests;
