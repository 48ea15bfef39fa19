//! Protocol-agnostic documents
//!
//! A [`Document`] is a self-describing value: a [`DocumentValue`] plus the
//! [`Schema`] it was produced under and an optional discriminator used for
//! late-bound dispatch through a [`TypeRegistry`](crate::TypeRegistry).
//!
//! Documents are immutable. Container operations such as
//! [`with_entry`](Document::with_entry) return a new document and leave the
//! receiver untouched.
//!
//! # Accessors
//!
//! `as_*` accessors check the stored value and fail with
//! [`ShapeError::TypeMismatch`] when it does not match. The only coercions
//! are numeric:
//!
//! - integer accessors accept any integer value that fits the target
//!   (otherwise [`ShapeError::OutOfRange`])
//! - float, double and decimal accessors accept any numeric value
//!
//! Strings are never read as blobs or the reverse at this layer; protocol
//! documents such as the JSON one layer that on top.

mod deserializer;
mod serializer;

pub use deserializer::DocumentDeserializer;
pub use serializer::DocumentSerializer;

use crate::error::{ShapeError, ShapeResult};
use crate::members::{self, REDACTED};
use crate::prelude_schemas;
use crate::schema::{Schema, ShapeId};
use crate::shape_serde::{
    DeserializeShape, SerializeShape, SerializeStructure, ShapeDeserializer, ShapeSchema, ShapeSerializer,
    UnionMember,
};
use crate::shape_type::ShapeType;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};

/// The value held by a [`Document`]
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentValue {
    Null,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Integer(i32),
    Long(i64),
    BigInteger(BigInt),
    Float(f32),
    Double(f64),
    BigDecimal(BigDecimal),
    String(String),
    Blob(Vec<u8>),
    Timestamp(DateTime<Utc>),
    List(Vec<Document>),
    /// Map entries, or structure and union members keyed by member name
    Map(IndexMap<String, Document>),
}

impl DocumentValue {
    /// Shape type naturally matching this value
    pub fn shape_type(&self) -> ShapeType {
        match self {
            DocumentValue::Null => ShapeType::Document,
            DocumentValue::Boolean(_) => ShapeType::Boolean,
            DocumentValue::Byte(_) => ShapeType::Byte,
            DocumentValue::Short(_) => ShapeType::Short,
            DocumentValue::Integer(_) => ShapeType::Integer,
            DocumentValue::Long(_) => ShapeType::Long,
            DocumentValue::BigInteger(_) => ShapeType::BigInteger,
            DocumentValue::Float(_) => ShapeType::Float,
            DocumentValue::Double(_) => ShapeType::Double,
            DocumentValue::BigDecimal(_) => ShapeType::BigDecimal,
            DocumentValue::String(_) => ShapeType::String,
            DocumentValue::Blob(_) => ShapeType::Blob,
            DocumentValue::Timestamp(_) => ShapeType::Timestamp,
            DocumentValue::List(_) => ShapeType::List,
            DocumentValue::Map(_) => ShapeType::Map,
        }
    }
}

/// Self-describing value with a schema and discriminator
#[derive(Clone)]
pub struct Document {
    value: DocumentValue,
    schema: &'static Schema,
    discriminator: Option<ShapeId>,
}

impl Document {
    pub fn new(value: DocumentValue, schema: &'static Schema) -> Self {
        Self {
            value,
            schema,
            discriminator: None,
        }
    }

    pub fn null() -> Self {
        Self::new(DocumentValue::Null, &prelude_schemas::DOCUMENT)
    }

    pub fn blob(bytes: Vec<u8>) -> Self {
        Self::new(DocumentValue::Blob(bytes), &prelude_schemas::BLOB)
    }

    /// Structure or union document with members keyed by member name
    ///
    /// Every key must name a member of `schema` and every required member without a
    /// default must be present; a union must have exactly one non-null member.
    pub fn structure(schema: &'static Schema, entries: IndexMap<String, Document>) -> ShapeResult<Document> {
        let shape_type = schema.shape_type();
        if !shape_type.is_structure_like() {
            return Err(ShapeError::mismatch("structure or union", shape_type));
        }
        for key in entries.keys() {
            schema.expect_member(key)?;
        }
        members::check_required(schema, |name| entries.get(name).is_some_and(|doc| !doc.is_null()))?;
        if shape_type == ShapeType::Union {
            let count = entries.values().filter(|doc| !doc.is_null()).count();
            if count != 1 {
                return Err(ShapeError::UnionArity {
                    shape: schema.shape().id().clone(),
                    count,
                });
            }
        }
        Ok(Self::new(DocumentValue::Map(entries), schema))
    }

    /// Capture a shape value under its own schema
    pub fn from_shape<T: ShapeSchema + SerializeShape + ?Sized>(value: &T) -> ShapeResult<Document> {
        Self::from_shape_with(T::schema(), value)
    }

    /// Capture a value under an explicit schema
    pub fn from_shape_with<T: SerializeShape + ?Sized>(schema: &'static Schema, value: &T) -> ShapeResult<Document> {
        let mut serializer = DocumentSerializer::new();
        value.serialize_shape(schema, &mut serializer)?;
        serializer.finish()
    }

    /// Convert into a shape value using the value type's schema
    pub fn as_shape<T: ShapeSchema + DeserializeShape>(&self) -> ShapeResult<T> {
        self.as_shape_with(T::schema())
    }

    /// Convert into a value read under an explicit schema
    pub fn as_shape_with<T: DeserializeShape>(&self, schema: &'static Schema) -> ShapeResult<T> {
        T::deserialize_shape(schema, &mut DocumentDeserializer::new(self))
    }

    pub fn with_schema(mut self, schema: &'static Schema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_discriminator(mut self, discriminator: ShapeId) -> Self {
        self.discriminator = Some(discriminator);
        self
    }

    pub fn value(&self) -> &DocumentValue {
        &self.value
    }

    pub fn into_value(self) -> DocumentValue {
        self.value
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Shape type of the schema, or of the value for generic documents
    pub fn shape_type(&self) -> ShapeType {
        match self.schema.shape_type() {
            ShapeType::Document => self.value.shape_type(),
            shape_type => shape_type,
        }
    }

    /// Shape id used for registry dispatch
    ///
    /// The explicit discriminator when set, else the id of the document's schema.
    pub fn discriminator(&self) -> &ShapeId {
        self.discriminator.as_ref().unwrap_or_else(|| self.schema.shape().id())
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, DocumentValue::Null)
    }

    // Accessors

    pub fn as_boolean(&self) -> ShapeResult<bool> {
        match &self.value {
            DocumentValue::Boolean(v) => Ok(*v),
            _ => Err(self.mismatch(ShapeType::Boolean)),
        }
    }

    pub fn as_byte(&self) -> ShapeResult<i8> {
        self.integer(ShapeType::Byte)
    }

    pub fn as_short(&self) -> ShapeResult<i16> {
        self.integer(ShapeType::Short)
    }

    pub fn as_integer(&self) -> ShapeResult<i32> {
        self.integer(ShapeType::Integer)
    }

    pub fn as_long(&self) -> ShapeResult<i64> {
        self.integer(ShapeType::Long)
    }

    pub fn as_big_integer(&self) -> ShapeResult<BigInt> {
        match &self.value {
            DocumentValue::Byte(v) => Ok(BigInt::from(*v)),
            DocumentValue::Short(v) => Ok(BigInt::from(*v)),
            DocumentValue::Integer(v) => Ok(BigInt::from(*v)),
            DocumentValue::Long(v) => Ok(BigInt::from(*v)),
            DocumentValue::BigInteger(v) => Ok(v.clone()),
            _ => Err(self.mismatch(ShapeType::BigInteger)),
        }
    }

    pub fn as_float(&self) -> ShapeResult<f32> {
        self.as_double().map(|v| v as f32)
    }

    pub fn as_double(&self) -> ShapeResult<f64> {
        let converted = match &self.value {
            DocumentValue::Byte(v) => Some(f64::from(*v)),
            DocumentValue::Short(v) => Some(f64::from(*v)),
            DocumentValue::Integer(v) => Some(f64::from(*v)),
            DocumentValue::Long(v) => Some(*v as f64),
            DocumentValue::BigInteger(v) => v.to_f64(),
            DocumentValue::Float(v) => Some(f64::from(*v)),
            DocumentValue::Double(v) => Some(*v),
            DocumentValue::BigDecimal(v) => v.to_f64(),
            _ => return Err(self.mismatch(ShapeType::Double)),
        };
        converted.ok_or_else(|| self.out_of_range(ShapeType::Double))
    }

    pub fn as_big_decimal(&self) -> ShapeResult<BigDecimal> {
        let converted = match &self.value {
            DocumentValue::Byte(v) => Some(BigDecimal::from(*v)),
            DocumentValue::Short(v) => Some(BigDecimal::from(*v)),
            DocumentValue::Integer(v) => Some(BigDecimal::from(*v)),
            DocumentValue::Long(v) => Some(BigDecimal::from(*v)),
            DocumentValue::BigInteger(v) => Some(BigDecimal::new(v.clone(), 0)),
            DocumentValue::Float(v) => BigDecimal::from_f32(*v),
            DocumentValue::Double(v) => BigDecimal::from_f64(*v),
            DocumentValue::BigDecimal(v) => Some(v.clone()),
            _ => return Err(self.mismatch(ShapeType::BigDecimal)),
        };
        converted.ok_or_else(|| self.out_of_range(ShapeType::BigDecimal))
    }

    pub fn as_string(&self) -> ShapeResult<&str> {
        match &self.value {
            DocumentValue::String(v) => Ok(v),
            _ => Err(self.mismatch(ShapeType::String)),
        }
    }

    pub fn as_blob(&self) -> ShapeResult<&[u8]> {
        match &self.value {
            DocumentValue::Blob(v) => Ok(v),
            _ => Err(self.mismatch(ShapeType::Blob)),
        }
    }

    pub fn as_timestamp(&self) -> ShapeResult<DateTime<Utc>> {
        match &self.value {
            DocumentValue::Timestamp(v) => Ok(*v),
            _ => Err(self.mismatch(ShapeType::Timestamp)),
        }
    }

    pub fn as_list(&self) -> ShapeResult<&[Document]> {
        match &self.value {
            DocumentValue::List(v) => Ok(v),
            _ => Err(self.mismatch(ShapeType::List)),
        }
    }

    /// Entries of a map, structure or union document
    pub fn as_map(&self) -> ShapeResult<&IndexMap<String, Document>> {
        match &self.value {
            DocumentValue::Map(v) => Ok(v),
            _ => Err(self.mismatch(ShapeType::Map)),
        }
    }

    // Container operations

    /// Number of elements, entries or set members
    pub fn len(&self) -> ShapeResult<usize> {
        match &self.value {
            DocumentValue::List(items) => Ok(items.len()),
            DocumentValue::Map(entries) => Ok(entries.len()),
            _ => Err(self.not_a_container()),
        }
    }

    pub fn is_empty(&self) -> ShapeResult<bool> {
        self.len().map(|len| len == 0)
    }

    pub fn get(&self, key: &str) -> ShapeResult<Option<&Document>> {
        Ok(self.entries()?.get(key))
    }

    pub fn contains_key(&self, key: &str) -> ShapeResult<bool> {
        Ok(self.entries()?.contains_key(key))
    }

    pub fn keys(&self) -> ShapeResult<Vec<&str>> {
        Ok(self.entries()?.keys().map(String::as_str).collect())
    }

    pub fn get_index(&self, index: usize) -> ShapeResult<&Document> {
        let items = self.elements()?;
        items.get(index).ok_or(ShapeError::IndexOutOfBounds {
            index,
            len: items.len(),
        })
    }

    /// Copy with `key` set to `value`
    ///
    /// On a union this replaces the current variant. On a structure the key must name a member.
    pub fn with_entry(&self, key: impl Into<String>, value: Document) -> ShapeResult<Document> {
        let key = key.into();
        let entries = self.entries()?;
        match self.schema.shape_type() {
            ShapeType::Union => Document::structure(self.schema, IndexMap::from([(key, value)]))
                .map(|doc| doc.keep_discriminator(self)),
            shape_type => {
                if shape_type == ShapeType::Structure {
                    self.schema.expect_member(&key)?;
                }
                let mut entries = entries.clone();
                entries.insert(key, value);
                Ok(self.with_value(DocumentValue::Map(entries)))
            }
        }
    }

    /// Copy without `key`; always fails on unions
    pub fn without_entry(&self, key: &str) -> ShapeResult<Document> {
        let entries = self.entries()?;
        if self.schema.shape_type() == ShapeType::Union {
            return Err(ShapeError::InvalidUnionMutation(self.schema.shape().id().clone()));
        }
        let mut entries = entries.clone();
        entries.shift_remove(key);
        Ok(self.with_value(DocumentValue::Map(entries)))
    }

    /// Copy with the element at `index` replaced
    pub fn with_element(&self, index: usize, value: Document) -> ShapeResult<Document> {
        let mut items = self.elements()?.to_vec();
        let len = items.len();
        let slot = items
            .get_mut(index)
            .ok_or(ShapeError::IndexOutOfBounds { index, len })?;
        *slot = value;
        Ok(self.with_value(DocumentValue::List(items)))
    }

    /// Copy with `value` appended
    pub fn with_appended(&self, value: Document) -> ShapeResult<Document> {
        let mut items = self.elements()?.to_vec();
        items.push(value);
        Ok(self.with_value(DocumentValue::List(items)))
    }

    /// Copy with the element at `index` removed
    pub fn without_element(&self, index: usize) -> ShapeResult<Document> {
        let mut items = self.elements()?.to_vec();
        if index >= items.len() {
            return Err(ShapeError::IndexOutOfBounds {
                index,
                len: items.len(),
            });
        }
        items.remove(index);
        Ok(self.with_value(DocumentValue::List(items)))
    }

    fn entries(&self) -> ShapeResult<&IndexMap<String, Document>> {
        match &self.value {
            DocumentValue::Map(entries) => Ok(entries),
            DocumentValue::List(_) => Err(self.mismatch(ShapeType::Map)),
            _ => Err(self.not_a_container()),
        }
    }

    fn elements(&self) -> ShapeResult<&[Document]> {
        match &self.value {
            DocumentValue::List(items) => Ok(items),
            DocumentValue::Map(_) => Err(self.mismatch(ShapeType::List)),
            _ => Err(self.not_a_container()),
        }
    }

    fn with_value(&self, value: DocumentValue) -> Document {
        Document {
            value,
            schema: self.schema,
            discriminator: self.discriminator.clone(),
        }
    }

    fn keep_discriminator(mut self, source: &Document) -> Document {
        self.discriminator = source.discriminator.clone();
        self
    }

    fn integer<T: TryFrom<i64>>(&self, target: ShapeType) -> ShapeResult<T> {
        let wide = match &self.value {
            DocumentValue::Byte(v) => i64::from(*v),
            DocumentValue::Short(v) => i64::from(*v),
            DocumentValue::Integer(v) => i64::from(*v),
            DocumentValue::Long(v) => *v,
            DocumentValue::BigInteger(v) => v.to_i64().ok_or_else(|| self.out_of_range(target))?,
            _ => return Err(self.mismatch(target)),
        };
        T::try_from(wide).map_err(|_| self.out_of_range(target))
    }

    fn value_kind(&self) -> String {
        match self.value {
            DocumentValue::Null => "null".to_string(),
            ref value => value.shape_type().to_string(),
        }
    }

    fn mismatch(&self, expected: ShapeType) -> ShapeError {
        ShapeError::mismatch(expected, self.value_kind())
    }

    fn out_of_range(&self, target: ShapeType) -> ShapeError {
        let value = match &self.value {
            DocumentValue::BigInteger(v) => v.to_string(),
            DocumentValue::BigDecimal(v) => v.to_string(),
            other => format!("{other:?}"),
        };
        ShapeError::OutOfRange { value, target }
    }

    fn not_a_container(&self) -> ShapeError {
        ShapeError::NotAContainer(self.shape_type())
    }

    /// Write this document walking `schema` instead of as an opaque document
    fn write_as(&self, schema: &'static Schema, serializer: &mut dyn ShapeSerializer) -> ShapeResult<()> {
        if self.is_null() {
            return serializer.write_null(schema);
        }
        match schema.shape_type() {
            ShapeType::Structure | ShapeType::Union => {
                serializer.write_struct(schema, &DocumentMembers { doc: self, schema })
            }
            ShapeType::List => {
                let items = self.as_list()?;
                let member = schema.list_member()?;
                serializer.write_list(schema, items.len(), &mut |ser| {
                    items.iter().try_for_each(|item| item.serialize_shape(member, ser))
                })
            }
            ShapeType::Map => {
                let entries = self.as_map()?;
                let value_member = schema.map_value()?;
                serializer.write_map(schema, entries.len(), &mut |map| {
                    entries.iter().try_for_each(|(key, value)| {
                        map.write_entry(key, &mut |ser| value.serialize_shape(value_member, ser))
                    })
                })
            }
            ShapeType::Boolean => serializer.write_boolean(schema, self.as_boolean()?),
            ShapeType::Byte => serializer.write_byte(schema, self.as_byte()?),
            ShapeType::Short => serializer.write_short(schema, self.as_short()?),
            ShapeType::Integer | ShapeType::IntEnum => serializer.write_integer(schema, self.as_integer()?),
            ShapeType::Long => serializer.write_long(schema, self.as_long()?),
            ShapeType::BigInteger => serializer.write_big_integer(schema, &self.as_big_integer()?),
            ShapeType::Float => serializer.write_float(schema, self.as_float()?),
            ShapeType::Double => serializer.write_double(schema, self.as_double()?),
            ShapeType::BigDecimal => serializer.write_big_decimal(schema, &self.as_big_decimal()?),
            ShapeType::String | ShapeType::Enum => serializer.write_string(schema, self.as_string()?),
            ShapeType::Blob => serializer.write_blob(schema, self.as_blob()?),
            ShapeType::Timestamp => serializer.write_timestamp(schema, &self.as_timestamp()?),
            ShapeType::Document => serializer.write_document(schema, self),
        }
    }

    /// Read a document walking `schema`
    fn read_as(schema: &'static Schema, deserializer: &mut dyn ShapeDeserializer) -> ShapeResult<Document> {
        if deserializer.is_null() {
            deserializer.read_null(schema)?;
            return Ok(Document::new(DocumentValue::Null, schema));
        }
        let value = match schema.shape_type() {
            ShapeType::Document => return deserializer.read_document(schema),
            ShapeType::Structure => {
                let mut entries = IndexMap::new();
                deserializer.read_struct(schema, &mut |member, de| {
                    entries.insert(member_key(member)?, Document::read_as(member, de)?);
                    Ok(())
                })?;
                members::check_required(schema, |name| entries.contains_key(name))?;
                DocumentValue::Map(entries)
            }
            ShapeType::Union => {
                let mut entries = IndexMap::new();
                let outcome = deserializer.read_union(schema, &mut |member, de| {
                    entries.insert(member_key(member)?, Document::read_as(member, de)?);
                    Ok(())
                })?;
                if let UnionMember::Unknown(tag) = outcome {
                    let value = deserializer.read_unknown_member(schema, &tag)?;
                    entries.insert(tag, value);
                }
                DocumentValue::Map(entries)
            }
            ShapeType::List => {
                let member = schema.list_member()?;
                let mut items = Vec::with_capacity(deserializer.container_size().unwrap_or(0));
                deserializer.read_list(schema, &mut |de| {
                    items.push(Document::read_as(member, de)?);
                    Ok(())
                })?;
                DocumentValue::List(items)
            }
            ShapeType::Map => {
                let value_member = schema.map_value()?;
                let mut entries = IndexMap::new();
                deserializer.read_map(schema, &mut |key, de| {
                    entries.insert(key, Document::read_as(value_member, de)?);
                    Ok(())
                })?;
                DocumentValue::Map(entries)
            }
            ShapeType::Boolean => DocumentValue::Boolean(deserializer.read_boolean(schema)?),
            ShapeType::Byte => DocumentValue::Byte(deserializer.read_byte(schema)?),
            ShapeType::Short => DocumentValue::Short(deserializer.read_short(schema)?),
            ShapeType::Integer | ShapeType::IntEnum => DocumentValue::Integer(deserializer.read_integer(schema)?),
            ShapeType::Long => DocumentValue::Long(deserializer.read_long(schema)?),
            ShapeType::BigInteger => DocumentValue::BigInteger(deserializer.read_big_integer(schema)?),
            ShapeType::Float => DocumentValue::Float(deserializer.read_float(schema)?),
            ShapeType::Double => DocumentValue::Double(deserializer.read_double(schema)?),
            ShapeType::BigDecimal => DocumentValue::BigDecimal(deserializer.read_big_decimal(schema)?),
            ShapeType::String | ShapeType::Enum => DocumentValue::String(deserializer.read_string(schema)?),
            ShapeType::Blob => DocumentValue::Blob(deserializer.read_blob(schema)?),
            ShapeType::Timestamp => DocumentValue::Timestamp(deserializer.read_timestamp(schema)?),
        };
        Ok(Document::new(value, schema))
    }
}

fn member_key(member: &Schema) -> ShapeResult<String> {
    member
        .member_name()
        .map(str::to_string)
        .ok_or_else(|| ShapeError::InvalidSchema(format!("{} is not a member schema", member.id())))
}

struct DocumentMembers<'a> {
    doc: &'a Document,
    schema: &'static Schema,
}

impl SerializeStructure for DocumentMembers<'_> {
    fn serialize_members(&self, serializer: &mut dyn ShapeSerializer) -> ShapeResult<()> {
        let entries = self.doc.as_map()?;
        for member in self.schema.members() {
            let Some(name) = member.member_name() else {
                continue;
            };
            match entries.get(name) {
                Some(value) if !value.is_null() => value.serialize_shape(member, serializer)?,
                _ => {}
            }
        }
        Ok(())
    }
}

/// Written as a document under a `document` schema, walked by the schema otherwise
impl SerializeShape for Document {
    fn serialize_shape(&self, schema: &'static Schema, serializer: &mut dyn ShapeSerializer) -> ShapeResult<()> {
        self.write_as(schema, serializer)
    }
}

impl DeserializeShape for Document {
    fn deserialize_shape(schema: &'static Schema, deserializer: &mut dyn ShapeDeserializer) -> ShapeResult<Self> {
        Document::read_as(schema, deserializer)
    }
}

impl ShapeSchema for Document {
    fn schema() -> &'static Schema {
        &prelude_schemas::DOCUMENT
    }
}

/// Compares values only; schema and discriminator are ignored
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.schema.is_sensitive() {
            return f.write_str(REDACTED);
        }
        match &self.value {
            DocumentValue::List(items) => f.debug_list().entries(items).finish(),
            DocumentValue::Map(entries) => f.debug_map().entries(entries).finish(),
            value => std::fmt::Debug::fmt(value, f),
        }
    }
}

macro_rules! document_from {
    ($($ty:ty => $variant:ident, $schema:ident;)*) => {
        $(
            impl From<$ty> for Document {
                fn from(value: $ty) -> Self {
                    Document::new(DocumentValue::$variant(value.into()), &prelude_schemas::$schema)
                }
            }
        )*
    };
}

document_from! {
    bool => Boolean, BOOLEAN;
    i8 => Byte, BYTE;
    i16 => Short, SHORT;
    i32 => Integer, INTEGER;
    i64 => Long, LONG;
    BigInt => BigInteger, BIG_INTEGER;
    f32 => Float, FLOAT;
    f64 => Double, DOUBLE;
    BigDecimal => BigDecimal, BIG_DECIMAL;
    String => String, STRING;
    &str => String, STRING;
    DateTime<Utc> => Timestamp, TIMESTAMP;
    Vec<Document> => List, LIST;
    IndexMap<String, Document> => Map, MAP;
}
