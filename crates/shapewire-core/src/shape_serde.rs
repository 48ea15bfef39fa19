//! Serializer and deserializer contracts
//!
//! Protocols implement [`ShapeSerializer`] and [`ShapeDeserializer`]; shape
//! values implement [`SerializeShape`] and [`DeserializeShape`]. Every call
//! carries the [`Schema`] of the value being written or read, so a protocol
//! can pick wire names, timestamp formats and null handling from the schema
//! alone, and a value never needs to know which protocol it is talking to.
//!
//! Both traits are object safe. Aggregates hand control back to the value
//! through callbacks:
//!
//! - structures and unions are written with [`ShapeSerializer::write_struct`],
//!   which calls [`SerializeStructure::serialize_members`]; each member is then
//!   written with its member schema
//! - lists and maps take a closure invoked once, which writes every element
//!   or entry
//! - on the read side, [`ShapeDeserializer::read_struct`] calls the consumer
//!   once per present, known, non-null member with that member's schema
//!
//! # Null handling
//!
//! Deserializers apply the same rules regardless of wire format:
//!
//! - unknown structure members are skipped
//! - a `null` structure member is treated as absent
//! - `null` elements of a non-sparse list or map are dropped, or rejected
//!   under [`NullPolicy::Reject`](crate::NullPolicy::Reject)
//! - `null` elements of a sparse list or map reach the consumer, where
//!   [`ShapeDeserializer::is_null`] reports them

use crate::document::Document;
use crate::error::ShapeResult;
use crate::schema::Schema;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use num_bigint::BigInt;

/// Callback writing the elements of a list
pub type ListWriter<'a> = dyn FnMut(&mut dyn ShapeSerializer) -> ShapeResult<()> + 'a;

/// Callback writing the entries of a map
pub type MapWriter<'a> = dyn FnMut(&mut dyn MapSerializer) -> ShapeResult<()> + 'a;

/// Callback writing one value
pub type ValueWriter<'a> = dyn FnMut(&mut dyn ShapeSerializer) -> ShapeResult<()> + 'a;

/// Callback receiving one structure or union member
pub type MemberConsumer<'a> =
    dyn FnMut(&'static Schema, &mut dyn ShapeDeserializer) -> ShapeResult<()> + 'a;

/// Callback receiving one list element
pub type ElementConsumer<'a> = dyn FnMut(&mut dyn ShapeDeserializer) -> ShapeResult<()> + 'a;

/// Callback receiving one map entry
pub type EntryConsumer<'a> = dyn FnMut(String, &mut dyn ShapeDeserializer) -> ShapeResult<()> + 'a;

/// Protocol-side writer driven by shape values
pub trait ShapeSerializer {
    /// Write a structure or union; members are written by `value`
    fn write_struct(&mut self, schema: &'static Schema, value: &dyn SerializeStructure) -> ShapeResult<()>;

    /// Write a list of `len` elements, each written by `elements` with the list member schema
    fn write_list(&mut self, schema: &'static Schema, len: usize, elements: &mut ListWriter<'_>) -> ShapeResult<()>;

    /// Write a map of `len` entries
    fn write_map(&mut self, schema: &'static Schema, len: usize, entries: &mut MapWriter<'_>) -> ShapeResult<()>;

    fn write_boolean(&mut self, schema: &'static Schema, value: bool) -> ShapeResult<()>;

    fn write_byte(&mut self, schema: &'static Schema, value: i8) -> ShapeResult<()>;

    fn write_short(&mut self, schema: &'static Schema, value: i16) -> ShapeResult<()>;

    fn write_integer(&mut self, schema: &'static Schema, value: i32) -> ShapeResult<()>;

    fn write_long(&mut self, schema: &'static Schema, value: i64) -> ShapeResult<()>;

    fn write_big_integer(&mut self, schema: &'static Schema, value: &BigInt) -> ShapeResult<()>;

    fn write_float(&mut self, schema: &'static Schema, value: f32) -> ShapeResult<()>;

    fn write_double(&mut self, schema: &'static Schema, value: f64) -> ShapeResult<()>;

    fn write_big_decimal(&mut self, schema: &'static Schema, value: &BigDecimal) -> ShapeResult<()>;

    fn write_string(&mut self, schema: &'static Schema, value: &str) -> ShapeResult<()>;

    fn write_blob(&mut self, schema: &'static Schema, value: &[u8]) -> ShapeResult<()>;

    fn write_timestamp(&mut self, schema: &'static Schema, value: &DateTime<Utc>) -> ShapeResult<()>;

    fn write_document(&mut self, schema: &'static Schema, value: &Document) -> ShapeResult<()>;

    fn write_null(&mut self, schema: &'static Schema) -> ShapeResult<()>;
}

/// Writes the entries of one map
pub trait MapSerializer {
    /// Write one entry; `value` writes the entry value with the map's value member schema
    fn write_entry(&mut self, key: &str, value: &mut ValueWriter<'_>) -> ShapeResult<()>;
}

/// Outcome of reading a union
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnionMember {
    /// The member at this index was read and handed to the consumer
    Known(usize),
    /// The single present member is not in the schema; its wire tag is kept
    Unknown(String),
}

/// Protocol-side reader driven by shape values
pub trait ShapeDeserializer {
    /// Read a structure, calling `consumer` for each present member
    fn read_struct(&mut self, schema: &'static Schema, consumer: &mut MemberConsumer<'_>) -> ShapeResult<()>;

    /// Read a union with exactly one non-null member
    ///
    /// Fails with `UnionArity` when zero or several members are present. An
    /// unrecognized member is reported as [`UnionMember::Unknown`] without
    /// calling `consumer`.
    fn read_union(&mut self, schema: &'static Schema, consumer: &mut MemberConsumer<'_>) -> ShapeResult<UnionMember>;

    /// Read a list, calling `consumer` for each element kept by the null rules
    fn read_list(&mut self, schema: &'static Schema, consumer: &mut ElementConsumer<'_>) -> ShapeResult<()>;

    /// Read a map, calling `consumer` for each entry kept by the null rules
    fn read_map(&mut self, schema: &'static Schema, consumer: &mut EntryConsumer<'_>) -> ShapeResult<()>;

    fn read_boolean(&mut self, schema: &'static Schema) -> ShapeResult<bool>;

    fn read_byte(&mut self, schema: &'static Schema) -> ShapeResult<i8>;

    fn read_short(&mut self, schema: &'static Schema) -> ShapeResult<i16>;

    fn read_integer(&mut self, schema: &'static Schema) -> ShapeResult<i32>;

    fn read_long(&mut self, schema: &'static Schema) -> ShapeResult<i64>;

    fn read_big_integer(&mut self, schema: &'static Schema) -> ShapeResult<BigInt>;

    fn read_float(&mut self, schema: &'static Schema) -> ShapeResult<f32>;

    fn read_double(&mut self, schema: &'static Schema) -> ShapeResult<f64>;

    fn read_big_decimal(&mut self, schema: &'static Schema) -> ShapeResult<BigDecimal>;

    fn read_string(&mut self, schema: &'static Schema) -> ShapeResult<String>;

    fn read_blob(&mut self, schema: &'static Schema) -> ShapeResult<Vec<u8>>;

    fn read_timestamp(&mut self, schema: &'static Schema) -> ShapeResult<DateTime<Utc>>;

    fn read_document(&mut self, schema: &'static Schema) -> ShapeResult<Document>;

    /// Untyped value of the unrecognized union member `tag`
    ///
    /// Call after [`ShapeDeserializer::read_union`] reported
    /// [`UnionMember::Unknown`], on the same union value.
    fn read_unknown_member(&mut self, schema: &'static Schema, tag: &str) -> ShapeResult<Document>;

    /// Whether the current value is null
    fn is_null(&self) -> bool;

    /// Consume a null value
    fn read_null(&mut self, schema: &'static Schema) -> ShapeResult<()>;

    /// Number of elements or entries in the current container, when known up front
    fn container_size(&self) -> Option<usize>;
}

/// A value that knows its own schema
pub trait ShapeSchema {
    fn schema() -> &'static Schema;
}

/// A value writable through any [`ShapeSerializer`]
pub trait SerializeShape {
    /// Write this value described by `schema`
    ///
    /// `schema` is the value's own schema at the top level and the member
    /// schema when the value is a member, element or entry.
    fn serialize_shape(&self, schema: &'static Schema, serializer: &mut dyn ShapeSerializer) -> ShapeResult<()>;
}

/// Member-by-member writer for structures and unions
pub trait SerializeStructure {
    fn serialize_members(&self, serializer: &mut dyn ShapeSerializer) -> ShapeResult<()>;
}

/// A value readable through any [`ShapeDeserializer`]
pub trait DeserializeShape: Sized {
    fn deserialize_shape(schema: &'static Schema, deserializer: &mut dyn ShapeDeserializer) -> ShapeResult<Self>;
}

/// A generated shape: schema plus both directions
pub trait Shape: ShapeSchema + SerializeShape + DeserializeShape {}

impl<T: ShapeSchema + SerializeShape + DeserializeShape> Shape for T {}

/// Write a value using its own schema
pub fn serialize<T: ShapeSchema + SerializeShape + ?Sized>(
    value: &T,
    serializer: &mut dyn ShapeSerializer,
) -> ShapeResult<()> {
    value.serialize_shape(T::schema(), serializer)
}

/// Read a value using its own schema
pub fn deserialize<T: ShapeSchema + DeserializeShape>(deserializer: &mut dyn ShapeDeserializer) -> ShapeResult<T> {
    T::deserialize_shape(T::schema(), deserializer)
}
