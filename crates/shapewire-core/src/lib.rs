//! shapewire-core - Schemas, documents and the shape serde contracts
//!
//! This crate provides the protocol-agnostic data model:
//! - [`Schema`] and [`ShapeType`] describing shapes, members and traits
//! - [`Document`] for self-describing values
//! - [`ShapeSerializer`] / [`ShapeDeserializer`] implemented by protocols
//! - [`SerializeShape`] / [`DeserializeShape`] implemented by shape values
//! - [`TypeRegistry`] for late-bound dispatch by shape id
//! - [`SchemaRegistry`] for models declared at runtime

mod config;
pub mod document;
mod error;
pub mod members;
pub mod prelude_schemas;
mod registry;
pub mod schema;
pub mod shape_serde;
mod shape_type;
pub mod timestamp;
mod traits;
mod type_registry;
mod value;

pub use config::{NullPolicy, SerdeConfig};
pub use document::{Document, DocumentDeserializer, DocumentSerializer, DocumentValue};
pub use error::{ShapeError, ShapeResult};
pub use registry::{SchemaRegistry, SchemaRegistryBuilder};
pub use schema::{MemberDef, Schema, SchemaBuilder, SchemaRef, ShapeId};
pub use shape_serde::{
    DeserializeShape, MapSerializer, SerializeShape, SerializeStructure, Shape, ShapeDeserializer, ShapeSchema,
    ShapeSerializer, UnionMember,
};
pub use shape_type::ShapeType;
pub use timestamp::TimestampFormat;
pub use traits::{DefaultValue, ErrorFault, TraitSet};
pub use type_registry::{DynamicShape, TypeEntry, TypeRegistry, TypeRegistryBuilder};
pub use value::Blob;

// Re-exported for generated code and schema declarations
pub use bigdecimal::BigDecimal;
pub use chrono::{DateTime, Utc};
pub use indexmap::IndexMap;
pub use num_bigint::BigInt;
pub use once_cell::sync::Lazy;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Blob, DefaultValue, DeserializeShape, Document, Lazy, Schema, SchemaRef, SerializeShape, SerializeStructure,
        Shape, ShapeDeserializer, ShapeError, ShapeId, ShapeResult, ShapeSchema, ShapeSerializer, ShapeType, TraitSet,
        TypeRegistry, prelude_schemas,
    };
}

#[cfg(test)]
mod test_support;
