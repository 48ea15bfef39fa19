//! # shapewire
//!
//! Schema-driven shape serialization.
//!
//! Every shape value is described by a static [`Schema`]: its [`ShapeType`],
//! its ordered members and the traits attached to them. Protocols implement
//! [`ShapeSerializer`] / [`ShapeDeserializer`] once and can then encode any
//! shape, including [`Document`]s whose structure is only known at runtime.
//!
//! ## Declaring a shape
//!
//! ```ignore
//! use shapewire::prelude::*;
//!
//! static TAGS: Lazy<Schema> = Lazy::new(|| {
//!     Schema::list("example#Tags")
//!         .member("member", &prelude_schemas::STRING, TraitSet::new())
//!         .build()
//! });
//!
//! static WIDGET: Lazy<Schema> = Lazy::new(|| {
//!     Schema::structure("example#Widget")
//!         .member("name", &prelude_schemas::STRING, TraitSet::new().required())
//!         .member("tags", &TAGS, TraitSet::new())
//!         .build()
//! });
//!
//! #[derive(Shape, Clone, PartialEq)]
//! #[shape(schema = "WIDGET")]
//! pub struct Widget {
//!     pub name: String,
//!     pub tags: Option<Vec<String>>,
//! }
//!
//! let codec = JsonCodec::new();
//! let bytes = codec.encode(&Widget { name: "gear".into(), tags: None })?;
//! let widget: Widget = codec.decode(&bytes)?;
//! ```
//!
//! ## Crate Structure
//!
//! This is a facade crate that re-exports from:
//! - [`shapewire_core`] - Schemas, documents, serde contracts and registries
//! - [`shapewire_json`] - The JSON protocol
//! - [`shapewire_macros`] - `#[derive(Shape)]`
//!
//! Code generated by `#[derive(Shape)]` names `::shapewire_core`, so crates
//! using the derive also depend on `shapewire-core`.

// Re-export core types
pub use shapewire_core::{
    Blob, DefaultValue, DeserializeShape, Document, DocumentValue, DynamicShape, ErrorFault, NullPolicy, Schema,
    SchemaRef, SchemaRegistry, SerdeConfig, SerializeShape, SerializeStructure, Shape, ShapeDeserializer, ShapeError,
    ShapeId, ShapeResult, ShapeSchema, ShapeSerializer, ShapeType, TimestampFormat, TraitSet, TypeRegistry,
    UnionMember,
};
pub use shapewire_core::{members, prelude_schemas};

// Re-export the JSON protocol
pub use shapewire_json::{Codec, JsonCodec, JsonDocument, JsonShapeDeserializer, JsonShapeSerializer, envelope};

// Re-export the derive
pub use shapewire_macros::Shape;

// Re-export common dependencies that shape authors need
pub use serde_json;
pub use shapewire_core::{BigDecimal, BigInt, DateTime, IndexMap, Lazy, Utc};
pub use tracing;

/// Prelude module for convenient imports.
///
/// Use `use shapewire::prelude::*;` to import commonly used types.
///
/// This includes:
/// - Schemas: `Schema`, `SchemaRef`, `TraitSet`, `ShapeType`, `prelude_schemas`, `Lazy`
/// - Values: `Document`, `Blob`, the shape serde traits and `#[derive(Shape)]`
/// - Registries: `TypeRegistry`, `SchemaRegistry`
/// - JSON: `Codec`, `JsonCodec`, `JsonDocument`
pub mod prelude {
    pub use crate::{
        Blob, Codec, DefaultValue, DeserializeShape, Document, JsonCodec, JsonDocument, Lazy, Schema, SchemaRef,
        SchemaRegistry, SerializeShape, SerializeStructure, Shape, ShapeError, ShapeId, ShapeResult, ShapeSchema,
        ShapeType, TimestampFormat, TraitSet, TypeRegistry, prelude_schemas,
    };
}
