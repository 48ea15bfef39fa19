//! Late-bound dispatch from shape ids to concrete types
//!
//! A [`TypeRegistry`] maps shape ids to constructors of registered shape
//! types. Registries nest: a lookup that misses locally continues in the
//! parent, so a service-level registry can extend an application-wide one
//! without copying it. Registries are read-only once built.
//!
//! ```
//! use std::sync::Arc;
//! use shapewire_core::{ShapeError, ShapeId, TypeRegistry};
//!
//! let root = Arc::new(TypeRegistry::builder().build());
//! let child = TypeRegistry::builder().parent(root).build();
//!
//! let id = ShapeId::new("example#Missing");
//! assert_eq!(child.get(&id).unwrap_err(), ShapeError::UnknownType(id));
//! ```

use crate::document::{Document, DocumentDeserializer};
use crate::error::{ShapeError, ShapeResult};
use crate::schema::{Schema, ShapeId};
use crate::shape_serde::{Shape, ShapeDeserializer, ShapeSerializer};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Object-safe view of any registered shape value
pub trait DynamicShape: Any + Send + Sync + fmt::Debug {
    /// Schema of the concrete type
    fn shape_schema(&self) -> &'static Schema;

    /// Serialize under the concrete type's schema
    fn serialize_dyn(&self, serializer: &mut dyn ShapeSerializer) -> ShapeResult<()>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Shape + Any + Send + Sync + fmt::Debug> DynamicShape for T {
    fn shape_schema(&self) -> &'static Schema {
        T::schema()
    }

    fn serialize_dyn(&self, serializer: &mut dyn ShapeSerializer) -> ShapeResult<()> {
        self.serialize_shape(T::schema(), serializer)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

type Constructor = fn(&'static Schema, &mut dyn ShapeDeserializer) -> ShapeResult<Box<dyn DynamicShape>>;

fn construct<T: Shape + DynamicShape>(
    schema: &'static Schema,
    deserializer: &mut dyn ShapeDeserializer,
) -> ShapeResult<Box<dyn DynamicShape>> {
    Ok(Box::new(T::deserialize_shape(schema, deserializer)?))
}

/// One registered type
#[derive(Clone, Copy)]
pub struct TypeEntry {
    schema: &'static Schema,
    type_name: &'static str,
    constructor: Constructor,
}

impl TypeEntry {
    pub fn of<T: Shape + DynamicShape>() -> Self {
        Self {
            schema: T::schema(),
            type_name: std::any::type_name::<T>(),
            constructor: construct::<T>,
        }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Rust type name of the registered type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Construct a value of the registered type
    pub fn deserialize(&self, deserializer: &mut dyn ShapeDeserializer) -> ShapeResult<Box<dyn DynamicShape>> {
        (self.constructor)(self.schema, deserializer)
    }
}

impl fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeEntry")
            .field("schema", self.schema.id())
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Nestable lookup from shape id to a deserializable type
#[derive(Debug, Default)]
pub struct TypeRegistry {
    entries: HashMap<ShapeId, TypeEntry>,
    parent: Option<Arc<TypeRegistry>>,
}

impl TypeRegistry {
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::default()
    }

    /// Find the entry for `id` here or in the parent chain
    pub fn get(&self, id: &ShapeId) -> ShapeResult<&TypeEntry> {
        let mut registry = Some(self);
        let mut level = 0usize;
        while let Some(current) = registry {
            if let Some(entry) = current.entries.get(id) {
                tracing::debug!(shape = %id, level, type_name = entry.type_name, "resolved type");
                return Ok(entry);
            }
            registry = current.parent.as_deref();
            level += 1;
        }
        Err(ShapeError::UnknownType(id.clone()))
    }

    pub fn contains(&self, id: &ShapeId) -> bool {
        self.get(id).is_ok()
    }

    /// Number of local entries, excluding parents
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn parent(&self) -> Option<&Arc<TypeRegistry>> {
        self.parent.as_ref()
    }

    /// Construct the type named by the document's discriminator
    pub fn deserialize(&self, doc: &Document) -> ShapeResult<Box<dyn DynamicShape>> {
        self.deserialize_with(doc.discriminator(), &mut DocumentDeserializer::new(doc))
    }

    /// Construct the type registered for `id` from any deserializer
    pub fn deserialize_with(
        &self,
        id: &ShapeId,
        deserializer: &mut dyn ShapeDeserializer,
    ) -> ShapeResult<Box<dyn DynamicShape>> {
        self.get(id)?.deserialize(deserializer)
    }

    /// Construct and downcast to `T`
    ///
    /// Fails with `TypeMismatch` when the discriminator resolves to another type.
    pub fn deserialize_as<T: Any>(&self, doc: &Document) -> ShapeResult<T> {
        let value = self.deserialize(doc)?;
        let actual = value.shape_schema().id().to_string();
        value
            .into_any()
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| ShapeError::mismatch(std::any::type_name::<T>(), actual))
    }
}

/// Builder for [`TypeRegistry`]
#[derive(Debug, Default)]
pub struct TypeRegistryBuilder {
    entries: HashMap<ShapeId, TypeEntry>,
    parent: Option<Arc<TypeRegistry>>,
}

impl TypeRegistryBuilder {
    /// Register `T` under its schema's shape id
    pub fn register<T: Shape + DynamicShape>(self) -> Self {
        self.register_entry(TypeEntry::of::<T>())
    }

    pub fn register_entry(mut self, entry: TypeEntry) -> Self {
        self.entries.insert(entry.schema.id().clone(), entry);
        self
    }

    pub fn parent(mut self, parent: Arc<TypeRegistry>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn build(self) -> TypeRegistry {
        TypeRegistry {
            entries: self.entries,
            parent: self.parent,
        }
    }
}
