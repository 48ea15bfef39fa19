//! Schema registry keyed by shape id
//!
//! Generated modules declare their schemas as statics and index them with
//! [`SchemaRegistry::from_schemas`]. Models only known at runtime are
//! declared through [`SchemaRegistry::builder`]: every shape is allocated as
//! a placeholder first, then members are resolved by shape id and each
//! placeholder is finalized. Members may target any declared shape,
//! including the shape itself, and any prelude shape.
//!
//! Schemas built this way live for the rest of the process.

use crate::error::{ShapeError, ShapeResult};
use crate::prelude_schemas;
use crate::schema::{MemberDef, Schema, SchemaRef, ShapeId};
use crate::shape_type::ShapeType;
use crate::traits::TraitSet;
use indexmap::IndexMap;

/// Immutable index of schemas by shape id
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    schemas: IndexMap<ShapeId, &'static Schema>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    /// Index already constructed schemas
    pub fn from_schemas(schemas: impl IntoIterator<Item = &'static Schema>) -> Self {
        Self {
            schemas: schemas
                .into_iter()
                .map(|schema| (schema.id().clone(), schema))
                .collect(),
        }
    }

    pub fn get(&self, id: &ShapeId) -> ShapeResult<&'static Schema> {
        self.schemas
            .get(id)
            .copied()
            .ok_or_else(|| ShapeError::UnknownType(id.clone()))
    }

    pub fn contains(&self, id: &ShapeId) -> bool {
        self.schemas.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Schemas in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &'static Schema> + '_ {
        self.schemas.values().copied()
    }
}

#[derive(Debug)]
struct PendingShape {
    shape_type: ShapeType,
    traits: TraitSet,
    members: Vec<PendingMember>,
}

#[derive(Debug)]
struct PendingMember {
    name: String,
    target: ShapeId,
    traits: TraitSet,
}

/// Two-phase builder for runtime-declared schemas
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    shapes: IndexMap<ShapeId, PendingShape>,
    problems: Vec<String>,
}

impl SchemaRegistryBuilder {
    /// Declare a shape; members are added with [`member`](Self::member)
    pub fn declare(mut self, id: impl Into<ShapeId>, shape_type: ShapeType, traits: TraitSet) -> Self {
        let id = id.into();
        if self.shapes.contains_key(&id) {
            self.problems.push(format!("shape {id} declared twice"));
            return self;
        }
        self.shapes.insert(
            id,
            PendingShape {
                shape_type,
                traits,
                members: Vec::new(),
            },
        );
        self
    }

    /// Add a member to a declared shape, targeting a shape by id
    pub fn member(
        mut self,
        container: impl Into<ShapeId>,
        name: impl Into<String>,
        target: impl Into<ShapeId>,
        traits: TraitSet,
    ) -> Self {
        let container = container.into();
        let member = PendingMember {
            name: name.into(),
            target: target.into(),
            traits,
        };
        match self.shapes.get_mut(&container) {
            Some(shape) => shape.members.push(member),
            None => self
                .problems
                .push(format!("member `{}` added to undeclared shape {container}", member.name)),
        }
        self
    }

    /// Resolve every member target and finalize every schema
    pub fn build(self) -> ShapeResult<SchemaRegistry> {
        if let Some(problem) = self.problems.into_iter().next() {
            return Err(ShapeError::InvalidSchema(problem));
        }

        let placeholders: IndexMap<ShapeId, &'static Schema> = self
            .shapes
            .iter()
            .map(|(id, shape)| {
                let schema: &'static Schema = Box::leak(Box::new(Schema::placeholder(
                    id.clone(),
                    shape.shape_type,
                    shape.traits.clone(),
                )));
                (id.clone(), schema)
            })
            .collect();

        for (id, shape) in self.shapes {
            let mut members = Vec::with_capacity(shape.members.len());
            for member in shape.members {
                let target = placeholders
                    .get(&member.target)
                    .copied()
                    .or_else(|| prelude_schemas::lookup(&member.target))
                    .ok_or_else(|| ShapeError::UnknownType(member.target.clone()))?;
                members.push(MemberDef::new(member.name, SchemaRef::Resolved(target), member.traits));
            }
            placeholders
                .get(&id)
                .ok_or_else(|| ShapeError::UnknownType(id.clone()))?
                .finalize(members)?;
        }

        tracing::debug!(count = placeholders.len(), "built schema registry");
        Ok(SchemaRegistry { schemas: placeholders })
    }
}
