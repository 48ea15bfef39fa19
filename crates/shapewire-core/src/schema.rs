//! Schema descriptors
//!
//! A [`Schema`] is the immutable runtime description of one shape: its
//! [`ShapeType`], identifier, traits and ordered members. Member schemas are
//! schemas too; they carry a name, a dense index and a reference to their
//! target, and report the target's shape type.
//!
//! # Recursive shapes
//!
//! Shape graphs may be cyclic (a tree node holding a list of tree nodes).
//! Two mechanisms break construction cycles:
//!
//! - [`SchemaRef::Deferred`] holds a function returning the target, so a
//!   statically declared schema may name itself before it exists.
//! - [`Schema::placeholder`] allocates a schema without members, which other
//!   schemas can reference immediately; [`Schema::finalize`] fills the members
//!   in once every target exists. This is what
//!   [`SchemaRegistry`](crate::SchemaRegistry) does for models declared at runtime.
//!
//! Members are written once and never change afterwards, so schemas are safe
//! to read from any number of threads.
//!
//! # Example
//!
//! ```
//! use once_cell::sync::Lazy;
//! use shapewire_core::{prelude_schemas, Schema, SchemaRef, TraitSet};
//!
//! static TREE: Lazy<Schema> = Lazy::new(|| {
//!     Schema::structure("example#Tree")
//!         .member("value", &prelude_schemas::INTEGER, TraitSet::new().required())
//!         .member("children", SchemaRef::deferred(|| &*TREE_LIST), TraitSet::new())
//!         .build()
//! });
//!
//! static TREE_LIST: Lazy<Schema> = Lazy::new(|| {
//!     Schema::list("example#TreeList")
//!         .member("member", SchemaRef::deferred(|| &*TREE), TraitSet::new())
//!         .build()
//! });
//!
//! let children = TREE.member("children").unwrap();
//! assert_eq!(children.list_member().unwrap().target().unwrap().id(), TREE.id());
//! ```

use crate::error::{ShapeError, ShapeResult};
use crate::shape_type::ShapeType;
use crate::timestamp::TimestampFormat;
use crate::traits::{DefaultValue, ErrorFault, TraitSet};
use once_cell::sync::{Lazy, OnceCell};
use std::borrow::Cow;
use std::collections::HashMap;
use std::str::FromStr;

/// Absolute shape identifier, `namespace#Name` or `namespace#Name$member`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(Cow<'static, str>);

impl ShapeId {
    /// Create an identifier without validating it
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    /// Create an identifier from a static string in const context
    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    /// Parse and validate an identifier
    pub fn parse(id: &str) -> ShapeResult<Self> {
        let invalid = || ShapeError::InvalidSchema(format!("invalid shape id `{id}`"));
        let (namespace, rest) = id.split_once('#').ok_or_else(invalid)?;
        let name = rest.split_once('$').map_or(rest, |(name, _)| name);
        if namespace.is_empty() || name.is_empty() || rest.contains('#') || rest.ends_with('$') {
            return Err(invalid());
        }
        Ok(Self(Cow::Owned(id.to_string())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part before `#`
    pub fn namespace(&self) -> &str {
        self.0.split_once('#').map_or("", |(ns, _)| ns)
    }

    /// The shape name, without namespace or member
    pub fn name(&self) -> &str {
        let rest = self.0.split_once('#').map_or(self.as_str(), |(_, rest)| rest);
        rest.split_once('$').map_or(rest, |(name, _)| name)
    }

    /// The member name after `$`, if any
    pub fn member(&self) -> Option<&str> {
        self.0.split_once('$').map(|(_, member)| member)
    }

    /// Identifier of a member of this shape
    pub fn with_member(&self, member: &str) -> ShapeId {
        let root = self.0.split_once('$').map_or(self.as_str(), |(root, _)| root);
        ShapeId(Cow::Owned(format!("{root}${member}")))
    }
}

impl std::fmt::Display for ShapeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for ShapeId {
    fn from(id: &'static str) -> Self {
        ShapeId::from_static(id)
    }
}

impl From<String> for ShapeId {
    fn from(id: String) -> Self {
        ShapeId(Cow::Owned(id))
    }
}

impl FromStr for ShapeId {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShapeId::parse(s)
    }
}

/// Reference from a member to its target schema
#[derive(Clone, Copy)]
pub enum SchemaRef {
    /// Target already exists
    Resolved(&'static Schema),
    /// Target is looked up on first use; breaks cycles between statics
    Deferred(fn() -> &'static Schema),
}

impl SchemaRef {
    pub fn deferred(target: fn() -> &'static Schema) -> Self {
        SchemaRef::Deferred(target)
    }

    /// Resolve the target
    pub fn get(&self) -> &'static Schema {
        match self {
            SchemaRef::Resolved(schema) => schema,
            SchemaRef::Deferred(target) => target(),
        }
    }
}

impl std::fmt::Debug for SchemaRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaRef::Resolved(schema) => write!(f, "Resolved({})", schema.id),
            SchemaRef::Deferred(_) => write!(f, "Deferred"),
        }
    }
}

impl From<&'static Schema> for SchemaRef {
    fn from(schema: &'static Schema) -> Self {
        SchemaRef::Resolved(schema)
    }
}

impl From<&'static Lazy<Schema>> for SchemaRef {
    fn from(schema: &'static Lazy<Schema>) -> Self {
        SchemaRef::Resolved(Lazy::force(schema))
    }
}

/// Declaration of one member, consumed by [`Schema::finalize`]
#[derive(Debug, Clone)]
pub struct MemberDef {
    pub name: Cow<'static, str>,
    pub target: SchemaRef,
    pub traits: TraitSet,
}

impl MemberDef {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        target: impl Into<SchemaRef>,
        traits: TraitSet,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            traits,
        }
    }
}

#[derive(Debug)]
enum SchemaKind {
    Shape(ShapeType),
    Member {
        name: Cow<'static, str>,
        index: usize,
        target: SchemaRef,
    },
}

#[derive(Debug, Default)]
struct MemberTable {
    members: Vec<Schema>,
    by_name: HashMap<String, usize>,
    by_json_name: HashMap<String, usize>,
}

impl MemberTable {
    fn new(container: &ShapeId, defs: Vec<MemberDef>) -> Self {
        let mut table = MemberTable::default();
        for (index, def) in defs.into_iter().enumerate() {
            let json_name = def.traits.json_name().unwrap_or(&def.name).to_string();
            table.by_name.insert(def.name.to_string(), index);
            table.by_json_name.insert(json_name, index);
            table.members.push(Schema {
                id: container.with_member(&def.name),
                kind: SchemaKind::Member {
                    name: def.name,
                    index,
                    target: def.target,
                },
                traits: def.traits,
                members: OnceCell::new(),
            });
        }
        table
    }
}

/// Immutable descriptor of a shape or member
pub struct Schema {
    id: ShapeId,
    kind: SchemaKind,
    traits: TraitSet,
    members: OnceCell<MemberTable>,
}

impl Schema {
    /// Start building a schema of any type
    pub fn builder(id: impl Into<ShapeId>, shape_type: ShapeType) -> SchemaBuilder {
        SchemaBuilder {
            id: id.into(),
            shape_type,
            traits: TraitSet::new(),
            members: Vec::new(),
        }
    }

    pub fn structure(id: impl Into<ShapeId>) -> SchemaBuilder {
        Self::builder(id, ShapeType::Structure)
    }

    pub fn union(id: impl Into<ShapeId>) -> SchemaBuilder {
        Self::builder(id, ShapeType::Union)
    }

    pub fn list(id: impl Into<ShapeId>) -> SchemaBuilder {
        Self::builder(id, ShapeType::List)
    }

    pub fn map(id: impl Into<ShapeId>) -> SchemaBuilder {
        Self::builder(id, ShapeType::Map)
    }

    pub fn string_enum(id: impl Into<ShapeId>) -> SchemaBuilder {
        Self::builder(id, ShapeType::Enum)
    }

    pub fn int_enum(id: impl Into<ShapeId>) -> SchemaBuilder {
        Self::builder(id, ShapeType::IntEnum)
    }

    /// A memberless schema (scalars, enums, documents)
    pub fn scalar(id: impl Into<ShapeId>, shape_type: ShapeType) -> Schema {
        Self::builder(id, shape_type).build()
    }

    /// First phase of two-phase construction: a schema whose members are filled in later
    pub fn placeholder(id: impl Into<ShapeId>, shape_type: ShapeType, traits: TraitSet) -> Schema {
        Schema {
            id: id.into(),
            kind: SchemaKind::Shape(shape_type),
            traits,
            members: OnceCell::new(),
        }
    }

    /// Second phase of two-phase construction
    ///
    /// Fails if the members were already set or violate the shape type's layout.
    pub fn finalize(&self, members: Vec<MemberDef>) -> ShapeResult<()> {
        if self.is_member() {
            return Err(ShapeError::InvalidSchema(format!(
                "member schema {} cannot declare members",
                self.id
            )));
        }
        validate_layout(&self.id, self.shape_type(), &members)?;
        self.members
            .set(MemberTable::new(&self.id, members))
            .map_err(|_| ShapeError::InvalidSchema(format!("schema {} is already finalized", self.id)))
    }

    pub fn is_finalized(&self) -> bool {
        self.members.get().is_some()
    }

    pub fn id(&self) -> &ShapeId {
        &self.id
    }

    /// Shape type; member schemas report their target's type
    pub fn shape_type(&self) -> ShapeType {
        match &self.kind {
            SchemaKind::Shape(shape_type) => *shape_type,
            SchemaKind::Member { target, .. } => target.get().shape_type(),
        }
    }

    /// Traits declared directly on this schema
    pub fn traits(&self) -> &TraitSet {
        &self.traits
    }

    pub fn is_member(&self) -> bool {
        matches!(self.kind, SchemaKind::Member { .. })
    }

    pub fn member_name(&self) -> Option<&str> {
        match &self.kind {
            SchemaKind::Member { name, .. } => Some(name),
            SchemaKind::Shape(_) => None,
        }
    }

    pub fn member_index(&self) -> Option<usize> {
        match &self.kind {
            SchemaKind::Member { index, .. } => Some(*index),
            SchemaKind::Shape(_) => None,
        }
    }

    /// Member index for dispatch; fails on non-member schemas
    pub fn expect_member_index(&self) -> ShapeResult<usize> {
        self.member_index()
            .ok_or_else(|| ShapeError::InvalidSchema(format!("{} is not a member schema", self.id)))
    }

    /// Target of a member schema
    pub fn target(&self) -> Option<&'static Schema> {
        match &self.kind {
            SchemaKind::Member { target, .. } => Some(target.get()),
            SchemaKind::Shape(_) => None,
        }
    }

    /// The shape this schema describes: the target for members, itself otherwise
    pub fn shape(&self) -> &Schema {
        match &self.kind {
            SchemaKind::Member { target, .. } => target.get(),
            SchemaKind::Shape(_) => self,
        }
    }

    /// Ordered members of the described shape
    pub fn members(&self) -> &[Schema] {
        self.shape()
            .members
            .get()
            .map_or(&[][..], |table| table.members.as_slice())
    }

    /// Index of the member with the given modeled name
    pub fn member_index_of(&self, name: &str) -> Option<usize> {
        self.shape().members.get()?.by_name.get(name).copied()
    }

    pub fn member(&self, name: &str) -> Option<&Schema> {
        let table = self.shape().members.get()?;
        table.by_name.get(name).map(|&i| &table.members[i])
    }

    /// Member looked up by its JSON wire key (`jsonName`, else the member name)
    pub fn member_by_json_name(&self, key: &str) -> Option<&Schema> {
        let table = self.shape().members.get()?;
        table.by_json_name.get(key).map(|&i| &table.members[i])
    }

    pub fn member_at(&self, index: usize) -> ShapeResult<&Schema> {
        let members = self.members();
        members.get(index).ok_or_else(|| {
            ShapeError::InvalidSchema(format!(
                "{} has no member at index {index} ({} members)",
                self.id,
                members.len()
            ))
        })
    }

    pub fn expect_member(&self, name: &str) -> ShapeResult<&Schema> {
        self.member(name)
            .ok_or_else(|| ShapeError::InvalidSchema(format!("{} has no member `{name}`", self.id)))
    }

    /// Element member of a list
    pub fn list_member(&self) -> ShapeResult<&Schema> {
        self.expect_kind(ShapeType::List)?;
        self.member_at(0)
    }

    /// Key member of a map
    pub fn map_key(&self) -> ShapeResult<&Schema> {
        self.expect_kind(ShapeType::Map)?;
        self.member_at(0)
    }

    /// Value member of a map
    pub fn map_value(&self) -> ShapeResult<&Schema> {
        self.expect_kind(ShapeType::Map)?;
        self.member_at(1)
    }

    /// JSON wire key of a member schema
    pub fn json_member_name(&self) -> Option<&str> {
        self.traits.json_name().or_else(|| self.member_name())
    }

    pub fn is_required(&self) -> bool {
        self.traits.is_required()
    }

    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.traits.default_value()
    }

    pub fn json_name(&self) -> Option<&str> {
        self.traits.json_name()
    }

    /// Sensitive on the member or on its target
    pub fn is_sensitive(&self) -> bool {
        self.traits.is_sensitive() || self.target().is_some_and(|t| t.traits.is_sensitive())
    }

    /// Sparse on the member or on its target
    pub fn is_sparse(&self) -> bool {
        self.traits.is_sparse() || self.target().is_some_and(|t| t.traits.is_sparse())
    }

    /// Timestamp format from the member, falling back to the target
    pub fn timestamp_format(&self) -> Option<TimestampFormat> {
        self.traits
            .timestamp_format()
            .or_else(|| self.target().and_then(|t| t.traits.timestamp_format()))
    }

    pub fn error_fault(&self) -> Option<ErrorFault> {
        self.traits
            .error_fault()
            .or_else(|| self.target().and_then(|t| t.traits.error_fault()))
    }

    fn expect_kind(&self, expected: ShapeType) -> ShapeResult<()> {
        let actual = self.shape_type();
        if actual == expected {
            Ok(())
        } else {
            Err(ShapeError::mismatch(expected, actual))
        }
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Schema");
        s.field("id", &self.id);
        match &self.kind {
            SchemaKind::Shape(shape_type) => {
                s.field("shape_type", shape_type);
            }
            SchemaKind::Member { index, target, .. } => {
                s.field("index", index).field("target", target);
            }
        }
        if !self.traits.is_empty() {
            s.field("traits", &self.traits);
        }
        if let Some(table) = self.members.get() {
            let names: Vec<&str> = table.members.iter().filter_map(|m| m.member_name()).collect();
            s.field("members", &names);
        }
        s.finish()
    }
}

/// Builder for schemas whose members are known up front
#[derive(Debug)]
pub struct SchemaBuilder {
    id: ShapeId,
    shape_type: ShapeType,
    traits: TraitSet,
    members: Vec<MemberDef>,
}

impl SchemaBuilder {
    pub fn traits(mut self, traits: TraitSet) -> Self {
        self.traits = traits;
        self
    }

    /// Append a member; its index is its position
    pub fn member(
        mut self,
        name: impl Into<Cow<'static, str>>,
        target: impl Into<SchemaRef>,
        traits: TraitSet,
    ) -> Self {
        self.members.push(MemberDef::new(name, target, traits));
        self
    }

    /// Build without validating the member layout
    pub fn build(self) -> Schema {
        let members = MemberTable::new(&self.id, self.members);
        Schema {
            id: self.id,
            kind: SchemaKind::Shape(self.shape_type),
            traits: self.traits,
            members: OnceCell::with_value(members),
        }
    }

    /// Build, checking the member layout against the shape type
    pub fn try_build(self) -> ShapeResult<Schema> {
        validate_layout(&self.id, self.shape_type, &self.members)?;
        Ok(self.build())
    }
}

fn validate_layout(id: &ShapeId, shape_type: ShapeType, members: &[MemberDef]) -> ShapeResult<()> {
    let names: Vec<&str> = members.iter().map(|m| m.name.as_ref()).collect();
    let invalid = |reason: &str| ShapeError::InvalidSchema(format!("{shape_type} {id} {reason}"));
    match shape_type {
        ShapeType::List if names != ["member"] => Err(invalid("must have exactly one member named `member`")),
        ShapeType::Map if names != ["key", "value"] => Err(invalid("must have members `key` and `value`")),
        ShapeType::Map => match members[0].target {
            // deferred keys are not resolved during construction
            SchemaRef::Resolved(key)
                if !matches!(key.shape_type(), ShapeType::String | ShapeType::Enum) =>
            {
                Err(invalid(&format!("key must target a string or enum, not {}", key.shape_type())))
            }
            _ => Ok(()),
        },
        ShapeType::Structure | ShapeType::Union => {
            let mut seen = std::collections::HashSet::new();
            match names.iter().find(|name| !seen.insert(**name)) {
                Some(dup) => Err(invalid(&format!("declares member `{dup}` twice"))),
                None => Ok(()),
            }
        }
        ShapeType::List => Ok(()),
        _ if !members.is_empty() => Err(invalid("cannot declare members")),
        _ => Ok(()),
    }
}
