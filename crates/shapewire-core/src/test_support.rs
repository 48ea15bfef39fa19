//! Hand-written shapes mirroring `#[derive(Shape)]` output, for unit tests

use crate::members::{optional, redacted_at, required_or_default, unknown_variant, write_optional};
use crate::prelude_schemas;
use crate::{
    DefaultValue, DeserializeShape, Lazy, Schema, SerializeShape, SerializeStructure, ShapeDeserializer, ShapeError,
    ShapeResult, ShapeSchema, ShapeSerializer, TraitSet, UnionMember,
};

pub static TAGS: Lazy<Schema> = Lazy::new(|| {
    Schema::list("example#Tags")
        .member("member", &prelude_schemas::STRING, TraitSet::new())
        .build()
});

pub static SPARSE_TAGS: Lazy<Schema> = Lazy::new(|| {
    Schema::list("example#SparseTags")
        .traits(TraitSet::new().sparse())
        .member("member", &prelude_schemas::STRING, TraitSet::new())
        .build()
});

pub static COUNTS: Lazy<Schema> = Lazy::new(|| {
    Schema::map("example#Counts")
        .member("key", &prelude_schemas::STRING, TraitSet::new())
        .member("value", &prelude_schemas::INTEGER, TraitSet::new())
        .build()
});

pub static WIDGET: Lazy<Schema> = Lazy::new(|| {
    Schema::structure("example#Widget")
        .member("name", &prelude_schemas::STRING, TraitSet::new().required())
        .member(
            "count",
            &prelude_schemas::INTEGER,
            TraitSet::new().with_default(DefaultValue::Integer(1)),
        )
        .member("tags", &TAGS, TraitSet::new())
        .member("secret", &prelude_schemas::STRING, TraitSet::new().sensitive())
        .build()
});

pub static CHOICE: Lazy<Schema> = Lazy::new(|| {
    Schema::union("example#Choice")
        .member("text", &prelude_schemas::STRING, TraitSet::new())
        .member("number", &prelude_schemas::INTEGER, TraitSet::new())
        .build()
});

#[derive(Clone, PartialEq)]
pub struct Widget {
    pub name: String,
    pub count: i32,
    pub tags: Option<Vec<String>>,
    pub secret: Option<String>,
}

impl Widget {
    pub fn sample() -> Self {
        Widget {
            name: "gear".to_string(),
            count: 3,
            tags: Some(vec!["a".to_string(), "b".to_string()]),
            secret: Some("hunter2".to_string()),
        }
    }
}

impl ShapeSchema for Widget {
    fn schema() -> &'static Schema {
        &WIDGET
    }
}

impl SerializeShape for Widget {
    fn serialize_shape(&self, schema: &'static Schema, serializer: &mut dyn ShapeSerializer) -> ShapeResult<()> {
        serializer.write_struct(schema, self)
    }
}

impl SerializeStructure for Widget {
    fn serialize_members(&self, serializer: &mut dyn ShapeSerializer) -> ShapeResult<()> {
        let schema = Self::schema();
        self.name.serialize_shape(schema.member_at(0)?, serializer)?;
        self.count.serialize_shape(schema.member_at(1)?, serializer)?;
        write_optional(self.tags.as_ref(), schema.member_at(2)?, serializer)?;
        write_optional(self.secret.as_ref(), schema.member_at(3)?, serializer)
    }
}

impl DeserializeShape for Widget {
    fn deserialize_shape(schema: &'static Schema, deserializer: &mut dyn ShapeDeserializer) -> ShapeResult<Self> {
        let mut name = None;
        let mut count = None;
        let mut tags = None;
        let mut secret = None;
        deserializer.read_struct(schema, &mut |member, de| {
            match member.expect_member_index()? {
                0 => name = Some(String::deserialize_shape(member, de)?),
                1 => count = Some(i32::deserialize_shape(member, de)?),
                2 => tags = Some(Vec::<String>::deserialize_shape(member, de)?),
                3 => secret = Some(String::deserialize_shape(member, de)?),
                _ => {}
            }
            Ok(())
        })?;
        Ok(Widget {
            name: required_or_default(name, schema.member_at(0)?, schema)?,
            count: required_or_default(count, schema.member_at(1)?, schema)?,
            tags: optional(tags, schema.member_at(2)?, schema)?,
            secret: optional(secret, schema.member_at(3)?, schema)?,
        })
    }
}

impl std::fmt::Debug for Widget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let schema = Self::schema();
        f.debug_struct("Widget")
            .field("name", &redacted_at(schema, 0, &self.name))
            .field("count", &redacted_at(schema, 1, &self.count))
            .field("tags", &redacted_at(schema, 2, &self.tags))
            .field("secret", &redacted_at(schema, 3, &self.secret))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Choice {
    Text(String),
    Number(i32),
    Unknown(String),
}

impl ShapeSchema for Choice {
    fn schema() -> &'static Schema {
        &CHOICE
    }
}

impl SerializeShape for Choice {
    fn serialize_shape(&self, schema: &'static Schema, serializer: &mut dyn ShapeSerializer) -> ShapeResult<()> {
        serializer.write_struct(schema, self)
    }
}

impl SerializeStructure for Choice {
    fn serialize_members(&self, serializer: &mut dyn ShapeSerializer) -> ShapeResult<()> {
        let schema = Self::schema();
        match self {
            Choice::Text(value) => value.serialize_shape(schema.member_at(0)?, serializer),
            Choice::Number(value) => value.serialize_shape(schema.member_at(1)?, serializer),
            Choice::Unknown(tag) => Err(unknown_variant(schema, tag)),
        }
    }
}

impl DeserializeShape for Choice {
    fn deserialize_shape(schema: &'static Schema, deserializer: &mut dyn ShapeDeserializer) -> ShapeResult<Self> {
        let mut value = None;
        let outcome = deserializer.read_union(schema, &mut |member, de| {
            value = Some(match member.expect_member_index()? {
                0 => Choice::Text(String::deserialize_shape(member, de)?),
                1 => Choice::Number(i32::deserialize_shape(member, de)?),
                index => return Err(ShapeError::InvalidSchema(format!("no union member at {index}"))),
            });
            Ok(())
        })?;
        match outcome {
            UnionMember::Unknown(tag) => Ok(Choice::Unknown(tag)),
            UnionMember::Known(_) => {
                value.ok_or_else(|| ShapeError::Deserialization("union member was not read".to_string()))
            }
        }
    }
}
