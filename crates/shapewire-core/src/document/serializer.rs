//! Serializer producing documents from shape values

use crate::document::{Document, DocumentValue};
use crate::error::{ShapeError, ShapeResult};
use crate::schema::Schema;
use crate::shape_serde::{ListWriter, MapSerializer, MapWriter, SerializeStructure, ShapeSerializer, ValueWriter};
use crate::shape_type::ShapeType;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use num_bigint::BigInt;

enum Frame {
    Members(IndexMap<String, Document>),
    Elements(Vec<Document>),
    Entries {
        entries: IndexMap<String, Document>,
        key: Option<String>,
    },
}

/// Builds a [`Document`] tree from serializer calls
///
/// Structures and unions become map values keyed by member name, each
/// member keeping its member schema.
#[derive(Default)]
pub struct DocumentSerializer {
    stack: Vec<Frame>,
    result: Option<Document>,
}

impl DocumentSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The document written, failing if nothing was written
    pub fn finish(self) -> ShapeResult<Document> {
        self.result
            .ok_or_else(|| ShapeError::Serialization("no value was written".to_string()))
    }

    fn emit(&mut self, schema: &Schema, doc: Document) -> ShapeResult<()> {
        match self.stack.last_mut() {
            None => {
                self.result = Some(doc);
                Ok(())
            }
            Some(Frame::Members(members)) => {
                let name = schema.member_name().ok_or_else(|| {
                    ShapeError::Serialization(format!("{} written inside a structure is not a member", schema.id()))
                })?;
                members.insert(name.to_string(), doc);
                Ok(())
            }
            Some(Frame::Elements(items)) => {
                items.push(doc);
                Ok(())
            }
            Some(Frame::Entries { entries, key }) => {
                let key = key
                    .take()
                    .ok_or_else(|| ShapeError::Serialization("map value written without a key".to_string()))?;
                entries.insert(key, doc);
                Ok(())
            }
        }
    }

    fn scalar(&mut self, schema: &'static Schema, value: DocumentValue) -> ShapeResult<()> {
        self.emit(schema, Document::new(value, schema))
    }

    fn pop(&mut self) -> ShapeResult<Frame> {
        self.stack
            .pop()
            .ok_or_else(|| ShapeError::Serialization("unbalanced document frames".to_string()))
    }
}

impl ShapeSerializer for DocumentSerializer {
    fn write_struct(&mut self, schema: &'static Schema, value: &dyn SerializeStructure) -> ShapeResult<()> {
        self.stack.push(Frame::Members(IndexMap::new()));
        value.serialize_members(self)?;
        let Frame::Members(members) = self.pop()? else {
            return Err(ShapeError::Serialization("unbalanced document frames".to_string()));
        };
        if schema.shape_type() == ShapeType::Union && members.len() != 1 {
            return Err(ShapeError::UnionArity {
                shape: schema.shape().id().clone(),
                count: members.len(),
            });
        }
        self.scalar(schema, DocumentValue::Map(members))
    }

    fn write_list(&mut self, schema: &'static Schema, len: usize, elements: &mut ListWriter<'_>) -> ShapeResult<()> {
        self.stack.push(Frame::Elements(Vec::with_capacity(len)));
        elements(self)?;
        let Frame::Elements(items) = self.pop()? else {
            return Err(ShapeError::Serialization("unbalanced document frames".to_string()));
        };
        self.scalar(schema, DocumentValue::List(items))
    }

    fn write_map(&mut self, schema: &'static Schema, len: usize, entries: &mut MapWriter<'_>) -> ShapeResult<()> {
        self.stack.push(Frame::Entries {
            entries: IndexMap::with_capacity(len),
            key: None,
        });
        entries(self)?;
        let Frame::Entries { entries, .. } = self.pop()? else {
            return Err(ShapeError::Serialization("unbalanced document frames".to_string()));
        };
        self.scalar(schema, DocumentValue::Map(entries))
    }

    fn write_boolean(&mut self, schema: &'static Schema, value: bool) -> ShapeResult<()> {
        self.scalar(schema, DocumentValue::Boolean(value))
    }

    fn write_byte(&mut self, schema: &'static Schema, value: i8) -> ShapeResult<()> {
        self.scalar(schema, DocumentValue::Byte(value))
    }

    fn write_short(&mut self, schema: &'static Schema, value: i16) -> ShapeResult<()> {
        self.scalar(schema, DocumentValue::Short(value))
    }

    fn write_integer(&mut self, schema: &'static Schema, value: i32) -> ShapeResult<()> {
        self.scalar(schema, DocumentValue::Integer(value))
    }

    fn write_long(&mut self, schema: &'static Schema, value: i64) -> ShapeResult<()> {
        self.scalar(schema, DocumentValue::Long(value))
    }

    fn write_big_integer(&mut self, schema: &'static Schema, value: &BigInt) -> ShapeResult<()> {
        self.scalar(schema, DocumentValue::BigInteger(value.clone()))
    }

    fn write_float(&mut self, schema: &'static Schema, value: f32) -> ShapeResult<()> {
        self.scalar(schema, DocumentValue::Float(value))
    }

    fn write_double(&mut self, schema: &'static Schema, value: f64) -> ShapeResult<()> {
        self.scalar(schema, DocumentValue::Double(value))
    }

    fn write_big_decimal(&mut self, schema: &'static Schema, value: &BigDecimal) -> ShapeResult<()> {
        self.scalar(schema, DocumentValue::BigDecimal(value.clone()))
    }

    fn write_string(&mut self, schema: &'static Schema, value: &str) -> ShapeResult<()> {
        self.scalar(schema, DocumentValue::String(value.to_string()))
    }

    fn write_blob(&mut self, schema: &'static Schema, value: &[u8]) -> ShapeResult<()> {
        self.scalar(schema, DocumentValue::Blob(value.to_vec()))
    }

    fn write_timestamp(&mut self, schema: &'static Schema, value: &DateTime<Utc>) -> ShapeResult<()> {
        self.scalar(schema, DocumentValue::Timestamp(*value))
    }

    fn write_document(&mut self, schema: &'static Schema, value: &Document) -> ShapeResult<()> {
        self.emit(schema, value.clone())
    }

    fn write_null(&mut self, schema: &'static Schema) -> ShapeResult<()> {
        self.scalar(schema, DocumentValue::Null)
    }
}

impl MapSerializer for DocumentSerializer {
    fn write_entry(&mut self, key: &str, value: &mut ValueWriter<'_>) -> ShapeResult<()> {
        match self.stack.last_mut() {
            Some(Frame::Entries { key: pending, .. }) => *pending = Some(key.to_string()),
            _ => return Err(ShapeError::Serialization("map entry written outside a map".to_string())),
        }
        value(self)
    }
}
