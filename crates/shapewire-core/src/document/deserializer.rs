//! Deserializer reading shape values out of documents

use crate::config::SerdeConfig;
use crate::document::{Document, DocumentValue};
use crate::error::{ShapeError, ShapeResult};
use crate::schema::Schema;
use crate::shape_serde::{ElementConsumer, EntryConsumer, MemberConsumer, ShapeDeserializer, UnionMember};
use crate::shape_type::ShapeType;
use crate::timestamp::{from_epoch_integer, from_epoch_seconds};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use once_cell::sync::Lazy;

static DEFAULT_CONFIG: Lazy<SerdeConfig> = Lazy::new(SerdeConfig::default);

/// Reads shape values from a [`Document`]
///
/// Structure and union documents are matched to members by member name.
pub struct DocumentDeserializer<'a> {
    doc: &'a Document,
    config: &'a SerdeConfig,
    depth: usize,
}

impl<'a> DocumentDeserializer<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self::with_config(doc, &DEFAULT_CONFIG)
    }

    pub fn with_config(doc: &'a Document, config: &'a SerdeConfig) -> Self {
        Self { doc, config, depth: 0 }
    }

    fn child(&self, doc: &'a Document) -> DocumentDeserializer<'a> {
        DocumentDeserializer {
            doc,
            config: self.config,
            depth: self.depth + 1,
        }
    }

    fn enter(&self) -> ShapeResult<()> {
        self.config.check_depth(self.depth + 1)
    }
}

impl ShapeDeserializer for DocumentDeserializer<'_> {
    fn read_struct(&mut self, schema: &'static Schema, consumer: &mut MemberConsumer<'_>) -> ShapeResult<()> {
        self.enter()?;
        for (key, value) in self.doc.as_map()? {
            let Some(member) = schema.member(key) else {
                tracing::trace!(shape = %schema.id(), member = %key, "ignoring unknown member");
                continue;
            };
            if value.is_null() {
                continue;
            }
            consumer(member, &mut self.child(value))?;
        }
        Ok(())
    }

    fn read_union(&mut self, schema: &'static Schema, consumer: &mut MemberConsumer<'_>) -> ShapeResult<UnionMember> {
        self.enter()?;
        let entries = self.doc.as_map()?;
        let mut present = entries.iter().filter(|(_, value)| !value.is_null());
        let (key, value) = match (present.next(), present.next()) {
            (Some(entry), None) => entry,
            _ => {
                return Err(ShapeError::UnionArity {
                    shape: schema.shape().id().clone(),
                    count: entries.values().filter(|value| !value.is_null()).count(),
                });
            }
        };
        match schema.member(key) {
            Some(member) => {
                consumer(member, &mut self.child(value))?;
                Ok(UnionMember::Known(member.expect_member_index()?))
            }
            None => {
                tracing::debug!(shape = %schema.id(), tag = %key, "unknown union member");
                Ok(UnionMember::Unknown(key.clone()))
            }
        }
    }

    fn read_list(&mut self, schema: &'static Schema, consumer: &mut ElementConsumer<'_>) -> ShapeResult<()> {
        self.enter()?;
        let sparse = schema.is_sparse();
        for item in self.doc.as_list()? {
            if item.is_null() && !sparse {
                self.config.null_policy.on_null(schema)?;
                continue;
            }
            consumer(&mut self.child(item))?;
        }
        Ok(())
    }

    fn read_map(&mut self, schema: &'static Schema, consumer: &mut EntryConsumer<'_>) -> ShapeResult<()> {
        self.enter()?;
        let sparse = schema.is_sparse();
        for (key, value) in self.doc.as_map()? {
            if value.is_null() && !sparse {
                self.config.null_policy.on_null(schema)?;
                continue;
            }
            consumer(key.clone(), &mut self.child(value))?;
        }
        Ok(())
    }

    fn read_boolean(&mut self, _schema: &'static Schema) -> ShapeResult<bool> {
        self.doc.as_boolean()
    }

    fn read_byte(&mut self, _schema: &'static Schema) -> ShapeResult<i8> {
        self.doc.as_byte()
    }

    fn read_short(&mut self, _schema: &'static Schema) -> ShapeResult<i16> {
        self.doc.as_short()
    }

    fn read_integer(&mut self, _schema: &'static Schema) -> ShapeResult<i32> {
        self.doc.as_integer()
    }

    fn read_long(&mut self, _schema: &'static Schema) -> ShapeResult<i64> {
        self.doc.as_long()
    }

    fn read_big_integer(&mut self, _schema: &'static Schema) -> ShapeResult<BigInt> {
        self.doc.as_big_integer()
    }

    fn read_float(&mut self, _schema: &'static Schema) -> ShapeResult<f32> {
        self.doc.as_float()
    }

    fn read_double(&mut self, _schema: &'static Schema) -> ShapeResult<f64> {
        self.doc.as_double()
    }

    fn read_big_decimal(&mut self, _schema: &'static Schema) -> ShapeResult<BigDecimal> {
        self.doc.as_big_decimal()
    }

    fn read_string(&mut self, _schema: &'static Schema) -> ShapeResult<String> {
        self.doc.as_string().map(str::to_string)
    }

    fn read_blob(&mut self, _schema: &'static Schema) -> ShapeResult<Vec<u8>> {
        self.doc.as_blob().map(<[u8]>::to_vec)
    }

    /// Timestamps, or epoch seconds as produced by `default` traits
    fn read_timestamp(&mut self, _schema: &'static Schema) -> ShapeResult<DateTime<Utc>> {
        match self.doc.value() {
            DocumentValue::Timestamp(value) => Ok(*value),
            DocumentValue::Byte(_) | DocumentValue::Short(_) | DocumentValue::Integer(_) | DocumentValue::Long(_) => {
                from_epoch_integer(self.doc.as_long()?)
            }
            DocumentValue::Float(_) | DocumentValue::Double(_) | DocumentValue::BigDecimal(_) => {
                from_epoch_seconds(self.doc.as_double()?)
            }
            _ => Err(ShapeError::mismatch(ShapeType::Timestamp, self.doc.shape_type())),
        }
    }

    fn read_document(&mut self, _schema: &'static Schema) -> ShapeResult<Document> {
        Ok(self.doc.clone())
    }

    fn read_unknown_member(&mut self, schema: &'static Schema, tag: &str) -> ShapeResult<Document> {
        self.doc.as_map()?.get(tag).cloned().ok_or_else(|| ShapeError::UnknownVariant {
            shape: schema.shape().id().clone(),
            tag: tag.to_string(),
        })
    }

    fn is_null(&self) -> bool {
        self.doc.is_null()
    }

    fn read_null(&mut self, _schema: &'static Schema) -> ShapeResult<()> {
        if self.doc.is_null() {
            Ok(())
        } else {
            Err(ShapeError::mismatch("null", self.doc.shape_type()))
        }
    }

    fn container_size(&self) -> Option<usize> {
        self.doc.len().ok()
    }
}
