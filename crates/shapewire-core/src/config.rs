//! Serializer and deserializer configuration

use crate::error::{ShapeError, ShapeResult};
use crate::schema::Schema;
use crate::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};

/// What a deserializer does with `null` inside a non-sparse list or map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPolicy {
    /// Silently drop the element or entry
    #[default]
    Drop,
    /// Fail with [`ShapeError::NullNotAllowed`]
    Reject,
}

impl NullPolicy {
    /// Apply the policy to a null found in `collection`
    ///
    /// Returns `Ok(())` when the null should be skipped.
    pub fn on_null(&self, collection: &Schema) -> ShapeResult<()> {
        match self {
            NullPolicy::Drop => {
                tracing::trace!(shape = %collection.id(), "dropping null from non-sparse collection");
                Ok(())
            }
            NullPolicy::Reject => Err(ShapeError::NullNotAllowed(collection.id().clone())),
        }
    }
}

/// Configuration shared by protocol codecs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerdeConfig {
    /// Handling of nulls in non-sparse collections
    #[serde(default)]
    pub null_policy: NullPolicy,

    /// Maximum nesting of aggregates accepted on input
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Timestamp format for members without a `timestampFormat` trait
    #[serde(default)]
    pub default_timestamp_format: TimestampFormat,
}

fn default_max_depth() -> usize {
    64
}

impl Default for SerdeConfig {
    fn default() -> Self {
        Self {
            null_policy: NullPolicy::default(),
            max_depth: default_max_depth(),
            default_timestamp_format: TimestampFormat::default(),
        }
    }
}

impl SerdeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from JSON bytes; empty input yields the defaults
    pub fn from_json(bytes: &[u8]) -> ShapeResult<Self> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_slice(bytes).map_err(|e| ShapeError::InvalidSchema(format!("invalid serde config: {e}")))
    }

    /// Reject nulls in non-sparse collections instead of dropping them
    pub fn strict(mut self) -> Self {
        self.null_policy = NullPolicy::Reject;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_default_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.default_timestamp_format = format;
        self
    }

    /// Timestamp format for a schema, falling back to the configured default
    pub fn timestamp_format_for(&self, schema: &Schema) -> TimestampFormat {
        schema.timestamp_format().unwrap_or(self.default_timestamp_format)
    }

    /// Fail once `depth` exceeds the configured maximum
    pub fn check_depth(&self, depth: usize) -> ShapeResult<()> {
        if depth > self.max_depth {
            Err(ShapeError::NestingTooDeep(self.max_depth))
        } else {
            Ok(())
        }
    }
}
