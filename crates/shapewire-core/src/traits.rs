//! Schema trait vocabulary
//!
//! Traits are the annotations attached to shapes and members that change how
//! values are validated, named on the wire, or displayed:
//!
//! - `required`: the member must be present on input
//! - `default(value)`: value used when the member is absent
//! - `sensitive`: redacted in `Debug` output, still serialized on the wire
//! - `sparse`: collection keeps `null` elements
//! - `timestampFormat`: wire representation of timestamps
//! - `jsonName`: wire key override for JSON protocols
//! - `error`: marks a structure as a client or server error

use crate::document::Document;
use crate::timestamp::TimestampFormat;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Which side is at fault for a modeled error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorFault {
    Client,
    Server,
}

impl std::fmt::Display for ErrorFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorFault::Client => write!(f, "client"),
            ErrorFault::Server => write!(f, "server"),
        }
    }
}

/// Value of a `default` trait
///
/// Container defaults are always empty; they are materialized fresh on each
/// use rather than shared.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(Cow<'static, str>),
    Blob(Cow<'static, [u8]>),
    EmptyList,
    EmptyMap,
}

impl DefaultValue {
    /// Build a fresh document holding this default
    pub fn to_document(&self) -> Document {
        match self {
            DefaultValue::Null => Document::null(),
            DefaultValue::Boolean(v) => Document::from(*v),
            DefaultValue::Integer(v) => Document::from(*v),
            DefaultValue::Float(v) => Document::from(*v),
            DefaultValue::String(v) => Document::from(&**v),
            DefaultValue::Blob(v) => Document::blob(v.to_vec()),
            DefaultValue::EmptyList => Document::from(Vec::<Document>::new()),
            DefaultValue::EmptyMap => Document::from(IndexMap::<String, Document>::new()),
        }
    }
}

/// Set of traits applied to a shape or member
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraitSet {
    required: bool,
    default: Option<DefaultValue>,
    sensitive: bool,
    sparse: bool,
    timestamp_format: Option<TimestampFormat>,
    json_name: Option<Cow<'static, str>>,
    error: Option<ErrorFault>,
}

impl TraitSet {
    /// Create an empty trait set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn sparse(mut self) -> Self {
        self.sparse = true;
        self
    }

    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = Some(format);
        self
    }

    pub fn with_json_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.json_name = Some(name.into());
        self
    }

    pub fn with_error(mut self, fault: ErrorFault) -> Self {
        self.error = Some(fault);
        self
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    pub fn is_sparse(&self) -> bool {
        self.sparse
    }

    pub fn timestamp_format(&self) -> Option<TimestampFormat> {
        self.timestamp_format
    }

    pub fn json_name(&self) -> Option<&str> {
        self.json_name.as_deref()
    }

    pub fn error_fault(&self) -> Option<ErrorFault> {
        self.error
    }

    /// True when no trait is set
    pub fn is_empty(&self) -> bool {
        *self == TraitSet::default()
    }
}
