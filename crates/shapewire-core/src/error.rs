//! Error types for shape serialization and deserialization

use crate::schema::ShapeId;
use crate::shape_type::ShapeType;
use thiserror::Error;

/// Result type alias for shape operations
pub type ShapeResult<T> = Result<T, ShapeError>;

/// Error type for schema, document and serde operations
///
/// All errors are raised at the point of detection and propagate to the
/// caller unchanged; the serde layer never retries or recovers locally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// A value's shape type disagrees with the request and no coercion applies
    #[error("type mismatch: expected {expected}, found {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// A required structure member was absent from the input
    #[error("missing required member `{member}` of {shape}")]
    MissingRequiredMember { member: String, shape: ShapeId },

    /// A union had zero or more than one member set
    #[error("union {shape} must have exactly one member set, found {count}")]
    UnionArity { shape: ShapeId, count: usize },

    /// No type is registered for a shape identifier
    #[error("unknown type: {0}")]
    UnknownType(ShapeId),

    /// Catch-all for failures while producing output
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Catch-all for malformed input detected while walking it
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// A container operation was applied to a scalar document
    #[error("{0} document is not a container")]
    NotAContainer(ShapeType),

    /// Attempted to remove the member of a union document
    #[error("cannot remove the member of union {0}")]
    InvalidUnionMutation(ShapeId),

    /// Attempted to serialize the unknown variant of a union
    #[error("cannot serialize unknown variant `{tag}` of union {shape}")]
    UnknownVariant { shape: ShapeId, tag: String },

    /// A schema was declared or finalized inconsistently
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// A numeric value does not fit the requested type
    #[error("value {value} is out of range for {target}")]
    OutOfRange { value: String, target: ShapeType },

    /// An element index was past the end of a list document
    #[error("index {index} is out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A null was found in a non-sparse collection under the reject policy
    #[error("null value not allowed in non-sparse collection {0}")]
    NullNotAllowed(ShapeId),

    /// Input nesting exceeded the configured limit
    #[error("maximum nesting depth of {0} exceeded")]
    NestingTooDeep(usize),
}

impl ShapeError {
    /// Returns a stable numeric code for this error kind
    pub fn error_code(&self) -> u32 {
        match self {
            ShapeError::TypeMismatch { .. } => 1,
            ShapeError::MissingRequiredMember { .. } => 2,
            ShapeError::UnionArity { .. } => 3,
            ShapeError::UnknownType(_) => 4,
            ShapeError::Serialization(_) => 5,
            ShapeError::Deserialization(_) => 6,
            ShapeError::NotAContainer(_) => 7,
            ShapeError::InvalidUnionMutation(_) => 8,
            ShapeError::UnknownVariant { .. } => 9,
            ShapeError::InvalidSchema(_) => 10,
            ShapeError::OutOfRange { .. } => 11,
            ShapeError::IndexOutOfBounds { .. } => 12,
            ShapeError::NullNotAllowed(_) => 13,
            ShapeError::NestingTooDeep(_) => 14,
        }
    }

    /// Create a type mismatch error from anything displayable
    pub fn mismatch(expected: impl ToString, actual: impl ToString) -> Self {
        ShapeError::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Whether the error was caused by the input rather than by the caller's value
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ShapeError::TypeMismatch { .. }
                | ShapeError::MissingRequiredMember { .. }
                | ShapeError::UnionArity { .. }
                | ShapeError::Deserialization(_)
                | ShapeError::OutOfRange { .. }
                | ShapeError::NullNotAllowed(_)
                | ShapeError::NestingTooDeep(_)
        )
    }
}

impl From<serde_json::Error> for ShapeError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            ShapeError::Deserialization(err.to_string())
        } else {
            ShapeError::Serialization(err.to_string())
        }
    }
}
