//! The closed set of shape kinds in the type system

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of a shape
///
/// Every [`Schema`](crate::Schema) has exactly one `ShapeType`. Member
/// schemas report the type of their target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeType {
    Structure,
    Union,
    List,
    Map,
    String,
    Blob,
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    BigInteger,
    Float,
    Double,
    BigDecimal,
    Timestamp,
    Document,
    Enum,
    IntEnum,
}

impl ShapeType {
    /// All shape types, in declaration order
    pub const ALL: [ShapeType; 19] = [
        ShapeType::Structure,
        ShapeType::Union,
        ShapeType::List,
        ShapeType::Map,
        ShapeType::String,
        ShapeType::Blob,
        ShapeType::Boolean,
        ShapeType::Byte,
        ShapeType::Short,
        ShapeType::Integer,
        ShapeType::Long,
        ShapeType::BigInteger,
        ShapeType::Float,
        ShapeType::Double,
        ShapeType::BigDecimal,
        ShapeType::Timestamp,
        ShapeType::Document,
        ShapeType::Enum,
        ShapeType::IntEnum,
    ];

    /// Structures and unions: shapes with named members
    pub fn is_structure_like(&self) -> bool {
        matches!(self, ShapeType::Structure | ShapeType::Union)
    }

    /// Shapes whose values hold other values
    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            ShapeType::Structure | ShapeType::Union | ShapeType::List | ShapeType::Map
        )
    }

    /// Byte, short, integer, long, bigInteger and intEnum
    pub fn is_integer_family(&self) -> bool {
        matches!(
            self,
            ShapeType::Byte
                | ShapeType::Short
                | ShapeType::Integer
                | ShapeType::Long
                | ShapeType::BigInteger
                | ShapeType::IntEnum
        )
    }

    /// Float, double and bigDecimal
    pub fn is_float_family(&self) -> bool {
        matches!(
            self,
            ShapeType::Float | ShapeType::Double | ShapeType::BigDecimal
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer_family() || self.is_float_family()
    }

    /// Whether a schema of this type declares members
    pub fn has_members(&self) -> bool {
        self.is_aggregate()
    }

    /// The model keyword for this type
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeType::Structure => "structure",
            ShapeType::Union => "union",
            ShapeType::List => "list",
            ShapeType::Map => "map",
            ShapeType::String => "string",
            ShapeType::Blob => "blob",
            ShapeType::Boolean => "boolean",
            ShapeType::Byte => "byte",
            ShapeType::Short => "short",
            ShapeType::Integer => "integer",
            ShapeType::Long => "long",
            ShapeType::BigInteger => "bigInteger",
            ShapeType::Float => "float",
            ShapeType::Double => "double",
            ShapeType::BigDecimal => "bigDecimal",
            ShapeType::Timestamp => "timestamp",
            ShapeType::Document => "document",
            ShapeType::Enum => "enum",
            ShapeType::IntEnum => "intEnum",
        }
    }
}

impl std::fmt::Display for ShapeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeType {
    type Err = crate::ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShapeType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| crate::ShapeError::InvalidSchema(format!("unknown shape type `{s}`")))
    }
}
