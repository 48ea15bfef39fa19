//! Process-wide schemas for the prelude shapes
//!
//! Every simple shape type has one shared schema in the `smithy.api`
//! namespace. Documents built from literals use these, and lists and maps
//! built from literals use the generic sparse [`LIST`] and [`MAP`] schemas.

use crate::schema::{Schema, ShapeId};
use crate::shape_type::ShapeType;
use crate::traits::TraitSet;
use once_cell::sync::Lazy;

macro_rules! prelude_schema {
    ($($name:ident => $id:literal, $shape_type:ident;)*) => {
        $(
            pub static $name: Lazy<Schema> =
                Lazy::new(|| Schema::scalar($id, ShapeType::$shape_type));
        )*

        /// Look up a prelude schema by shape id
        pub fn lookup(id: &ShapeId) -> Option<&'static Schema> {
            match id.as_str() {
                $($id => Some(&*$name),)*
                "smithy.api#Unit" => Some(&*UNIT),
                _ => None,
            }
        }
    };
}

prelude_schema! {
    BOOLEAN => "smithy.api#Boolean", Boolean;
    BYTE => "smithy.api#Byte", Byte;
    SHORT => "smithy.api#Short", Short;
    INTEGER => "smithy.api#Integer", Integer;
    LONG => "smithy.api#Long", Long;
    BIG_INTEGER => "smithy.api#BigInteger", BigInteger;
    FLOAT => "smithy.api#Float", Float;
    DOUBLE => "smithy.api#Double", Double;
    BIG_DECIMAL => "smithy.api#BigDecimal", BigDecimal;
    STRING => "smithy.api#String", String;
    BLOB => "smithy.api#Blob", Blob;
    TIMESTAMP => "smithy.api#Timestamp", Timestamp;
    DOCUMENT => "smithy.api#Document", Document;
}

/// Empty structure used as the target of memberless union variants
pub static UNIT: Lazy<Schema> = Lazy::new(|| Schema::structure("smithy.api#Unit").build());

/// Generic list of documents
pub static LIST: Lazy<Schema> = Lazy::new(|| {
    Schema::list("shapewire.prelude#DocumentList")
        .traits(TraitSet::new().sparse())
        .member("member", &DOCUMENT, TraitSet::new())
        .build()
});

/// Generic string-keyed map of documents
pub static MAP: Lazy<Schema> = Lazy::new(|| {
    Schema::map("shapewire.prelude#DocumentMap")
        .traits(TraitSet::new().sparse())
        .member("key", &STRING, TraitSet::new())
        .member("value", &DOCUMENT, TraitSet::new())
        .build()
});

/// The prelude schema matching a shape type
///
/// Aggregates map to the generic containers, enums to their base type.
pub fn for_shape_type(shape_type: ShapeType) -> &'static Schema {
    match shape_type {
        ShapeType::Boolean => &*BOOLEAN,
        ShapeType::Byte => &*BYTE,
        ShapeType::Short => &*SHORT,
        ShapeType::Integer | ShapeType::IntEnum => &*INTEGER,
        ShapeType::Long => &*LONG,
        ShapeType::BigInteger => &*BIG_INTEGER,
        ShapeType::Float => &*FLOAT,
        ShapeType::Double => &*DOUBLE,
        ShapeType::BigDecimal => &*BIG_DECIMAL,
        ShapeType::String | ShapeType::Enum => &*STRING,
        ShapeType::Blob => &*BLOB,
        ShapeType::Timestamp => &*TIMESTAMP,
        ShapeType::Document => &*DOCUMENT,
        ShapeType::List => &*LIST,
        ShapeType::Map | ShapeType::Structure | ShapeType::Union => &*MAP,
    }
}
