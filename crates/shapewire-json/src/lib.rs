//! shapewire-json - JSON protocol for shapewire shapes
//!
//! This crate provides:
//! - [`JsonShapeSerializer`] / [`JsonShapeDeserializer`] implementing the
//!   shape serde contracts over `serde_json::Value`
//! - [`JsonDocument`], a document that remembers its JSON form
//! - [`envelope`] helpers for `__type` discriminators
//! - [`Codec`] trait and the [`JsonCodec`] implementation
//!
//! Wire conventions: blobs are base64, timestamps follow the member's
//! `timestampFormat` (epoch seconds by default), non-finite floats are the
//! strings `NaN`, `Infinity` and `-Infinity`, and big numbers keep every digit.

mod codec;
mod deserializer;
mod document;
pub mod envelope;
mod serializer;
mod wire;

#[cfg(test)]
mod test_schemas;

pub use codec::{Codec, JsonCodec};
pub use deserializer::JsonShapeDeserializer;
pub use document::JsonDocument;
pub use serializer::JsonShapeSerializer;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{Codec, JsonCodec, JsonDocument, JsonShapeDeserializer, JsonShapeSerializer};
}
