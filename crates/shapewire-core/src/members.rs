//! Member rules used by generated shape code
//!
//! Each rule depends only on the member schema's traits, so generated
//! `serialize_members`/`deserialize_shape` bodies stay declarative:
//!
//! | field kind        | absent on write | absent on read                              |
//! |-------------------|-----------------|---------------------------------------------|
//! | `Option<T>`       | skipped         | `None`, unless the member is `required`     |
//! | `T` with default  | always written  | fresh value built from the `default` trait  |
//! | `T` without one   | always written  | [`ShapeError::MissingRequiredMember`]       |

use crate::document::DocumentDeserializer;
use crate::error::{ShapeError, ShapeResult};
use crate::schema::Schema;
use crate::shape_serde::{DeserializeShape, SerializeShape, ShapeSerializer};
use crate::traits::DefaultValue;

/// Replacement text for sensitive values in `Debug` output
pub const REDACTED: &str = "*** Sensitive Data Redacted ***";

/// Write a nullable member; `None` is not written at all
pub fn write_optional<T: SerializeShape + ?Sized>(
    value: Option<&T>,
    member: &'static Schema,
    serializer: &mut dyn ShapeSerializer,
) -> ShapeResult<()> {
    match value {
        Some(value) => value.serialize_shape(member, serializer),
        None => Ok(()),
    }
}

/// Fill an absent member from its `default` trait
///
/// A `null` default counts as no default.
pub fn resolve_default<T: DeserializeShape>(value: Option<T>, member: &'static Schema) -> ShapeResult<Option<T>> {
    if value.is_some() {
        return Ok(value);
    }
    match member.default_value() {
        None | Some(DefaultValue::Null) => Ok(None),
        Some(default) => {
            let doc = default.to_document();
            T::deserialize_shape(member, &mut DocumentDeserializer::new(&doc)).map(Some)
        }
    }
}

/// Value of a non-nullable member: the value read, else its default
///
/// Fails with [`ShapeError::MissingRequiredMember`] when the member was
/// absent and has no default.
pub fn required_or_default<T: DeserializeShape>(
    value: Option<T>,
    member: &'static Schema,
    container: &Schema,
) -> ShapeResult<T> {
    resolve_default(value, member)?.ok_or_else(|| missing_member(member, container))
}

/// Value of a nullable member
///
/// An absent `required` member takes its default, else fails with
/// [`ShapeError::MissingRequiredMember`]. Other absent members stay `None`.
pub fn optional<T: DeserializeShape>(
    value: Option<T>,
    member: &'static Schema,
    container: &Schema,
) -> ShapeResult<Option<T>> {
    if value.is_some() || !member.is_required() {
        return Ok(value);
    }
    required_or_default(value, member, container).map(Some)
}

/// Check that every `required` member without a default is present
pub fn check_required(container: &Schema, is_present: impl Fn(&str) -> bool) -> ShapeResult<()> {
    let missing = container.members().iter().find(|member| {
        member.is_required()
            && matches!(member.default_value(), None | Some(DefaultValue::Null))
            && member.member_name().is_some_and(|name| !is_present(name))
    });
    match missing {
        Some(member) => Err(missing_member(member, container)),
        None => Ok(()),
    }
}

fn missing_member(member: &Schema, container: &Schema) -> ShapeError {
    ShapeError::MissingRequiredMember {
        member: member.member_name().unwrap_or_default().to_string(),
        shape: container.shape().id().clone(),
    }
}

/// Error for serializing the unknown variant of a union
pub fn unknown_variant(union: &Schema, tag: &str) -> ShapeError {
    ShapeError::UnknownVariant {
        shape: union.shape().id().clone(),
        tag: tag.to_string(),
    }
}

/// `Debug` view of a member value that honors the `sensitive` trait
pub struct Redacted<'a, T: ?Sized> {
    sensitive: bool,
    value: &'a T,
}

pub fn redacted<'a, T: std::fmt::Debug + ?Sized>(member: &Schema, value: &'a T) -> Redacted<'a, T> {
    Redacted {
        sensitive: member.is_sensitive(),
        value,
    }
}

/// Like [`redacted`], looking the member up by index; an undeclared member
/// is shown as is
pub fn redacted_at<'a, T: std::fmt::Debug + ?Sized>(
    container: &Schema,
    index: usize,
    value: &'a T,
) -> Redacted<'a, T> {
    Redacted {
        sensitive: container.members().get(index).is_some_and(Schema::is_sensitive),
        value,
    }
}

impl<T: std::fmt::Debug + ?Sized> std::fmt::Debug for Redacted<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.sensitive {
            f.write_str(REDACTED)
        } else {
            self.value.fmt(f)
        }
    }
}

#[cfg(test)]
#[path = "members/members_tests.rs"]
mod members_tests;
