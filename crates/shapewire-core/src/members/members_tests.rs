#![allow(non_snake_case)]

use super::*;
use crate::test_support::{CHOICE, TAGS, WIDGET};
use crate::{Document, DocumentSerializer, Lazy, TraitSet, prelude_schemas};

static DEFAULTS: Lazy<Schema> = Lazy::new(|| {
    Schema::structure("example#Defaults")
        .member(
            "tags",
            &TAGS,
            TraitSet::new().with_default(DefaultValue::EmptyList),
        )
        .member("label", &prelude_schemas::STRING, TraitSet::new().with_default(DefaultValue::Null))
        .member(
            "ratio",
            &prelude_schemas::DOUBLE,
            TraitSet::new().with_default(DefaultValue::Float(0.5)),
        )
        .build()
});

fn member(schema: &'static Schema, name: &str) -> &'static Schema {
    schema.member(name).unwrap()
}

#[test]
fn write_optional___none___writes_nothing() {
    let mut serializer = DocumentSerializer::new();

    write_optional(None::<&String>, member(&WIDGET, "secret"), &mut serializer).unwrap();

    assert!(serializer.finish().is_err());
}

#[test]
fn write_optional___some___writes_value() {
    let mut serializer = DocumentSerializer::new();

    write_optional(Some(&7), member(&WIDGET, "count"), &mut serializer).unwrap();

    assert_eq!(serializer.finish().unwrap(), Document::from(7));
}

#[test]
fn resolve_default___present_value___wins() {
    let value = resolve_default(Some(2.0), member(&DEFAULTS, "ratio")).unwrap();

    assert_eq!(value, Some(2.0));
}

#[test]
fn resolve_default___absent_value___uses_default() {
    let value: Option<f64> = resolve_default(None, member(&DEFAULTS, "ratio")).unwrap();

    assert_eq!(value, Some(0.5));
}

#[test]
fn resolve_default___empty_list_default___is_fresh_empty_vec() {
    let first: Option<Vec<String>> = resolve_default(None, member(&DEFAULTS, "tags")).unwrap();
    let mut second: Vec<String> = resolve_default(None, member(&DEFAULTS, "tags")).unwrap().unwrap();
    second.push("x".to_string());

    assert_eq!(first, Some(Vec::new()));
    assert_eq!(second.len(), 1);
}

#[test]
fn resolve_default___null_default___counts_as_absent() {
    let value: Option<String> = resolve_default(None, member(&DEFAULTS, "label")).unwrap();

    assert_eq!(value, None);
}

#[test]
fn required_or_default___absent_without_default___is_missing_required_member() {
    let result: ShapeResult<String> = required_or_default(None, member(&WIDGET, "name"), &WIDGET);

    assert_eq!(
        result,
        Err(ShapeError::MissingRequiredMember {
            member: "name".to_string(),
            shape: WIDGET.id().clone(),
        })
    );
}

#[test]
fn optional___absent_plain_member___stays_none() {
    let value: Option<String> = optional(None, member(&WIDGET, "secret"), &WIDGET).unwrap();

    assert_eq!(value, None);
}

#[test]
fn optional___absent_required_member___is_missing_required_member() {
    let result: ShapeResult<Option<String>> = optional(None, member(&WIDGET, "name"), &WIDGET);

    assert!(matches!(result, Err(ShapeError::MissingRequiredMember { ref member, .. }) if member == "name"));
}

#[test]
fn optional___present_required_member___is_kept() {
    let value = optional(Some("gear".to_string()), member(&WIDGET, "name"), &WIDGET).unwrap();

    assert_eq!(value.as_deref(), Some("gear"));
}

#[test]
fn check_required___required_member_absent___names_it() {
    let result = check_required(&WIDGET, |name| name == "count");

    assert_eq!(
        result,
        Err(ShapeError::MissingRequiredMember {
            member: "name".to_string(),
            shape: WIDGET.id().clone(),
        })
    );
}

#[test]
fn check_required___only_optional_members_absent___passes() {
    assert!(check_required(&WIDGET, |name| name == "name").is_ok());
    assert!(check_required(&DEFAULTS, |_| false).is_ok());
}

#[test]
fn unknown_variant___names_union_and_tag() {
    let error = unknown_variant(&CHOICE, "later");

    assert_eq!(error.to_string(), "cannot serialize unknown variant `later` of union example#Choice");
}

#[test]
fn redacted___sensitive_member___hides_value() {
    let text = format!("{:?}", redacted(member(&WIDGET, "secret"), "hunter2"));

    assert_eq!(text, REDACTED);
}

#[test]
fn redacted___plain_member___shows_value() {
    let text = format!("{:?}", redacted(member(&WIDGET, "name"), "gear"));

    assert_eq!(text, "\"gear\"");
}

#[test]
fn redacted_at___sensitive_index___hides_value() {
    let text = format!("{:?}", redacted_at(&WIDGET, 3, "hunter2"));

    assert_eq!(text, REDACTED);
}

#[test]
fn redacted_at___index_past_members___shows_value() {
    let text = format!("{:?}", redacted_at(&WIDGET, 9, &7));

    assert_eq!(text, "7");
}
