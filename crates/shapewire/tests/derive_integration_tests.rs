//! Derive Integration Tests
//!
//! These tests drive `#[derive(Shape)]` types through the JSON codec:
//! - Structures with required, defaulted, optional and sensitive members
//! - Unions with and without an unknown variant
//! - String and int enums, including values the schema does not know
//! - Timestamps and blobs following member traits

#![allow(non_snake_case)]

use serde_json::{Value, json};
use shapewire::members::REDACTED;
use shapewire::prelude::*;
use shapewire::{DateTime, Utc};

static TAGS: Lazy<Schema> = Lazy::new(|| {
    Schema::list("example#Tags")
        .member("member", &prelude_schemas::STRING, TraitSet::new())
        .build()
});

static COLOR: Lazy<Schema> = Lazy::new(|| Schema::string_enum("example#Color").build());

static LEVEL: Lazy<Schema> = Lazy::new(|| Schema::int_enum("example#Level").build());

static WIDGET: Lazy<Schema> = Lazy::new(|| {
    Schema::structure("example#Widget")
        .member(
            "name",
            &prelude_schemas::STRING,
            TraitSet::new().required().with_json_name("widgetName"),
        )
        .member(
            "count",
            &prelude_schemas::INTEGER,
            TraitSet::new().with_default(DefaultValue::Integer(1)),
        )
        .member("tags", &TAGS, TraitSet::new())
        .member(
            "color",
            &COLOR,
            TraitSet::new().with_default(DefaultValue::String("red".into())),
        )
        .member("level", &LEVEL, TraitSet::new())
        .member("secret", &prelude_schemas::STRING, TraitSet::new().sensitive())
        .build()
});

static CHOICE: Lazy<Schema> = Lazy::new(|| {
    Schema::union("example#Choice")
        .member("text", &prelude_schemas::STRING, TraitSet::new())
        .member("number", &prelude_schemas::INTEGER, TraitSet::new())
        .member("widget", &WIDGET, TraitSet::new())
        .build()
});

static STRICT_CHOICE: Lazy<Schema> = Lazy::new(|| {
    Schema::union("example#StrictChoice")
        .member("text", &prelude_schemas::STRING, TraitSet::new())
        .build()
});

static EVENT: Lazy<Schema> = Lazy::new(|| {
    Schema::structure("example#Event")
        .member("at", &prelude_schemas::TIMESTAMP, TraitSet::new().required())
        .member(
            "stamped",
            &prelude_schemas::TIMESTAMP,
            TraitSet::new().with_timestamp_format(TimestampFormat::DateTime),
        )
        .member("payload", &prelude_schemas::BLOB, TraitSet::new())
        .build()
});

static NOTE: Lazy<Schema> = Lazy::new(|| {
    Schema::structure("example#Note")
        .member("title", &prelude_schemas::STRING, TraitSet::new().required())
        .member("body", &prelude_schemas::STRING, TraitSet::new())
        .build()
});

#[derive(Shape, Debug, Clone, PartialEq)]
#[shape(schema = "COLOR")]
enum Color {
    #[shape(value = "red")]
    Red,
    #[shape(value = "green")]
    Green,
    #[shape(unknown)]
    Unknown(String),
}

#[derive(Shape, Debug, Clone, PartialEq)]
#[shape(schema = "LEVEL")]
enum Level {
    #[shape(int = 1)]
    Low,
    #[shape(int = 5)]
    High,
    #[shape(unknown)]
    Unknown(i32),
}

#[derive(Shape, Clone, PartialEq)]
#[shape(schema = "WIDGET")]
struct Widget {
    name: String,
    count: i32,
    tags: Option<Vec<String>>,
    color: Color,
    level: Option<Level>,
    secret: Option<String>,
}

#[derive(Shape, Debug, Clone, PartialEq)]
#[shape(schema = "CHOICE")]
enum Choice {
    Text(String),
    Number(i32),
    Widget(Widget),
    #[shape(unknown)]
    Unknown(String),
}

#[derive(Shape, Debug, Clone, PartialEq)]
#[shape(schema = "STRICT_CHOICE")]
enum StrictChoice {
    Text(String),
}

#[derive(Shape, Clone, PartialEq)]
#[shape(schema = "EVENT")]
struct Event {
    at: DateTime<Utc>,
    stamped: Option<DateTime<Utc>>,
    payload: Option<Blob>,
}

/// Required member held in an `Option` field
#[derive(Shape, Clone, PartialEq)]
#[shape(schema = "NOTE")]
struct Note {
    title: Option<String>,
    body: Option<String>,
}

fn widget() -> Widget {
    Widget {
        name: "gear".to_string(),
        count: 3,
        tags: Some(vec!["a".to_string(), "b".to_string()]),
        color: Color::Green,
        level: Some(Level::High),
        secret: Some("hunter2".to_string()),
    }
}

fn to_json<T: ShapeSchema + SerializeShape>(codec: &JsonCodec, value: &T) -> Value {
    serde_json::from_slice(&codec.encode(value).unwrap()).unwrap()
}

fn decode<T: ShapeSchema + DeserializeShape>(json: Value) -> ShapeResult<T> {
    JsonCodec::new().decode(&serde_json::to_vec(&json).unwrap())
}

// ============================================================================
// Structures
// ============================================================================

#[test]
fn Widget___json_round_trip___preserves_value() {
    let codec = JsonCodec::new();
    let original = widget();

    let bytes = codec.encode(&original).unwrap();
    let decoded: Widget = codec.decode(&bytes).unwrap();

    assert_eq!(decoded, original);
}

#[test]
fn Widget___encode___uses_json_names_and_wire_values() {
    let json = to_json(&JsonCodec::new(), &widget());

    assert_eq!(
        json,
        json!({
            "widgetName": "gear",
            "count": 3,
            "tags": ["a", "b"],
            "color": "green",
            "level": 5,
            "secret": "hunter2",
        })
    );
}

#[test]
fn Widget___encode_ignoring_json_name___uses_member_name() {
    let json = to_json(&JsonCodec::new().ignore_json_name(), &widget());

    assert_eq!(json["name"], "gear");
    assert!(json.get("widgetName").is_none());
}

#[test]
fn Widget___none_members___are_not_written() {
    let mut value = widget();
    value.tags = None;
    value.level = None;
    value.secret = None;

    let json = to_json(&JsonCodec::new(), &value);

    assert_eq!(json.as_object().unwrap().len(), 3);
    assert!(json.get("tags").is_none());
}

#[test]
fn Widget___missing_required_member___fails() {
    let result: ShapeResult<Widget> = decode(json!({ "count": 2 }));

    assert_eq!(
        result.unwrap_err(),
        ShapeError::MissingRequiredMember {
            member: "name".to_string(),
            shape: ShapeId::new("example#Widget"),
        }
    );
}

#[test]
fn Note___optional_field_for_required_member___must_be_present() {
    let result: ShapeResult<Note> = decode(json!({ "body": "x" }));

    assert_eq!(
        result.unwrap_err(),
        ShapeError::MissingRequiredMember {
            member: "title".to_string(),
            shape: ShapeId::new("example#Note"),
        }
    );
}

#[test]
fn Note___required_member_present___decodes() {
    let note: Note = decode(json!({ "title": "hi" })).unwrap();

    assert_eq!(note.title.as_deref(), Some("hi"));
    assert_eq!(note.body, None);
}

#[test]
fn Note___document_without_required_member___is_rejected() {
    let result = JsonCodec::new().decode_with_schema::<Document>(&NOTE, br#"{"body":"x"}"#);

    assert!(matches!(result, Err(ShapeError::MissingRequiredMember { .. })));
}

#[test]
fn Widget___absent_defaulted_members___take_defaults() {
    let decoded: Widget = decode(json!({ "widgetName": "gear" })).unwrap();

    assert_eq!(decoded.count, 1);
    assert_eq!(decoded.color, Color::Red);
    assert_eq!(decoded.tags, None);
    assert_eq!(decoded.level, None);
}

#[test]
fn Widget___null_member___is_treated_as_absent() {
    let decoded: Widget = decode(json!({ "widgetName": "gear", "count": null, "tags": null })).unwrap();

    assert_eq!(decoded.count, 1);
    assert_eq!(decoded.tags, None);
}

#[test]
fn Widget___unknown_json_member___is_ignored() {
    let decoded: Widget = decode(json!({ "widgetName": "gear", "extra": { "nested": true } })).unwrap();

    assert_eq!(decoded.name, "gear");
}

#[test]
fn Widget___member_of_wrong_type___is_type_mismatch() {
    let result: ShapeResult<Widget> = decode(json!({ "widgetName": 7 }));

    assert!(matches!(result, Err(ShapeError::TypeMismatch { .. })));
}

#[test]
fn Widget___debug___redacts_sensitive_member() {
    let text = format!("{:?}", widget());

    assert!(text.contains(REDACTED));
    assert!(!text.contains("hunter2"));
    assert!(text.contains("gear"));
}

#[test]
fn Widget___sensitive_member___is_still_serialized() {
    let json = to_json(&JsonCodec::new(), &widget());

    assert_eq!(json["secret"], "hunter2");
}

#[test]
fn Widget___to_document___keys_members_by_name() {
    let doc = Document::from_shape(&widget()).unwrap();

    assert_eq!(doc.shape_type(), ShapeType::Structure);
    assert_eq!(doc.get("name").unwrap().unwrap().as_string().unwrap(), "gear");
    assert_eq!(doc.get("level").unwrap().unwrap().as_integer().unwrap(), 5);
    assert!(doc.get("widgetName").unwrap().is_none());
}

#[test]
fn Widget___document_round_trip___preserves_value() {
    let doc = Document::from_shape(&widget()).unwrap();

    let back: Widget = doc.as_shape().unwrap();

    assert_eq!(back, widget());
}

// ============================================================================
// Enums
// ============================================================================

#[test]
fn Color___as_str_and_display___give_wire_value() {
    assert_eq!(Color::Red.as_str(), "red");
    assert_eq!(Color::Unknown("teal".to_string()).to_string(), "teal");
    assert_eq!(Color::values(), &["red", "green"]);
}

#[test]
fn Level___value___gives_wire_value() {
    assert_eq!(Level::Low.value(), 1);
    assert_eq!(Level::Unknown(9).value(), 9);
    assert_eq!(Level::values(), &[1, 5]);
}

#[test]
fn Widget___unknown_enum_values___are_preserved() {
    let decoded: Widget = decode(json!({ "widgetName": "gear", "color": "purple", "level": 9 })).unwrap();

    assert_eq!(decoded.color, Color::Unknown("purple".to_string()));
    assert_eq!(decoded.level, Some(Level::Unknown(9)));

    let json = to_json(&JsonCodec::new(), &decoded);
    assert_eq!(json["color"], "purple");
    assert_eq!(json["level"], 9);
}

// ============================================================================
// Unions
// ============================================================================

#[test]
fn Choice___scalar_member___encodes_single_key_object() {
    let json = to_json(&JsonCodec::new(), &Choice::Number(5));

    assert_eq!(json, json!({ "number": 5 }));
}

#[test]
fn Choice___structure_member___round_trips() {
    let codec = JsonCodec::new();
    let original = Choice::Widget(widget());

    let decoded: Choice = codec.decode(&codec.encode(&original).unwrap()).unwrap();

    assert_eq!(decoded, original);
}

#[test]
fn Choice___two_members_set___is_union_arity_error() {
    let result: ShapeResult<Choice> = decode(json!({ "text": "a", "number": 1 }));

    assert_eq!(
        result.unwrap_err(),
        ShapeError::UnionArity {
            shape: ShapeId::new("example#Choice"),
            count: 2,
        }
    );
}

#[test]
fn Choice___no_member_set___is_union_arity_error() {
    let result: ShapeResult<Choice> = decode(json!({ "text": null }));

    assert_eq!(
        result.unwrap_err(),
        ShapeError::UnionArity {
            shape: ShapeId::new("example#Choice"),
            count: 0,
        }
    );
}

#[test]
fn Choice___unknown_member___decodes_to_unknown_variant() {
    let decoded: Choice = decode(json!({ "later": true })).unwrap();

    assert_eq!(decoded, Choice::Unknown("later".to_string()));
}

#[test]
fn Choice___unknown_member_through_document___stays_unknown_variant() {
    let doc = JsonCodec::new()
        .decode_with_schema::<Document>(&CHOICE, br#"{"later":5}"#)
        .unwrap();

    assert_eq!(doc.get("later").unwrap().unwrap().as_long().unwrap(), 5);
    assert_eq!(doc.as_shape::<Choice>().unwrap(), Choice::Unknown("later".to_string()));
}

#[test]
fn Choice___encode_unknown_variant___fails() {
    let result = JsonCodec::new().encode(&Choice::Unknown("later".to_string()));

    assert_eq!(
        result.unwrap_err(),
        ShapeError::UnknownVariant {
            shape: ShapeId::new("example#Choice"),
            tag: "later".to_string(),
        }
    );
}

#[test]
fn StrictChoice___unknown_member___fails() {
    let result: ShapeResult<StrictChoice> = decode(json!({ "later": 1 }));

    assert_eq!(
        result.unwrap_err(),
        ShapeError::UnknownVariant {
            shape: ShapeId::new("example#StrictChoice"),
            tag: "later".to_string(),
        }
    );
}

// ============================================================================
// Timestamps and blobs
// ============================================================================

#[test]
fn Event___encode___follows_timestamp_formats_and_base64() {
    let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    let event = Event {
        at,
        stamped: Some(at),
        payload: Some(Blob::new(b"hello".to_vec())),
    };

    let json = to_json(&JsonCodec::new(), &event);

    assert_eq!(
        json,
        json!({
            "at": 1_700_000_000,
            "stamped": "2023-11-14T22:13:20Z",
            "payload": "aGVsbG8=",
        })
    );
}

#[test]
fn Event___json_round_trip___preserves_value() {
    let codec = JsonCodec::new();
    let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    let event = Event {
        at,
        stamped: Some(at),
        payload: Some(Blob::new(vec![0, 255, 7])),
    };

    let decoded: Event = codec.decode(&codec.encode(&event).unwrap()).unwrap();

    assert!(decoded == event);
}

#[test]
fn Event___text_where_epoch_expected___is_type_mismatch() {
    let result: ShapeResult<Event> = decode(json!({ "at": "2023-11-14T22:13:20Z" }));

    assert!(matches!(result, Err(ShapeError::TypeMismatch { .. })));
}
