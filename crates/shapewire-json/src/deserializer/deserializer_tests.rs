#![allow(non_snake_case)]

use super::*;
use crate::test_schemas::{CHOICE, MATRIX, NOTES, PROFILE, TAGS};
use serde_json::json;
use shapewire_core::{DeserializeShape, NullPolicy, prelude_schemas};
use test_case::test_case;

fn read<T: DeserializeShape>(schema: &'static Schema, json: &Value) -> ShapeResult<T> {
    read_with(schema, json, &SerdeConfig::default())
}

fn read_with<T: DeserializeShape>(schema: &'static Schema, json: &Value, config: &SerdeConfig) -> ShapeResult<T> {
    T::deserialize_shape(schema, &mut JsonShapeDeserializer::new(json, config))
}

#[test]
fn JsonShapeDeserializer___json_name_key___maps_to_member() {
    let doc: Document = read(&PROFILE, &json!({"fullName": "Ann"})).unwrap();

    assert_eq!(doc.get("name").unwrap().unwrap().as_string().unwrap(), "Ann");
}

#[test]
fn JsonShapeDeserializer___json_name_disabled___matches_member_name() {
    let json = json!({"fullName": "Ann", "name": "Bea"});
    let config = SerdeConfig::default();

    let doc = Document::deserialize_shape(&PROFILE, &mut JsonShapeDeserializer::new(&json, &config).use_json_name(false))
        .unwrap();

    assert_eq!(doc.get("name").unwrap().unwrap().as_string().unwrap(), "Bea");
    assert_eq!(doc.len().unwrap(), 1);
}

#[test]
fn JsonShapeDeserializer___unknown_and_null_members___are_skipped() {
    let doc: Document = read(&PROFILE, &json!({"fullName": "Ann", "extra": 1, "score": null})).unwrap();

    assert_eq!(doc.keys().unwrap(), ["name"]);
}

#[test]
fn JsonShapeDeserializer___embedded_type_key___is_ignored_in_structures() {
    let doc: Document = read(&PROFILE, &json!({"__type": "example#Profile", "fullName": "Ann"})).unwrap();

    assert_eq!(doc.keys().unwrap(), ["name"]);
}

#[test]
fn JsonShapeDeserializer___blob___decodes_base64() {
    let bytes: shapewire_core::Blob = read(&prelude_schemas::BLOB, &json!("aGkh")).unwrap();

    assert_eq!(&*bytes, b"hi!");
}

#[test]
fn JsonShapeDeserializer___invalid_base64___is_deserialization_error() {
    let result: ShapeResult<shapewire_core::Blob> = read(&prelude_schemas::BLOB, &json!("not base64!"));

    assert!(matches!(result, Err(ShapeError::Deserialization(_))));
}

#[test_case(json!(1_700_000_000), 1_700_000_000, 0 ; "whole seconds")]
#[test_case(json!(1.25), 1, 250_000_000 ; "fractional seconds")]
fn JsonShapeDeserializer___epoch_seconds___reads_number(json: Value, seconds: i64, nanos: u32) {
    let at: DateTime<Utc> = read(&prelude_schemas::TIMESTAMP, &json).unwrap();

    assert_eq!(at, DateTime::from_timestamp(seconds, nanos).unwrap());
}

#[test]
fn JsonShapeDeserializer___date_time_member___reads_rfc3339() {
    let doc: Document = read(
        &PROFILE,
        &json!({"fullName": "Ann", "updated": "2023-11-14T22:13:20Z"}),
    )
    .unwrap();

    let updated = doc.get("updated").unwrap().unwrap().as_timestamp().unwrap();

    assert_eq!(updated, DateTime::from_timestamp(1_700_000_000, 0).unwrap());
}

#[test]
fn JsonShapeDeserializer___number_for_date_time_member___is_type_mismatch() {
    let result: ShapeResult<Document> = read(&PROFILE, &json!({"fullName": "Ann", "updated": 1}));

    assert!(matches!(result, Err(ShapeError::TypeMismatch { .. })));
}

#[test]
fn JsonShapeDeserializer___string_for_epoch_member___is_type_mismatch() {
    let result: ShapeResult<DateTime<Utc>> = read(&prelude_schemas::TIMESTAMP, &json!("2023-11-14T22:13:20Z"));

    assert!(matches!(result, Err(ShapeError::TypeMismatch { .. })));
}

#[test_case("NaN" ; "nan")]
#[test_case("Infinity" ; "positive infinity")]
#[test_case("-Infinity" ; "negative infinity")]
fn JsonShapeDeserializer___non_finite_string___reads_as_double(text: &str) {
    let value: f64 = read(&prelude_schemas::DOUBLE, &json!(text)).unwrap();

    assert!(!value.is_finite());
    assert_eq!(value.is_nan(), text == "NaN");
}

#[test]
fn JsonShapeDeserializer___other_string_for_double___is_type_mismatch() {
    let result: ShapeResult<f64> = read(&prelude_schemas::DOUBLE, &json!("1.5"));

    assert!(matches!(result, Err(ShapeError::TypeMismatch { .. })));
}

#[test]
fn JsonShapeDeserializer___integer_out_of_range___is_out_of_range() {
    let result: ShapeResult<i8> = read(&prelude_schemas::BYTE, &json!(300));

    assert_eq!(
        result,
        Err(ShapeError::OutOfRange {
            value: "300".to_string(),
            target: ShapeType::Byte,
        })
    );
}

#[test]
fn JsonShapeDeserializer___fraction_for_integer___is_type_mismatch() {
    let result: ShapeResult<i32> = read(&prelude_schemas::INTEGER, &json!(1.5));

    assert!(matches!(result, Err(ShapeError::TypeMismatch { .. })));
}

#[test]
fn JsonShapeDeserializer___wrong_json_type___names_actual_kind() {
    let result: ShapeResult<bool> = read(&prelude_schemas::BOOLEAN, &json!("yes"));

    assert_eq!(result, Err(ShapeError::mismatch(ShapeType::Boolean, "string")));
}

#[test]
fn JsonShapeDeserializer___big_numbers___keep_every_digit() {
    let json: Value = serde_json::from_str("[123456789012345678901234567890, 0.1000000000000000000000001]").unwrap();

    let big: BigInt = read(&prelude_schemas::BIG_INTEGER, &json[0]).unwrap();
    let decimal: BigDecimal = read(&prelude_schemas::BIG_DECIMAL, &json[1]).unwrap();

    assert_eq!(big.to_string(), "123456789012345678901234567890");
    assert_eq!(decimal, "0.1000000000000000000000001".parse::<BigDecimal>().unwrap());
}

#[test]
fn JsonShapeDeserializer___null_in_list___is_dropped() {
    let tags: Vec<String> = read(&TAGS, &json!(["a", null, "b"])).unwrap();

    assert_eq!(tags, ["a", "b"]);
}

#[test]
fn JsonShapeDeserializer___null_in_list_with_reject_policy___is_null_not_allowed() {
    let config = SerdeConfig::default().strict();

    let result: ShapeResult<Vec<String>> = read_with(&TAGS, &json!(["a", null]), &config);

    assert_eq!(config.null_policy, NullPolicy::Reject);
    assert_eq!(result, Err(ShapeError::NullNotAllowed(TAGS.id().clone())));
}

#[test]
fn JsonShapeDeserializer___null_in_sparse_map___is_kept() {
    let notes: shapewire_core::IndexMap<String, Option<String>> =
        read(&NOTES, &json!({"a": "x", "b": null})).unwrap();

    assert_eq!(notes.get("a"), Some(&Some("x".to_string())));
    assert_eq!(notes.get("b"), Some(&None));
}

#[test]
fn JsonShapeDeserializer___union_member___is_known() {
    let doc: Document = read(&CHOICE, &json!({"number": 3, "text": null})).unwrap();

    assert_eq!(doc.get("number").unwrap().unwrap().as_integer().unwrap(), 3);
}

#[test_case(json!({}), 0 ; "no members")]
#[test_case(json!({"text": "a", "number": 1}), 2 ; "two members")]
#[test_case(json!({"__type": "example#Choice"}), 0 ; "only a type tag")]
fn JsonShapeDeserializer___union_arity___is_rejected(json: Value, count: usize) {
    let result: ShapeResult<Document> = read(&CHOICE, &json);

    assert_eq!(
        result,
        Err(ShapeError::UnionArity {
            shape: CHOICE.id().clone(),
            count,
        })
    );
}

#[test]
fn JsonShapeDeserializer___unknown_union_tag___is_reported() {
    let json = json!({"later": true});
    let config = SerdeConfig::default();
    let mut deserializer = JsonShapeDeserializer::new(&json, &config);

    let outcome = deserializer.read_union(&CHOICE, &mut |_, _| Ok(())).unwrap();

    assert_eq!(outcome, UnionMember::Unknown("later".to_string()));
}

#[test]
fn JsonShapeDeserializer___unknown_union_tag___value_is_readable() {
    let json = json!({"later": {"x": 1}});
    let config = SerdeConfig::default();
    let mut deserializer = JsonShapeDeserializer::new(&json, &config);

    deserializer.read_union(&CHOICE, &mut |_, _| Ok(())).unwrap();
    let value = deserializer.read_unknown_member(&CHOICE, "later").unwrap();

    assert_eq!(value.get("x").unwrap().unwrap().as_long().unwrap(), 1);
}

#[test]
fn JsonShapeDeserializer___union_document_with_unknown_tag___keeps_value() {
    let doc: Document = read(&CHOICE, &json!({"later": 5})).unwrap();

    assert_eq!(doc.get("later").unwrap().unwrap().as_long().unwrap(), 5);
    let again: Document = doc.as_shape_with(&CHOICE).unwrap();
    assert_eq!(again.keys().unwrap(), ["later"]);
}

#[test]
fn JsonShapeDeserializer___document_missing_required_member___is_rejected() {
    let result: ShapeResult<Document> = read(&PROFILE, &json!({"score": 1.5}));

    assert_eq!(
        result.unwrap_err(),
        ShapeError::MissingRequiredMember {
            member: "name".to_string(),
            shape: PROFILE.id().clone(),
        }
    );
}

#[test]
fn JsonShapeDeserializer___nesting_beyond_max_depth___is_rejected() {
    let config = SerdeConfig::default().with_max_depth(1);

    let result: ShapeResult<Vec<Vec<i32>>> = read_with(&MATRIX, &json!([[1, 2]]), &config);

    assert_eq!(result, Err(ShapeError::NestingTooDeep(1)));
}

#[test]
fn JsonShapeDeserializer___nesting_within_max_depth___is_read() {
    let config = SerdeConfig::default().with_max_depth(2);

    let matrix: Vec<Vec<i32>> = read_with(&MATRIX, &json!([[1, 2], [3]]), &config).unwrap();

    assert_eq!(matrix, vec![vec![1, 2], vec![3]]);
}

#[test]
fn JsonShapeDeserializer___document_schema___reads_untyped_document() {
    let doc: Document = read(&prelude_schemas::DOCUMENT, &json!({"a": [1, "two"]})).unwrap();

    let items = doc.get("a").unwrap().unwrap();

    assert_eq!(items.get_index(0).unwrap().as_long().unwrap(), 1);
    assert_eq!(items.get_index(1).unwrap().as_string().unwrap(), "two");
}
