#![allow(non_snake_case)]

use super::*;
use crate::test_support::{COUNTS, SPARSE_TAGS, TAGS};
use crate::{Document, DocumentDeserializer, DocumentSerializer, ShapeError};

fn to_document<T: SerializeShape + ?Sized>(schema: &'static Schema, value: &T) -> Document {
    let mut serializer = DocumentSerializer::new();
    value.serialize_shape(schema, &mut serializer).unwrap();
    serializer.finish().unwrap()
}

fn from_document<T: DeserializeShape>(schema: &'static Schema, doc: &Document) -> ShapeResult<T> {
    T::deserialize_shape(schema, &mut DocumentDeserializer::new(doc))
}

#[test]
fn scalars___schema___is_prelude_schema() {
    assert_eq!(bool::schema().id().as_str(), "smithy.api#Boolean");
    assert_eq!(i64::schema().id().as_str(), "smithy.api#Long");
    assert_eq!(String::schema().id().as_str(), "smithy.api#String");
    assert_eq!(Blob::schema().id().as_str(), "smithy.api#Blob");
    assert_eq!(<DateTime<Utc>>::schema().id().as_str(), "smithy.api#Timestamp");
}

#[test]
fn i16___through_document___keeps_value() {
    let doc = to_document(&prelude_schemas::SHORT, &-12i16);

    assert_eq!(from_document::<i16>(&prelude_schemas::SHORT, &doc).unwrap(), -12);
}

#[test]
fn str___serializes_as_string() {
    let doc = to_document(&prelude_schemas::STRING, "hello");

    assert_eq!(doc.as_string().unwrap(), "hello");
}

#[test]
fn Blob___serializes_as_blob_not_list() {
    let doc = to_document(&prelude_schemas::BLOB, &Blob::new(b"abc".to_vec()));

    assert_eq!(doc.as_blob().unwrap(), b"abc");
    assert_eq!(from_document::<Blob>(&prelude_schemas::BLOB, &doc).unwrap(), Blob::from(&b"abc"[..]));
}

#[test]
fn Vec___serializes_under_list_schema() {
    let tags = vec!["a".to_string(), "b".to_string()];

    let doc = to_document(&TAGS, &tags);

    assert_eq!(doc.len().unwrap(), 2);
    assert_eq!(from_document::<Vec<String>>(&TAGS, &doc).unwrap(), tags);
}

#[test]
fn Vec___under_non_list_schema___is_type_mismatch() {
    let result = {
        let mut serializer = DocumentSerializer::new();
        vec![1].serialize_shape(&prelude_schemas::INTEGER, &mut serializer)
    };

    assert!(matches!(result, Err(ShapeError::TypeMismatch { .. })));
}

#[test]
fn Option___none_in_sparse_list___is_written_as_null() {
    let tags = vec![Some("a".to_string()), None];

    let doc = to_document(&SPARSE_TAGS, &tags);

    assert!(doc.get_index(1).unwrap().is_null());
    assert_eq!(from_document::<Vec<Option<String>>>(&SPARSE_TAGS, &doc).unwrap(), tags);
}

#[test]
fn IndexMap___keeps_insertion_order() {
    let mut counts = IndexMap::new();
    counts.insert("z".to_string(), 1);
    counts.insert("a".to_string(), 2);

    let doc = to_document(&COUNTS, &counts);

    assert_eq!(doc.keys().unwrap(), ["z", "a"]);
    assert_eq!(from_document::<IndexMap<String, i32>>(&COUNTS, &doc).unwrap(), counts);
}

#[test]
fn BTreeMap___round_trips_through_document() {
    let counts: BTreeMap<String, i32> = [("b".to_string(), 2), ("a".to_string(), 1)].into_iter().collect();

    let doc = to_document(&COUNTS, &counts);

    assert_eq!(from_document::<BTreeMap<String, i32>>(&COUNTS, &doc).unwrap(), counts);
}

#[test]
fn Box___delegates_to_inner_value() {
    let doc = to_document(&prelude_schemas::INTEGER, &Box::new(5));

    assert_eq!(*from_document::<Box<i32>>(&prelude_schemas::INTEGER, &doc).unwrap(), 5);
}

#[test]
fn BigDecimal___keeps_precision() {
    let value: BigDecimal = "12345678901234567890.123456789".parse().unwrap();

    let doc = to_document(&prelude_schemas::BIG_DECIMAL, &value);

    assert_eq!(from_document::<BigDecimal>(&prelude_schemas::BIG_DECIMAL, &doc).unwrap(), value);
}
