#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

fn sample() -> DateTime<Utc> {
    DateTime::from_timestamp(1_398_796_238, 0).unwrap()
}

#[test]
fn TimestampFormat___default___is_epoch_seconds() {
    assert_eq!(TimestampFormat::default(), TimestampFormat::EpochSeconds);
}

#[test]
fn TimestampFormat___http_date___formats_imf_fixdate() {
    let text = TimestampFormat::HttpDate.format(&sample());

    assert_eq!(text, "Tue, 29 Apr 2014 18:30:38 GMT");
}

#[test]
fn TimestampFormat___date_time___formats_utc_with_z() {
    let text = TimestampFormat::DateTime.format(&sample());

    assert_eq!(text, "2014-04-29T18:30:38Z");
}

#[test]
fn TimestampFormat___epoch_seconds___formats_whole_seconds_without_fraction() {
    let text = TimestampFormat::EpochSeconds.format(&sample());

    assert_eq!(text, "1398796238");
}

#[test_case(TimestampFormat::EpochSeconds)]
#[test_case(TimestampFormat::DateTime)]
#[test_case(TimestampFormat::HttpDate)]
fn TimestampFormat___format_then_parse___preserves_whole_seconds(format: TimestampFormat) {
    let text = format.format(&sample());

    let parsed = format.parse(&text).unwrap();

    assert_eq!(parsed, sample());
}

#[test]
fn TimestampFormat___date_time_with_offset___normalizes_to_utc() {
    let parsed = TimestampFormat::DateTime
        .parse("2014-04-29T20:30:38+02:00")
        .unwrap();

    assert_eq!(parsed, sample());
}

#[test_case(TimestampFormat::EpochSeconds, "soon")]
#[test_case(TimestampFormat::DateTime, "29/04/2014")]
#[test_case(TimestampFormat::HttpDate, "2014-04-29T18:30:38Z")]
fn TimestampFormat___parse_garbage___is_deserialization_error(format: TimestampFormat, text: &str) {
    let result = format.parse(text);

    assert!(matches!(result, Err(ShapeError::Deserialization(_))));
}

#[test]
fn from_epoch_seconds___fraction___keeps_milliseconds() {
    let parsed = from_epoch_seconds(1.123).unwrap();

    assert_eq!(parsed.timestamp(), 1);
    assert_eq!(parsed.timestamp_subsec_millis(), 123);
}

#[test]
fn from_epoch_seconds___non_finite___is_out_of_range() {
    let result = from_epoch_seconds(f64::NAN);

    assert!(matches!(result, Err(ShapeError::OutOfRange { .. })));
}

#[test]
fn TimestampFormat___serde___uses_trait_values() {
    let json = serde_json::to_string(&TimestampFormat::HttpDate).unwrap();

    assert_eq!(json, "\"http-date\"");
}
