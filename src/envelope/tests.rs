//! Tests for envelope module

use super::*;
use crate::error::Error;
use serde_json::json;

#[test]
fn test_open_array_under_key() {
    let envelope = Envelope::new("items").with_count_field("total");
    let opened = envelope
        .open(json!({"items": [{"id": 1}, {"id": 2}], "total": 2}))
        .unwrap();

    assert_eq!(opened.records, vec![json!({"id": 1}), json!({"id": 2})]);
    assert_eq!(opened.reported_count, Some(2));
}

#[test]
fn test_open_bare_object_becomes_single_record() {
    let envelope = Envelope::new("club");
    let opened = envelope
        .open(json!({"club": {"id": "c1", "name": "Downtown"}}))
        .unwrap();

    assert_eq!(opened.records, vec![json!({"id": "c1", "name": "Downtown"})]);
}

#[test]
fn test_open_nested_key() {
    let envelope = Envelope::new("data.results");
    let opened = envelope
        .open(json!({"data": {"results": [{"id": 1}]}}))
        .unwrap();
    assert_eq!(opened.records.len(), 1);
}

#[test]
fn test_open_null_is_empty_batch() {
    let opened = Envelope::new("members").open(json!({"members": null})).unwrap();
    assert!(opened.records.is_empty());
}

#[test]
fn test_missing_key_is_envelope_error() {
    let err = Envelope::new("items").open(json!({"sys": {}})).unwrap_err();
    assert!(matches!(err, Error::Envelope { ref path, .. } if path == "items"));
    assert!(err.is_partition_scoped());
}

#[test]
fn test_missing_key_tolerated_when_count_is_zero() {
    let envelope = Envelope::new("checkins").with_count_field("status.count");
    let opened = envelope
        .open(json!({"status": {"count": "0"}, "request": {"page": "2"}}))
        .unwrap();

    assert!(opened.records.is_empty());
    assert_eq!(opened.reported_count, Some(0));
}

#[test]
fn test_scalar_under_key_is_error() {
    let err = Envelope::new("items").open(json!({"items": "oops"})).unwrap_err();
    assert!(matches!(err, Error::Envelope { .. }));
}

#[test]
fn test_bare_envelope() {
    let opened = Envelope::bare().open(json!([{"id": 1}, {"id": 2}])).unwrap();
    assert_eq!(opened.records.len(), 2);
    assert_eq!(opened.reported_count, None);

    let opened = Envelope::bare().open(json!({"id": 1})).unwrap();
    assert_eq!(opened.records.len(), 1);
}

#[test]
fn test_reported_count_shapes() {
    let envelope = Envelope::bare().with_count_field("status.count");
    assert_eq!(envelope.reported_count(&json!({"status": {"count": 5000}})), Some(5000));
    assert_eq!(envelope.reported_count(&json!({"status": {"count": " 12 "}})), Some(12));
    assert_eq!(envelope.reported_count(&json!({"status": {"count": "many"}})), None);
    assert_eq!(Envelope::bare().reported_count(&json!({"count": 1})), None);
}

#[test]
fn test_envelope_deserialize() {
    let envelope: Envelope =
        serde_yaml::from_str("key: members\ncount_field: status.count\n").unwrap();
    assert_eq!(
        envelope,
        Envelope::new("members").with_count_field("status.count")
    );
}
