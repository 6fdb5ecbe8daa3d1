//! Tests for sink module

use super::*;
use crate::state::{State, StateSink};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn lines(bytes: Vec<u8>) -> Vec<Value> {
    String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn test_schema_message_wire_shape() {
    let message = Message::schema(
        "members",
        json!({"type": "object"}),
        vec!["memberId".to_string()],
        Vec::new(),
    );

    assert_eq!(
        serde_json::to_value(&message).unwrap(),
        json!({
            "type": "SCHEMA",
            "stream": "members",
            "schema": {"type": "object"},
            "key_properties": ["memberId"]
        })
    );
}

#[test]
fn test_record_message_wire_shape() {
    let extracted = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
    let message = Message::record("entries", json!({"id": "e1"}), extracted);
    let value = serde_json::to_value(&message).unwrap();

    assert_eq!(value["type"], "RECORD");
    assert_eq!(value["record"], json!({"id": "e1"}));
    assert_eq!(value["time_extracted"], "2020-01-02T03:04:05Z");
    assert_eq!(message.stream(), Some("entries"));
}

#[test]
fn test_state_message_has_no_stream() {
    let message = Message::state(json!({"bookmarks": {}}));
    assert_eq!(message.stream(), None);
    assert_eq!(serde_json::to_value(&message).unwrap()["type"], "STATE");
}

#[tokio::test]
async fn test_singer_writer_emits_json_lines() {
    let writer = SingerWriter::new(Vec::new());
    let extracted = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();

    writer
        .write_schema("clubs", &json!({"type": "object"}), &["clubNumber".to_string()], &[])
        .await
        .unwrap();
    writer
        .write_record("clubs", json!({"clubNumber": "1234"}), extracted)
        .await
        .unwrap();

    let mut state = State::new();
    state.set("clubs", "1234", "ts", json!("2020-01-01T00:00:00Z"));
    writer.persist(&state).await.unwrap();

    let out = lines(writer.into_inner().unwrap());
    assert_eq!(out.len(), 3);
    assert_eq!(out[0]["type"], "SCHEMA");
    assert_eq!(out[1]["type"], "RECORD");
    assert_eq!(out[2]["type"], "STATE");
    assert_eq!(
        out[2]["value"],
        json!({"bookmarks": {"clubs": {"1234": {"ts": "2020-01-01T00:00:00Z"}}}})
    );
}

#[tokio::test]
async fn test_memory_sink_collects_by_stream() {
    let sink = MemorySink::new();
    let shared = sink.clone();
    let extracted = Utc::now();

    sink.write_record("a", json!({"id": 1}), extracted).await.unwrap();
    sink.write_record("b", json!({"id": 2}), extracted).await.unwrap();
    sink.write_record("a", json!({"id": 3}), extracted).await.unwrap();
    sink.persist(&State::new()).await.unwrap();

    assert_eq!(shared.records("a"), vec![json!({"id": 1}), json!({"id": 3})]);
    assert_eq!(shared.records("b").len(), 1);
    assert_eq!(shared.states(), vec![json!({"bookmarks": {}})]);
    assert_eq!(shared.messages().len(), 4);

    shared.clear();
    assert!(sink.messages().is_empty());
}
