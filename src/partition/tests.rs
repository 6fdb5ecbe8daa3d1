//! Tests for partition module

use super::*;
use crate::config::TapConfig;
use crate::error::Error;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn config(values: Value) -> TapConfig {
    let mut values = values;
    values["start_date"] = json!("2020-01-01T00:00:00Z");
    TapConfig::from_value(values, &[]).unwrap()
}

fn ids(partitions: &[Partition]) -> Vec<&str> {
    partitions.iter().map(|p| p.id.as_str()).collect()
}

#[test]
fn test_unpartitioned_stream_has_implicit_partition() {
    let partitions = Partitioning::None.partitions(&config(json!({}))).unwrap();
    assert_eq!(partitions, vec![Partition::implicit()]);
    assert_eq!(partitions[0].id, DEFAULT_PARTITION);
}

#[test]
fn test_config_partitions_keep_order_and_drop_duplicates() {
    let partitioning = Partitioning::Config {
        key: "club_ids".to_string(),
        field: None,
    };
    let partitions = partitioning
        .partitions(&config(json!({"club_ids": ["9003", "1234", "9003", "5678"]})))
        .unwrap();

    assert_eq!(ids(&partitions), vec!["9003", "1234", "5678"]);
}

#[test]
fn test_config_partitions_from_comma_string() {
    let partitioning = Partitioning::Config {
        key: "club_ids".to_string(),
        field: None,
    };
    let partitions = partitioning
        .partitions(&config(json!({"club_ids": "1234, 5678,"})))
        .unwrap();

    assert_eq!(ids(&partitions), vec!["1234", "5678"]);
}

#[test]
fn test_config_partitions_from_single_value() {
    let partitioning = Partitioning::Config {
        key: "space_id".to_string(),
        field: None,
    };
    let partitions = partitioning
        .partitions(&config(json!({"space_id": "cfexampleapi"})))
        .unwrap();

    assert_eq!(ids(&partitions), vec!["cfexampleapi"]);
}

#[test]
fn test_missing_partition_key_is_config_error() {
    let partitioning = Partitioning::Config {
        key: "club_ids".to_string(),
        field: None,
    };
    let err = partitioning.partitions(&config(json!({}))).unwrap_err();
    assert!(matches!(err, Error::MissingConfigField { ref field } if field == "club_ids"));
}

#[test]
fn test_empty_partition_list_is_config_error() {
    let partitioning = Partitioning::Config {
        key: "club_ids".to_string(),
        field: None,
    };
    let err = partitioning
        .partitions(&config(json!({"club_ids": []})))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConfigValue { .. }));
}

#[test]
fn test_hydrate_sets_field_on_objects_only() {
    let partition = Partition::new("1234");

    let mut record = json!({"name": "Downtown"});
    partition.hydrate(&mut record, "club_id");
    assert_eq!(record, json!({"name": "Downtown", "club_id": "1234"}));

    let mut scalar = json!("not a record");
    partition.hydrate(&mut scalar, "club_id");
    assert_eq!(scalar, json!("not a record"));
}

#[test]
fn test_partitioning_from_yaml() {
    let partitioning: Partitioning =
        serde_yaml::from_str("type: config\nkey: club_ids\nfield: club_id\n").unwrap();

    assert_eq!(partitioning.config_key(), Some("club_ids"));
    assert_eq!(partitioning.hydrate_field(), Some("club_id"));
    assert_eq!(Partitioning::None.hydrate_field(), None);
}
