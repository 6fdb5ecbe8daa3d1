//! Tests for stream descriptors

use super::*;
use crate::datetime::ValueFormat;
use crate::pagination::PaginationConfig;
use crate::partition::Partitioning;
use crate::types::ReplicationMode;
use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn incremental(window: WindowPolicy, filter: FilterEncoding) -> IncrementalConfig {
    IncrementalConfig {
        replication_key: "timestamp".to_string(),
        filter_param: "checkInTimestampRange".to_string(),
        filter,
        value_format: ValueFormat::DatetimeMicros,
        window,
        watermark: WatermarkSource::Window,
    }
}

const CHECKINS_YAML: &str = r#"
name: checkins
path: "/{{ partition }}/clubs/checkins/details"
key_properties: [checkInId]
replication:
  mode: incremental
  replication_key: timestamp
  filter_param: checkInTimestampRange
  filter:
    type: range
  value_format: datetime_micros
  window:
    type: fixed
    days: 31
    epoch: "2015-01-01T00:00:00Z"
envelope:
  key: checkins
  count_field: status.count
pagination:
  type: page_number
  page_size: 5000
partitions:
  type: config
  key: club_ids
"#;

#[test]
fn test_descriptor_from_yaml() {
    let stream: StreamDescriptor = serde_yaml::from_str(CHECKINS_YAML).unwrap();

    assert_eq!(stream.name, "checkins");
    assert_eq!(stream.mode(), ReplicationMode::Incremental);
    assert_eq!(stream.replication_key(), Some("timestamp"));
    assert_eq!(stream.bookmark_properties(), vec!["timestamp".to_string()]);
    assert_eq!(stream.pagination, PaginationConfig::page_number("page", 1, 5000));
    assert_eq!(stream.partitions.config_key(), Some("club_ids"));
    assert!(stream.selected_by_default);

    let config = stream.incremental().unwrap();
    assert_eq!(
        config.filter,
        FilterEncoding::Range {
            separator: ",".to_string()
        }
    );
    assert_eq!(
        config.window,
        WindowPolicy::Fixed {
            days: 31,
            epoch: Some(at(2015, 1, 1))
        }
    );
    assert_eq!(config.watermark, WatermarkSource::Window);
}

#[test]
fn test_full_table_descriptor_defaults() {
    let stream: StreamDescriptor =
        serde_yaml::from_str("name: clubs\npath: /{{ partition }}/clubs\n").unwrap();

    assert_eq!(stream.mode(), ReplicationMode::Full);
    assert!(stream.incremental().is_none());
    assert!(stream.bookmark_properties().is_empty());
    assert_eq!(stream.pagination, PaginationConfig::None);
    assert_eq!(stream.partitions, Partitioning::None);
    assert_eq!(stream.schema["type"], "object");
}

#[test]
fn test_record_watermark_from_yaml() {
    let replication: Replication = serde_yaml::from_str(
        r"
mode: incremental
replication_key: updated_at
filter_param: sys.updatedAt[gte]
watermark:
  type: record
  path: sys.updatedAt
  order_param: order
  order_value: sys.updatedAt
",
    )
    .unwrap();

    let Replication::Incremental(config) = replication else {
        panic!("Expected incremental replication");
    };
    assert_eq!(config.order(), Some(("order", "sys.updatedAt")));
    assert_eq!(config.window, WindowPolicy::Unbounded);
    assert!(matches!(
        config.watermark,
        WatermarkSource::Record { refilter: true, .. }
    ));
}

#[test]
fn test_seed_prefers_epoch() {
    let start = at(2020, 1, 1);

    let fixed = incremental(
        WindowPolicy::Fixed {
            days: 31,
            epoch: Some(at(2015, 1, 1)),
        },
        FilterEncoding::default(),
    );
    assert_eq!(fixed.seed(start), at(2015, 1, 1));

    let unbounded = incremental(WindowPolicy::Unbounded, FilterEncoding::default());
    assert_eq!(unbounded.seed(start), start);
}

#[test_case(at(2015, 1, 1), at(2015, 2, 1) ; "full window")]
#[test_case(at(2020, 3, 20), at(2020, 4, 1) ; "capped at now")]
#[test_case(at(2020, 5, 1), at(2020, 5, 1) ; "bookmark ahead of now")]
fn test_fixed_window_range(last: DateTime<Utc>, expected_upper: DateTime<Utc>) {
    let config = incremental(
        WindowPolicy::Fixed {
            days: 31,
            epoch: None,
        },
        FilterEncoding::default(),
    );

    let range = config.range(last, at(2020, 4, 1));
    assert_eq!(range.lower, last);
    assert_eq!(range.upper, expected_upper);
}

#[test]
fn test_unbounded_range_reaches_now() {
    let config = incremental(WindowPolicy::Unbounded, FilterEncoding::default());
    let range = config.range(at(2020, 1, 1), at(2020, 1, 2));

    assert_eq!(
        range,
        SyncRange {
            lower: at(2020, 1, 1),
            upper: at(2020, 1, 2)
        }
    );
}

#[test]
fn test_range_filter_value() {
    let config = incremental(
        WindowPolicy::Unbounded,
        FilterEncoding::Range {
            separator: ",".to_string(),
        },
    );

    assert_eq!(
        config.filter_value(at(2015, 1, 1), at(2015, 2, 1)),
        "2015-01-01 00:00:00.000000,2015-02-01 00:00:00.000000"
    );
}

#[test]
fn test_lower_bound_filter_value() {
    let mut config = incremental(WindowPolicy::Unbounded, FilterEncoding::LowerBound);
    config.value_format = ValueFormat::Iso8601;

    assert_eq!(
        config.filter_value(at(2020, 1, 1), at(2020, 6, 1)),
        "2020-01-01T00:00:00Z"
    );
}
