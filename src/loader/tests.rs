//! Tests for YAML loader module

use super::*;
use crate::config::TapConfig;
use crate::error::Error;
use crate::partition::Partitioning;
use crate::types::ReplicationMode;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use test_case::test_case;

const MINIMAL: &str = r#"
name: test-provider
base_url: https://api.example.com
streams:
  - name: users
    path: /users
"#;

const PARTITIONED: &str = r#"
name: spaces
base_url: https://cdn.example.com
required_config: [access_token]
params:
  access_token: "{{ config.access_token }}"
http:
  timeout_secs: 10
  max_retries: 5
  rate_limit_rps: 4
  user_agent: rest-tap-test
streams:
  - name: entries
    path: "/spaces/{{ partition }}/entries"
    partitions:
      type: config
      key: space_ids
    replication:
      mode: incremental
      replication_key: updated_at
      filter_param: "updated[gte]"
  - name: assets
    path: /assets
  - name: archive
    path: /archive
    selected_by_default: false
"#;

fn names(streams: &[&crate::stream::StreamDescriptor]) -> Vec<String> {
    streams.iter().map(|s| s.name.clone()).collect()
}

// ============================================================================
// Basic Loading Tests
// ============================================================================

#[test]
fn test_load_minimal_provider() {
    let def = load_provider_from_str(MINIMAL).unwrap();

    assert_eq!(def.name, "test-provider");
    assert_eq!(def.version, "0.1.0");
    assert_eq!(def.streams.len(), 1);
    assert_eq!(def.streams[0].mode(), ReplicationMode::Full);
    assert_eq!(def.http.timeout_secs, 30);
    assert_eq!(def.http.max_retries, 3);
    assert!(def.http.rate_limit_rps.is_none());
}

#[test]
fn test_load_partitioned_provider() {
    let def = load_provider_from_str(PARTITIONED).unwrap();

    assert_eq!(def.params.get("access_token").unwrap(), "{{ config.access_token }}");
    assert_eq!(def.http.rate_limit_rps, Some(4));
    assert_eq!(
        def.stream("entries").unwrap().partitions,
        Partitioning::Config {
            key: "space_ids".to_string(),
            field: None
        }
    );
    assert_eq!(
        def.required_keys(),
        vec!["access_token".to_string(), "space_ids".to_string()]
    );
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(MINIMAL.as_bytes()).unwrap();

    let def = load_provider(file.path()).unwrap();
    assert_eq!(def.name, "test-provider");
}

#[test]
fn test_load_builtin_by_name() {
    let def = load_provider("contentful").unwrap();
    assert_eq!(def.name, "contentful");
}

#[test]
fn test_unknown_provider_lists_builtins() {
    let err = load_provider("nonexistent").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("not found"));
    assert!(message.contains("abc_financial"));
}

// ============================================================================
// Stream Selection Tests
// ============================================================================

#[test]
fn test_select_defaults() {
    let def = load_provider_from_str(PARTITIONED).unwrap();
    let selected = def.select(&[]).unwrap();

    assert_eq!(names(&selected), vec!["entries", "assets"]);
}

#[test]
fn test_select_keeps_definition_order() {
    let def = load_provider_from_str(PARTITIONED).unwrap();
    let selected = def
        .select(&["archive".to_string(), "entries".to_string()])
        .unwrap();

    assert_eq!(names(&selected), vec!["entries", "archive"]);
}

#[test]
fn test_select_unknown_stream() {
    let def = load_provider_from_str(PARTITIONED).unwrap();
    let err = def.select(&["nope".to_string()]).unwrap_err();

    assert!(matches!(err, Error::StreamNotFound { stream } if stream == "nope"));
}

// ============================================================================
// HTTP Client Config Tests
// ============================================================================

#[test]
fn test_http_client_config_renders_base_url() {
    let def = load_provider_from_str(
        r#"
name: hosted
base_url: "https://{{ config.host }}/api"
required_config: [host]
streams:
  - name: things
    path: /things
"#,
    )
    .unwrap();
    let config = TapConfig::from_value(
        json!({"start_date": "2020-01-01T00:00:00Z", "host": "example.org"}),
        &def.required_keys(),
    )
    .unwrap();

    let http = def.http_client_config(&config).unwrap();
    assert_eq!(http.base_url.as_deref(), Some("https://example.org/api"));
    assert_eq!(http.max_retries, 3);
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test_case("name: \"\"\nbase_url: https://x\nstreams: [{name: a, path: /a}]", "name cannot be empty" ; "empty name")]
#[test_case("name: p\nbase_url: \"\"\nstreams: [{name: a, path: /a}]", "base_url cannot be empty" ; "empty base url")]
#[test_case("name: p\nbase_url: https://x\nstreams: []", "at least one stream" ; "no streams")]
#[test_case("name: p\nbase_url: https://x\nstreams: [{name: a, path: /a}, {name: a, path: /b}]", "Duplicate stream" ; "duplicate streams")]
#[test_case("name: p\nbase_url: https://x\nstreams: [{name: a, path: \"\"}]", "path cannot be empty" ; "empty path")]
#[test_case("name: p\nbase_url: https://x\nstreams: [{name: a, path: \"/{{ partition }}\"}]", "no partitions" ; "partition without partitioning")]
#[test_case("name: p\nbase_url: https://x\nstreams: [{name: a, path: /a, pagination: {type: offset, page_size: 0}}]", "page_size" ; "zero page size")]
#[test_case("name: p\nbase_url: https://x\nstreams: [{name: a, path: /a, params: {key: \"{{ config.secret }}\"}}]", "'secret'" ; "undeclared config")]
fn test_invalid_definition(yaml: &str, expected: &str) {
    let err = load_provider_from_str(yaml).unwrap_err();
    assert!(
        err.to_string().contains(expected),
        "expected '{expected}' in '{err}'"
    );
}

#[test]
fn test_zero_day_window_rejected() {
    let yaml = r#"
name: p
base_url: https://x
streams:
  - name: a
    path: /a
    replication:
      mode: incremental
      replication_key: ts
      filter_param: range
      window:
        type: fixed
        days: 0
"#;
    let err = load_provider_from_str(yaml).unwrap_err();
    assert!(err.to_string().contains("at least one day"));
}

#[test]
fn test_record_watermark_needs_order_param() {
    let yaml = r#"
name: p
base_url: https://x
streams:
  - name: a
    path: /a
    replication:
      mode: incremental
      replication_key: ts
      filter_param: "ts[gte]"
      watermark:
        type: record
        path: ts
        order_param: ""
        order_value: ts
"#;
    let err = load_provider_from_str(yaml).unwrap_err();
    assert!(err.to_string().contains("order_param"));
}

#[test]
fn test_start_date_and_partition_keys_are_declared() {
    let yaml = r#"
name: p
base_url: https://x
streams:
  - name: a
    path: "/{{ partition }}/a"
    params:
      since: "{{ start_date }}"
      club: "{{ config.club_ids }}"
    partitions:
      type: config
      key: club_ids
"#;
    assert!(load_provider_from_str(yaml).is_ok());
}

#[test]
fn test_malformed_yaml() {
    let err = load_provider_from_str("name: [unclosed").unwrap_err();
    assert!(err.to_string().contains("Failed to parse provider YAML"));
}
