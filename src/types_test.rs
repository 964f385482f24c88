// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for types module

use super::types::*;

#[test]
fn test_stats_entry_numeric_string() {
    let json = r#"{"name": "questions", "type": "StatisticItem", "value": "42"}"#;
    let entry: StatsEntry = serde_json::from_str(json).unwrap();
    assert_eq!(entry.name, "questions");
    assert_eq!(entry.kind, "StatisticItem");
    assert_eq!(entry.value, Some(42.0));
}

#[test]
fn test_stats_entry_plain_number() {
    let json = r#"{"name": "uptime", "type": "StatisticItem", "value": 1234.5}"#;
    let entry: StatsEntry = serde_json::from_str(json).unwrap();
    assert_eq!(entry.value, Some(1234.5));
}

#[test]
fn test_stats_entry_map_statistic_has_no_value() {
    let json = r#"{
        "name": "response-by-qtype",
        "type": "MapStatisticItem",
        "value": [{"name": "A", "value": "12"}]
    }"#;
    let entry: StatsEntry = serde_json::from_str(json).unwrap();
    assert_eq!(entry.value, None);
}

#[test]
fn test_stats_entry_missing_value() {
    let json = r#"{"name": "questions"}"#;
    let entry: StatsEntry = serde_json::from_str(json).unwrap();
    assert_eq!(entry.value, None);
    assert_eq!(entry.kind, "");
}

#[test]
fn test_stats_entry_invalid_string_is_error() {
    let json = r#"{"name": "questions", "type": "StatisticItem", "value": "lots"}"#;
    let result: Result<StatsEntry, _> = serde_json::from_str(json);
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("invalid numeric statistic value"));
}

#[test]
fn test_snapshot_from_entries() {
    let entries = vec![
        StatsEntry {
            name: "questions".to_string(),
            kind: "StatisticItem".to_string(),
            value: Some(1.0),
        },
        StatsEntry {
            name: "response-by-qtype".to_string(),
            kind: "MapStatisticItem".to_string(),
            value: None,
        },
        StatsEntry {
            name: "questions".to_string(),
            kind: "StatisticItem".to_string(),
            value: Some(2.0),
        },
    ];

    let snapshot = StatisticsSnapshot::from_entries(entries);
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.get("questions"), Some(2.0));
    assert!(!snapshot.contains("response-by-qtype"));
}

#[test]
fn test_snapshot_empty() {
    let snapshot = StatisticsSnapshot::from_entries(vec![]);
    assert!(snapshot.is_empty());
    assert_eq!(snapshot.get("questions"), None);
}

#[test]
fn test_snapshot_from_iterator() {
    let snapshot: StatisticsSnapshot = [("a", 1.0), ("b", 2.0)].into_iter().collect();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.get("b"), Some(2.0));
}

#[test]
fn test_server_info_deserialization() {
    let json = r#"{
        "type": "Server",
        "id": "localhost",
        "url": "/api/v1/servers/localhost",
        "daemon_type": "recursor",
        "version": "4.9.2",
        "config_url": "/api/v1/servers/localhost/config{/config_setting}",
        "zones_url": "/api/v1/servers/localhost/zones{/zone}"
    }"#;

    let info: ServerInfo = serde_json::from_str(json).unwrap();
    assert_eq!(info.kind, "Server");
    assert_eq!(info.id, "localhost");
    assert_eq!(info.daemon_type, "recursor");
    assert_eq!(info.version, "4.9.2");
    assert!(info.zones_url.ends_with("zones{/zone}"));
}

#[test]
fn test_server_info_requires_daemon_type() {
    let json = r#"{"type": "Server", "id": "localhost"}"#;
    let result: Result<ServerInfo, _> = serde_json::from_str(json);
    assert!(result.is_err());
}

#[test]
fn test_error_response_serialization() {
    let response = ErrorResponse {
        error: "Test error".to_string(),
        details: Some("Details here".to_string()),
    };

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("Test error"));
    assert!(json.contains("Details here"));
}

#[test]
fn test_fetch_error_http_status_display() {
    let error = FetchError::HttpStatus {
        status: 401,
        body: "Unauthorized".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "PowerDNS API returned HTTP 401: Unauthorized"
    );
}

#[test]
fn test_histogram_error_display() {
    let error = HistogramError::MissingKey("answers-slow".to_string());
    assert_eq!(
        error.to_string(),
        "Required PowerDNS stats key not found: answers-slow"
    );
}

#[test]
fn test_exporter_error_from_fetch_error() {
    let error: ExporterError = FetchError::TaskDropped.into();
    assert!(matches!(error, ExporterError::Fetch(FetchError::TaskDropped)));
    assert!(error.to_string().contains("Could not fetch PowerDNS server info"));
}
