// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for collector module

use super::collector::*;
use crate::catalog::{Catalog, CounterDefinition, GaugeDefinition, ServerVariant};
use crate::histogram::RESPONSE_TIME_BUCKETS;
use crate::selector::{select_catalog, Selection};
use crate::types::{FetchError, StatsEntry};
use prometheus::proto::{MetricFamily, MetricType};
use std::sync::Arc;

const TEST_GAUGES: &[GaugeDefinition] = &[
    GaugeDefinition {
        id: 1,
        name: "latency_average_seconds",
        desc: "Average latency.",
        key: "latency",
    },
    GaugeDefinition {
        id: 2,
        name: "qsize",
        desc: "Queue size.",
        key: "qsize-q",
    },
];

const TEST_COUNTERS: &[CounterDefinition] = &[CounterDefinition {
    id: 1,
    name: "incoming_queries_total",
    desc: "Total number of incoming queries by network.",
    label: "net",
    label_map: &[("questions", "udp"), ("tcp-questions", "tcp")],
}];

fn test_state() -> ExporterState {
    ExporterState::new(Selection {
        daemon_type: "authoritative".to_string(),
        variant: Some(ServerVariant::Authoritative),
        catalog: Catalog {
            gauges: TEST_GAUGES,
            counters: TEST_COUNTERS,
        },
    })
    .unwrap()
}

fn entries(stats: &[(&str, f64)]) -> Vec<StatsEntry> {
    stats
        .iter()
        .map(|(name, value)| StatsEntry {
            name: name.to_string(),
            kind: "StatisticItem".to_string(),
            value: Some(*value),
        })
        .collect()
}

fn family<'a>(families: &'a [MetricFamily], name: &str) -> Option<&'a MetricFamily> {
    families.iter().find(|f| f.get_name() == name)
}

fn names(families: &[MetricFamily]) -> Vec<&str> {
    families.iter().map(|f| f.get_name()).collect()
}

fn full_recursor_stats() -> Vec<StatsEntry> {
    let mut stats: Vec<(&str, f64)> = vec![
        ("qa-latency", 2500.0),
        ("concurrent-queries", 3.0),
        ("cache-entries", 1000.0),
        ("questions", 100.0),
        ("tcp-questions", 5.0),
        ("all-outqueries", 80.0),
        ("tcp-outqueries", 2.0),
        ("cache-hits", 60.0),
        ("cache-misses", 40.0),
        ("servfail-answers", 1.0),
        ("nxdomain-answers", 2.0),
        ("noerror-answers", 97.0),
        ("resource-limits", 0.0),
        ("over-capacity-drops", 0.0),
        ("unreachables", 1.0),
        ("outgoing-timeouts", 4.0),
    ];
    stats.extend(RESPONSE_TIME_BUCKETS.iter().map(|b| (b.key, 20.0)));
    entries(&stats)
}

#[test]
fn test_descs_cover_catalog() {
    let state = test_state();
    // 2 gauges + 1 counter + up, total scrapes, parse failures
    assert_eq!(state.descs().len(), 6);

    let recursor = ExporterState::new(select_catalog("recursor")).unwrap();
    // 3 gauges + 6 counters + histogram + housekeeping
    assert_eq!(recursor.descs().len(), 13);
}

#[test]
fn test_fetch_failure_emits_housekeeping_only() {
    let state = test_state();
    let families = state.run_cycle(|| Err(FetchError::TaskDropped));

    assert_eq!(
        names(&families),
        vec![
            "powerdns_authoritative_up",
            "powerdns_authoritative_exporter_total_scrapes",
            "powerdns_authoritative_exporter_json_parse_failures",
        ]
    );
    assert_eq!(state.up(), 0);
    assert_eq!(state.total_scrapes(), 1);
    assert_eq!(state.json_parse_failures(), 1);

    let up = family(&families, "powerdns_authoritative_up").unwrap();
    assert_eq!(up.get_metric()[0].get_gauge().value(), 0.0);
}

#[test]
fn test_empty_statistics_emit_housekeeping_only() {
    let state = test_state();
    let families = state.run_cycle(|| Ok(Vec::new()));

    assert_eq!(families.len(), 3);
    assert_eq!(state.up(), 1);
    assert_eq!(state.total_scrapes(), 1);
    assert_eq!(state.json_parse_failures(), 0);

    let up = family(&families, "powerdns_authoritative_up").unwrap();
    assert_eq!(up.get_metric()[0].get_gauge().value(), 1.0);
}

#[test]
fn test_missing_counter_key_skips_one_series() {
    let state = test_state();
    let families = state.run_cycle(|| Ok(entries(&[("latency", 0.0), ("qsize-q", 0.0), ("questions", 42.0)])));

    let incoming = family(&families, "powerdns_authoritative_incoming_queries_total").unwrap();
    assert_eq!(incoming.get_field_type(), MetricType::COUNTER);
    assert_eq!(incoming.get_metric().len(), 1);

    let series = &incoming.get_metric()[0];
    assert_eq!(series.get_label()[0].get_name(), "net");
    assert_eq!(series.get_label()[0].get_value(), "udp");
    assert_eq!(series.get_counter().value(), 42.0);

    assert_eq!(state.json_parse_failures(), 1);
    assert_eq!(state.up(), 1);
}

#[test]
fn test_counter_with_no_present_keys_emits_nothing() {
    let state = test_state();
    let families = state.run_cycle(|| Ok(entries(&[("latency", 0.0), ("qsize-q", 0.0)])));

    assert!(family(&families, "powerdns_authoritative_incoming_queries_total").is_none());
    assert_eq!(state.json_parse_failures(), 2);
}

#[test]
fn test_latency_gauge_converted_to_seconds() {
    let state = test_state();
    let families = state.run_cycle(|| Ok(entries(&[("latency", 2500.0), ("qsize-q", 7.0)])));

    let latency = family(&families, "powerdns_authoritative_latency_average_seconds").unwrap();
    assert_eq!(latency.get_field_type(), MetricType::GAUGE);
    assert_eq!(latency.get_metric()[0].get_gauge().value(), 0.0025);

    let qsize = family(&families, "powerdns_authoritative_qsize").unwrap();
    assert_eq!(qsize.get_metric()[0].get_gauge().value(), 7.0);
}

#[test]
fn test_missing_gauge_key_not_emitted() {
    let state = test_state();
    let families = state.run_cycle(|| Ok(entries(&[("qsize-q", 7.0), ("questions", 1.0), ("tcp-questions", 1.0)])));

    assert!(family(&families, "powerdns_authoritative_latency_average_seconds").is_none());
    assert!(family(&families, "powerdns_authoritative_qsize").is_some());
    assert_eq!(state.json_parse_failures(), 1);
}

#[test]
fn test_counters_accumulate_across_cycles() {
    let state = test_state();

    state.run_cycle(|| Err(FetchError::TaskDropped));
    assert_eq!(state.up(), 0);

    state.run_cycle(|| Ok(entries(&[("latency", 1.0)])));
    assert_eq!(state.up(), 1);
    assert_eq!(state.total_scrapes(), 2);
    // fetch failure + qsize-q + questions + tcp-questions
    assert_eq!(state.json_parse_failures(), 4);
}

#[test]
fn test_recursor_full_cycle() {
    let state = ExporterState::new(select_catalog("recursor")).unwrap();
    let families = state.run_cycle(|| Ok(full_recursor_stats()));

    assert_eq!(state.json_parse_failures(), 0);
    // 3 gauges + 6 counters + histogram + housekeeping
    assert_eq!(families.len(), 13);

    let latency = family(&families, "powerdns_recursor_latency_average_seconds").unwrap();
    assert_eq!(latency.get_metric()[0].get_gauge().value(), 0.0025);

    let rtime = family(&families, "powerdns_recursor_answers_rtime_total").unwrap();
    assert_eq!(rtime.get_metric().len(), 5);

    let histogram = family(&families, "powerdns_recursor_response_time_seconds").unwrap();
    assert_eq!(histogram.get_field_type(), MetricType::HISTOGRAM);
    let proto = histogram.get_metric()[0].get_histogram();
    assert_eq!(proto.get_sample_count(), 100);
    assert_eq!(proto.get_bucket().len(), 4);
    assert_eq!(proto.get_bucket()[3].get_cumulative_count(), 80);
}

#[test]
fn test_recursor_missing_histogram_key_keeps_other_metrics() {
    let state = ExporterState::new(select_catalog("recursor")).unwrap();
    let stats: Vec<StatsEntry> = full_recursor_stats()
        .into_iter()
        .filter(|e| e.name != "answers-slow")
        .collect();
    let families = state.run_cycle(|| Ok(stats));

    assert!(family(&families, "powerdns_recursor_response_time_seconds").is_none());
    assert!(family(&families, "powerdns_recursor_incoming_queries_total").is_some());

    let rtime = family(&families, "powerdns_recursor_answers_rtime_total").unwrap();
    assert_eq!(rtime.get_metric().len(), 4);
    // counted once, for the answers_rtime_total series
    assert_eq!(state.json_parse_failures(), 1);
}

#[test]
fn test_authoritative_has_no_histogram() {
    let state = test_state();
    let mut stats: Vec<(&str, f64)> = RESPONSE_TIME_BUCKETS.iter().map(|b| (b.key, 1.0)).collect();
    stats.push(("latency", 1.0));
    let families = state.run_cycle(|| Ok(entries(&stats)));

    assert!(families
        .iter()
        .all(|f| f.get_field_type() != MetricType::HISTOGRAM));
}

#[test]
fn test_unknown_daemon_housekeeping_only() {
    let state = ExporterState::new(select_catalog("my-daemon")).unwrap();
    assert_eq!(state.subsystem(), "my_daemon");

    let families = state.run_cycle(|| Ok(entries(&[("questions", 1.0)])));
    assert_eq!(
        names(&families),
        vec![
            "powerdns_my_daemon_up",
            "powerdns_my_daemon_exporter_total_scrapes",
            "powerdns_my_daemon_exporter_json_parse_failures",
        ]
    );
}

#[test]
fn test_concurrent_cycles_serialize() {
    let state = Arc::new(test_state());

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let state = Arc::clone(&state);
            scope.spawn(move || {
                for _ in 0..10 {
                    let families = state.run_cycle(|| {
                        Ok(entries(&[
                            ("latency", 1.0),
                            ("qsize-q", 1.0),
                            ("questions", 1.0),
                            ("tcp-questions", 1.0),
                        ]))
                    });
                    assert_eq!(families.len(), 6);
                }
            });
        }
    });

    assert_eq!(state.total_scrapes(), 80);
    assert_eq!(state.json_parse_failures(), 0);
}
