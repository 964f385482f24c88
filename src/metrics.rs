// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus plumbing for pdns_exporter
//!
//! This module provides:
//! - Metric naming under the `powerdns` namespace
//! - Builders for constant counter and histogram families, rebuilt every scrape
//! - Text encoding of a registry for the metrics endpoint

use prometheus::proto::{Bucket, Counter, Histogram, LabelPair, Metric, MetricFamily, MetricType};
use prometheus::{Encoder, Registry, TextEncoder};

/// Namespace of every exported metric
pub const NAMESPACE: &str = "powerdns";

/// Build a fully qualified metric name: `powerdns_<subsystem>_<name>`
pub fn fq_name(subsystem: &str, name: &str) -> String {
    if subsystem.is_empty() {
        format!("{}_{}", NAMESPACE, name)
    } else {
        format!("{}_{}_{}", NAMESPACE, subsystem, name)
    }
}

/// Reduce a daemon type to characters valid in a metric name
pub fn sanitize_subsystem(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn label_pair(name: &str, value: &str) -> LabelPair {
    let mut pair = LabelPair::default();
    pair.set_name(name.to_string());
    pair.set_value(value.to_string());
    pair
}

/// Build a counter family with one series per `(label_value, value)`
///
/// Returns `None` when there are no series; the text encoder rejects
/// families without metrics.
pub fn counter_family(
    name: &str,
    help: &str,
    label: &str,
    series: &[(&str, f64)],
) -> Option<MetricFamily> {
    if series.is_empty() {
        return None;
    }

    let metrics = series
        .iter()
        .map(|(label_value, value)| {
            let mut counter = Counter::default();
            counter.set_value(*value);

            let mut metric = Metric::default();
            metric.set_label(vec![label_pair(label, label_value)]);
            metric.set_counter(counter);
            metric
        })
        .collect();

    let mut family = MetricFamily::default();
    family.set_name(name.to_string());
    family.set_help(help.to_string());
    family.set_field_type(MetricType::COUNTER);
    family.set_metric(metrics);
    Some(family)
}

/// Build an unlabelled histogram family from precomputed cumulative buckets
pub fn histogram_family(
    name: &str,
    help: &str,
    buckets: &[(f64, u64)],
    count: u64,
    sum: f64,
) -> MetricFamily {
    let buckets = buckets
        .iter()
        .map(|(upper_bound, cumulative_count)| {
            let mut bucket = Bucket::default();
            bucket.set_upper_bound(*upper_bound);
            bucket.set_cumulative_count(*cumulative_count);
            bucket
        })
        .collect();

    let mut histogram = Histogram::default();
    histogram.set_sample_count(count);
    histogram.set_sample_sum(sum);
    histogram.set_bucket(buckets);

    let mut metric = Metric::default();
    metric.set_histogram(histogram);

    let mut family = MetricFamily::default();
    family.set_name(name.to_string());
    family.set_help(help.to_string());
    family.set_field_type(MetricType::HISTOGRAM);
    family.set_metric(vec![metric]);
    family
}

/// Generate metrics output in Prometheus text format
pub fn gather_metrics(
    registry: &Registry,
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
