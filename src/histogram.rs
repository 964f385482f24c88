// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Recursor response time histogram
//!
//! The recursor reports answer latency as five linear counters
//! (`answers0-1`, `answers1-10`, `answers10-100`, `answers100-1000` and
//! `answers-slow`). This module folds them into a cumulative Prometheus
//! histogram. `answers-slow` has no upper bound, so it only contributes to
//! the total count (and therefore the implicit `+Inf` bucket).

use prometheus::proto::MetricFamily;

use crate::metrics;
use crate::types::{HistogramError, StatisticsSnapshot};

/// Exported name of the histogram, below the `powerdns_recursor` prefix
pub const RESPONSE_TIME_METRIC: &str = "response_time_seconds";
pub const RESPONSE_TIME_HELP: &str = "Histogram of PowerDNS recursor response times in seconds.";

/// One raw latency slot reported by the recursor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseTimeBucket {
    /// Statistic name
    pub key: &'static str,
    /// Upper bound in seconds, `None` for the overflow slot
    pub upper_bound: Option<f64>,
    /// Label value used by the `answers_rtime_total` counter
    pub label: &'static str,
}

pub const RESPONSE_TIME_BUCKETS: [ResponseTimeBucket; 5] = [
    ResponseTimeBucket {
        key: "answers0-1",
        upper_bound: Some(0.001),
        label: "0_1ms",
    },
    ResponseTimeBucket {
        key: "answers1-10",
        upper_bound: Some(0.01),
        label: "1_10ms",
    },
    ResponseTimeBucket {
        key: "answers10-100",
        upper_bound: Some(0.1),
        label: "10_100ms",
    },
    ResponseTimeBucket {
        key: "answers100-1000",
        upper_bound: Some(1.0),
        label: "100_1000ms",
    },
    ResponseTimeBucket {
        key: "answers-slow",
        upper_bound: None,
        label: "over_1000ms",
    },
];

/// Statistic name to time slot label, for the `answers_rtime_total` counter
pub const RESPONSE_TIME_LABEL_MAP: &[(&str, &str)] = &[
    ("answers0-1", "0_1ms"),
    ("answers1-10", "1_10ms"),
    ("answers10-100", "10_100ms"),
    ("answers100-1000", "100_1000ms"),
    ("answers-slow", "over_1000ms"),
];

/// Cumulative response time distribution
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseTimeHistogram {
    /// `(upper_bound, cumulative_count)` in ascending bound order
    pub buckets: Vec<(f64, u64)>,
    /// Total observations, overflow slot included
    pub count: u64,
}

impl ResponseTimeHistogram {
    /// Build the histogram metric family; sample sum is not reported by PowerDNS
    pub fn to_metric_family(&self, name: &str, help: &str) -> MetricFamily {
        metrics::histogram_family(name, help, &self.buckets, self.count, 0.0)
    }
}

/// Fold the five raw latency counters into a cumulative histogram
///
/// # Errors
/// Returns [`HistogramError::MissingKey`] if any of the raw counters is absent
/// from the snapshot; a partial histogram is not a valid distribution.
pub fn build_response_time_histogram(
    snapshot: &StatisticsSnapshot,
) -> Result<ResponseTimeHistogram, HistogramError> {
    let mut linear = Vec::with_capacity(RESPONSE_TIME_BUCKETS.len());
    let mut count: u64 = 0;

    for bucket in &RESPONSE_TIME_BUCKETS {
        let value = snapshot
            .get(bucket.key)
            .ok_or_else(|| HistogramError::MissingKey(bucket.key.to_string()))?;
        let value = value as u64;
        if let Some(upper_bound) = bucket.upper_bound {
            linear.push((upper_bound, value));
        }
        count += value;
    }

    linear.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut cumulative = 0u64;
    let buckets = linear
        .into_iter()
        .map(|(upper_bound, value)| {
            cumulative += value;
            (upper_bound, cumulative)
        })
        .collect();

    Ok(ResponseTimeHistogram { buckets, count })
}
