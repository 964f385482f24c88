// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! pdns_exporter - Prometheus exporter for PowerDNS
//!
//! Periodically reads the statistics of a PowerDNS authoritative server,
//! recursor or dnsdist through its HTTP API and republishes them as
//! Prometheus gauges, counters and a response time histogram.
//!
//! # Features
//!
//! - Declarative per-daemon metric catalogs
//! - Labelled counters fanned out from related statistics
//! - Cumulative response time histogram for the recursor
//! - `up`, scrape and parse-failure health metrics
//!
//! # Usage
//!
//! ## As a Library
//!
//! ```rust,no_run
//! use pdns_exporter::{client::PdnsClient, collector::Exporter, selector::identify_server};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let url = url::Url::parse("http://localhost:8001/")?;
//!     let client = PdnsClient::new(url, "secret", Duration::from_secs(5))?;
//!
//!     let (info, selection) = identify_server(&client).await?;
//!     println!("PowerDNS {} {}", info.daemon_type, info.version);
//!
//!     let registry = prometheus::Registry::new();
//!     let exporter = Exporter::new(selection, client, tokio::runtime::Handle::current())?;
//!     registry.register(Box::new(exporter))?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Building Metrics from a Snapshot
//!
//! ```rust
//! use pdns_exporter::histogram::build_response_time_histogram;
//! use pdns_exporter::StatisticsSnapshot;
//!
//! let snapshot: StatisticsSnapshot = [
//!     ("answers0-1", 10.0),
//!     ("answers1-10", 5.0),
//!     ("answers10-100", 0.0),
//!     ("answers100-1000", 0.0),
//!     ("answers-slow", 2.0),
//! ]
//! .into_iter()
//! .collect();
//!
//! let histogram = build_response_time_histogram(&snapshot).unwrap();
//! assert_eq!(histogram.count, 17);
//! ```
//!
//! ## As a Binary
//!
//! ```bash
//! pdns_exporter --api-url http://localhost:8001/ --api-key secret
//! ```

pub mod catalog;
pub mod client;
pub mod collector;
pub mod config;
pub mod histogram;
pub mod metrics;
pub mod selector;
pub mod server;
pub mod types;

// Catalog types
pub use catalog::{catalog_for, Catalog, CounterDefinition, GaugeDefinition, ServerVariant};

// Collection
pub use collector::{Exporter, ExporterState};

// Wire types and errors
pub use types::{
    ExporterError, FetchError, HistogramError, ServerInfo, StatisticsSnapshot, StatsEntry,
};

#[cfg(test)]
mod collector_test;
#[cfg(test)]
mod types_test;
