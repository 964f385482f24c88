// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Collection cycle
//!
//! [`ExporterState`] owns everything that survives between scrapes: the
//! selected catalog, one persistent gauge per gauge definition, and the
//! housekeeping metrics (`up`, total scrapes, JSON parse failures).
//! [`ExporterState::run_cycle`] turns one statistics fetch into metric
//! families. [`Exporter`] plugs that cycle into a `prometheus::Registry`.
//!
//! A cycle either aborts (fetch or decode failure, empty statistics) and
//! reports housekeeping metrics only, or walks every definition. Missing
//! statistics are logged and counted as parse failures without stopping the
//! cycle.

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Gauge, IntCounter, IntGauge, Opts};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, error, warn};

use crate::client::PdnsClient;
use crate::histogram::{build_response_time_histogram, RESPONSE_TIME_HELP, RESPONSE_TIME_METRIC};
use crate::metrics::{self, NAMESPACE};
use crate::selector::Selection;
use crate::types::{ExporterError, FetchError, StatisticsSnapshot, StatsEntry};

/// Per-endpoint exporter state
pub struct ExporterState {
    selection: Selection,
    subsystem: String,

    up: IntGauge,
    total_scrapes: IntCounter,
    json_parse_failures: IntCounter,

    /// Index-aligned with `selection.catalog.gauges`
    gauges: Vec<Gauge>,
    /// Index-aligned with `selection.catalog.counters`
    counter_descs: Vec<Desc>,
    histogram_desc: Option<Desc>,

    /// Serializes collection cycles
    cycle: Mutex<()>,
}

impl ExporterState {
    /// Build the metric objects for a catalog selection
    pub fn new(selection: Selection) -> Result<Self, prometheus::Error> {
        let subsystem = selection.subsystem();
        let opts = |name: &str, help: &str| {
            Opts::new(name, help)
                .namespace(NAMESPACE)
                .subsystem(subsystem.as_str())
        };

        let up = IntGauge::with_opts(opts("up", "Was the last scrape of PowerDNS successful."))?;
        let total_scrapes = IntCounter::with_opts(opts(
            "exporter_total_scrapes",
            "Current total PowerDNS scrapes.",
        ))?;
        let json_parse_failures = IntCounter::with_opts(opts(
            "exporter_json_parse_failures",
            "Number of errors while parsing PowerDNS JSON stats.",
        ))?;

        let gauges = selection
            .catalog
            .gauges
            .iter()
            .map(|def| Gauge::with_opts(opts(def.name, def.desc)))
            .collect::<Result<Vec<_>, _>>()?;

        let counter_descs = selection
            .catalog
            .counters
            .iter()
            .map(|def| {
                Desc::new(
                    metrics::fq_name(&subsystem, def.name),
                    def.desc.to_string(),
                    vec![def.label.to_string()],
                    HashMap::new(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let histogram_desc = if selection.is_recursor() {
            Some(Desc::new(
                metrics::fq_name(&subsystem, RESPONSE_TIME_METRIC),
                RESPONSE_TIME_HELP.to_string(),
                vec![],
                HashMap::new(),
            )?)
        } else {
            None
        };

        Ok(Self {
            selection,
            subsystem,
            up,
            total_scrapes,
            json_parse_failures,
            gauges,
            counter_descs,
            histogram_desc,
            cycle: Mutex::new(()),
        })
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn subsystem(&self) -> &str {
        &self.subsystem
    }

    /// Health of the most recent cycle, 1 or 0
    pub fn up(&self) -> i64 {
        self.up.get()
    }

    pub fn total_scrapes(&self) -> u64 {
        self.total_scrapes.get()
    }

    pub fn json_parse_failures(&self) -> u64 {
        self.json_parse_failures.get()
    }

    /// Descriptors of every metric this state can ever emit
    pub fn descs(&self) -> Vec<&Desc> {
        let mut descs: Vec<&Desc> = Vec::new();
        for gauge in &self.gauges {
            descs.extend(gauge.desc());
        }
        descs.extend(self.counter_descs.iter());
        descs.extend(self.histogram_desc.iter());
        descs.extend(self.up.desc());
        descs.extend(self.total_scrapes.desc());
        descs.extend(self.json_parse_failures.desc());
        descs
    }

    /// Run one collection cycle
    ///
    /// `fetch` is invoked exactly once, with the cycle lock held, so
    /// concurrent scrapes wait for each other instead of interleaving.
    pub fn run_cycle<F>(&self, fetch: F) -> Vec<MetricFamily>
    where
        F: FnOnce() -> Result<Vec<StatsEntry>, FetchError>,
    {
        let _guard = self.cycle.lock().unwrap_or_else(PoisonError::into_inner);
        self.total_scrapes.inc();

        let mut families = Vec::new();
        match fetch() {
            Ok(entries) => {
                self.up.set(1);
                let snapshot = StatisticsSnapshot::from_entries(entries);
                if snapshot.is_empty() {
                    warn!("PowerDNS returned no statistics");
                } else {
                    families = self.collect_snapshot(&snapshot);
                }
            }
            Err(e) => {
                self.up.set(0);
                self.json_parse_failures.inc();
                error!("Error scraping PowerDNS: {}", e);
            }
        }

        families.extend(self.up.collect());
        families.extend(self.total_scrapes.collect());
        families.extend(self.json_parse_failures.collect());
        families
    }

    fn collect_snapshot(&self, snapshot: &StatisticsSnapshot) -> Vec<MetricFamily> {
        let catalog = self.selection.catalog;
        let mut families = Vec::new();

        for (def, gauge) in catalog.gauges.iter().zip(&self.gauges) {
            match snapshot.get(def.key) {
                Some(raw) => {
                    gauge.set(def.scale(raw));
                    families.extend(gauge.collect());
                }
                None => self.missing_key(def.key),
            }
        }

        for (def, desc) in catalog.counters.iter().zip(&self.counter_descs) {
            let mut series = Vec::with_capacity(def.label_map.len());
            for (key, label_value) in def.label_map {
                match snapshot.get(key) {
                    Some(value) => series.push((*label_value, value)),
                    None => self.missing_key(key),
                }
            }
            families.extend(metrics::counter_family(
                &desc.fq_name,
                &desc.help,
                def.label,
                &series,
            ));
        }

        if let Some(desc) = &self.histogram_desc {
            match build_response_time_histogram(snapshot) {
                Ok(histogram) => {
                    families.push(histogram.to_metric_family(&desc.fq_name, &desc.help));
                }
                Err(e) => warn!("Could not create response time histogram: {}", e),
            }
        }

        debug!(
            "collected {} metric families from {} statistics",
            families.len(),
            snapshot.len()
        );
        families
    }

    fn missing_key(&self, key: &str) {
        warn!("Expected PowerDNS stats key not found: {}", key);
        self.json_parse_failures.inc();
    }
}

/// Prometheus collector scraping one PowerDNS endpoint
///
/// `collect` hands the statistics fetch to the tokio runtime and blocks on
/// the result, so the registry must be gathered off the async executor
/// (e.g. in `spawn_blocking`).
pub struct Exporter {
    state: Arc<ExporterState>,
    client: PdnsClient,
    runtime: Handle,
}

impl Exporter {
    /// Create an exporter for an identified server
    pub fn new(
        selection: Selection,
        client: PdnsClient,
        runtime: Handle,
    ) -> Result<Self, ExporterError> {
        Ok(Self {
            state: Arc::new(ExporterState::new(selection)?),
            client,
            runtime,
        })
    }

    pub fn state(&self) -> Arc<ExporterState> {
        Arc::clone(&self.state)
    }

    fn fetch_statistics(&self) -> Result<Vec<StatsEntry>, FetchError> {
        let (tx, rx) = oneshot::channel();
        let client = self.client.clone();
        self.runtime.spawn(async move {
            let _ = tx.send(client.statistics().await);
        });
        rx.blocking_recv()
            .unwrap_or_else(|_| Err(FetchError::TaskDropped))
    }
}

impl Collector for Exporter {
    fn desc(&self) -> Vec<&Desc> {
        self.state.descs()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        self.state.run_cycle(|| self.fetch_statistics())
    }
}
