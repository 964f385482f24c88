// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common types and errors used throughout the pdns_exporter library

use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Server self-identification returned by the `servers/localhost` endpoint
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerInfo {
    /// Object kind, always "Server"
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Server id, "localhost" for the local daemon
    #[serde(default)]
    pub id: String,

    /// API URL of this server object
    #[serde(default)]
    pub url: String,

    /// Daemon type: "authoritative", "recursor" or "dnsdist"
    pub daemon_type: String,

    /// Daemon version string
    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub config_url: String,

    #[serde(default)]
    pub zones_url: String,
}

/// One record of the `servers/localhost/statistics` endpoint
///
/// PowerDNS reports scalar statistics as numeric strings. Map and ring
/// statistics carry an array instead; those decode with `value: None`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StatsEntry {
    pub name: String,

    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default, deserialize_with = "deserialize_stat_value")]
    pub value: Option<f64>,
}

fn deserialize_stat_value<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => Ok(n.as_f64()),
        serde_json::Value::String(s) => s.trim().parse::<f64>().map(Some).map_err(|_| {
            de::Error::custom(format!("invalid numeric statistic value: {:?}", s))
        }),
        _ => Ok(None),
    }
}

/// Name to value lookup built once per collection cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatisticsSnapshot {
    values: HashMap<String, f64>,
}

impl StatisticsSnapshot {
    /// Build a snapshot from decoded statistics entries
    ///
    /// Later entries win when a name repeats. Entries without a scalar
    /// value are skipped.
    pub fn from_entries(entries: Vec<StatsEntry>) -> Self {
        let mut values = HashMap::with_capacity(entries.len());
        for entry in entries {
            match entry.value {
                Some(value) => {
                    values.insert(entry.name, value);
                }
                None => debug!("skipping non-scalar statistic: {}", entry.name),
            }
        }
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for StatisticsSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

/// Failure talking to the PowerDNS API
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("PowerDNS API returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid API endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("Statistics fetch task ended without a result")]
    TaskDropped,
}

/// Failure building the response time histogram
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HistogramError {
    #[error("Required PowerDNS stats key not found: {0}")]
    MissingKey(String),
}

/// Failure constructing the exporter at startup
#[derive(Debug, thiserror::Error)]
pub enum ExporterError {
    #[error("Could not fetch PowerDNS server info: {0}")]
    Fetch(#[from] FetchError),

    #[error("Invalid metric definition: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
