// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command line and environment configuration

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

/// Default listen address, all interfaces
pub const DEFAULT_LISTEN_ADDRESS: &str = ":9120";
pub const DEFAULT_METRICS_PATH: &str = "/metrics";
pub const DEFAULT_API_URL: &str = "http://localhost:8001/";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Json,
    Text,
}

/// Prometheus exporter for PowerDNS
#[derive(Parser, Debug, Clone)]
#[command(name = "pdns_exporter", version, about)]
pub struct Cli {
    /// Address to listen on for web interface and telemetry
    #[arg(long, env = "PDNS_EXPORTER_LISTEN_ADDRESS", default_value = DEFAULT_LISTEN_ADDRESS)]
    pub listen_address: String,

    /// Path under which to expose metrics
    #[arg(long = "metric-path", env = "PDNS_EXPORTER_METRIC_PATH", default_value = DEFAULT_METRICS_PATH)]
    pub metrics_path: String,

    /// Base URL of the PowerDNS authoritative server/recursor API
    #[arg(long, env = "PDNS_EXPORTER_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// PowerDNS API key
    #[arg(long, env = "PDNS_EXPORTER_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// Connect and request timeout for the PowerDNS API, in seconds
    #[arg(long, env = "PDNS_EXPORTER_API_TIMEOUT", default_value_t = 5)]
    pub api_timeout: u64,

    /// Log output format
    #[arg(long, env = "PDNS_EXPORTER_LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,
}

impl Cli {
    /// Parse the API base URL
    pub fn api_base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.api_url)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout)
    }

    /// Resolve the listen address; a bare `:port` listens on all interfaces
    pub fn listen_socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        let addr = &self.listen_address;
        if addr.starts_with(':') {
            format!("0.0.0.0{}", addr).parse()
        } else {
            addr.parse()
        }
    }

    /// Metrics path with a leading slash
    pub fn metrics_route(&self) -> String {
        if self.metrics_path.starts_with('/') {
            self.metrics_path.clone()
        } else {
            format!("/{}", self.metrics_path)
        }
    }
}
