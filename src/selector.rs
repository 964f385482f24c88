// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Catalog selection from server self-identification

use tracing::{info, warn};

use crate::catalog::{catalog_for, Catalog, ServerVariant};
use crate::client::PdnsClient;
use crate::metrics::sanitize_subsystem;
use crate::types::{ExporterError, ServerInfo};

/// Catalog chosen for the monitored daemon, fixed for the process lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// `daemon_type` as reported by the server
    pub daemon_type: String,
    /// `None` for daemon types this exporter does not know
    pub variant: Option<ServerVariant>,
    pub catalog: Catalog,
}

impl Selection {
    /// Metric subsystem: the daemon type, reduced to valid name characters
    pub fn subsystem(&self) -> String {
        sanitize_subsystem(&self.daemon_type)
    }

    pub fn is_recursor(&self) -> bool {
        self.variant == Some(ServerVariant::Recursor)
    }
}

/// Resolve a daemon type to its catalog
///
/// Unknown daemon types select empty tables; the exporter then only serves
/// its housekeeping metrics.
pub fn select_catalog(daemon_type: &str) -> Selection {
    let variant = daemon_type.parse::<ServerVariant>().ok();
    let catalog = variant.map(catalog_for).unwrap_or(Catalog::EMPTY);

    if variant.is_none() {
        warn!(
            "unknown PowerDNS daemon type '{}', only exporter health metrics will be served",
            daemon_type
        );
    }

    Selection {
        daemon_type: daemon_type.to_string(),
        variant,
        catalog,
    }
}

/// Query `servers/localhost` and select the catalog for the reported daemon
///
/// # Errors
/// Fails if the server cannot be reached or its answer cannot be decoded;
/// there is no usable exporter without knowing the daemon type.
pub async fn identify_server(
    client: &PdnsClient,
) -> Result<(ServerInfo, Selection), ExporterError> {
    let info = client.server_info().await?;
    info!(
        "detected PowerDNS {} {} at {}",
        info.daemon_type,
        info.version,
        client.base_url()
    );
    let selection = select_catalog(&info.daemon_type);
    Ok((info, selection))
}
