// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! PowerDNS Prometheus exporter
//!
//! Identifies the PowerDNS daemon behind the configured API URL once at
//! startup, then republishes its statistics on every Prometheus scrape.

use anyhow::Context;
use clap::Parser;
use prometheus::Registry;
use tokio::runtime::Handle;
use tracing::{error, info};

use pdns_exporter::{
    client::PdnsClient,
    collector::Exporter,
    config::{Cli, LogFormat},
    selector::identify_server,
    server::{self, AppState, RESERVED_ROUTES},
};

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    info!("starting powerdns exporter v{}", env!("CARGO_PKG_VERSION"));

    let api_url = cli
        .api_base_url()
        .with_context(|| format!("error parsing api-url '{}'", cli.api_url))?;
    let listen_addr = cli
        .listen_socket_addr()
        .with_context(|| format!("error parsing listen-address '{}'", cli.listen_address))?;
    let metrics_path = cli.metrics_route();
    if RESERVED_ROUTES.contains(&metrics_path.as_str()) {
        return Err(anyhow::anyhow!(
            "metric-path '{}' collides with a built-in route",
            metrics_path
        ));
    }

    let client = PdnsClient::new(api_url, cli.api_key.clone(), cli.api_timeout())
        .context("failed to create PowerDNS API client")?;

    let (_info, selection) = match identify_server(&client).await {
        Ok(identified) => identified,
        Err(e) => {
            error!("could not fetch PowerDNS server info: {}", e);
            return Err(e).context("server identification failed");
        }
    };

    let exporter = Exporter::new(selection, client, Handle::current())
        .context("failed to create exporter")?;
    let registry = Registry::new();
    registry
        .register(Box::new(exporter))
        .context("failed to register exporter")?;

    let app = server::router(AppState {
        registry,
        metrics_path: metrics_path.clone(),
    });

    info!("listening on {}", listen_addr);
    info!("metrics available at http://{}{}", listen_addr, metrics_path);

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    axum::serve(listener, app.into_make_service())
        .await
        .context("server error")?;

    Ok(())
}
