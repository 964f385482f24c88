// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP surface of the exporter
//!
//! Serves the Prometheus registry on the configured metrics path, plus a
//! landing page and a liveness probe. Every scrape of the metrics path runs
//! one collection cycle against PowerDNS.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use prometheus::Registry;
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::{metrics, types::ErrorResponse};

/// Routes reserved by the exporter itself
pub const RESERVED_ROUTES: &[&str] = &["/", "/health"];

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Registry holding the PowerDNS collector
    pub registry: Registry,
    /// Path the metrics are served on
    pub metrics_path: String,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Landing page linking to the metrics
async fn landing_page(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>\n\
         <head><title>PowerDNS Exporter</title></head>\n\
         <body>\n\
         <h1>PowerDNS Exporter</h1>\n\
         <p><a href='{}'>Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        state.metrics_path
    ))
}

fn gather_error(message: String) -> Response {
    error!("{}", message);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message,
            details: None,
        }),
    )
        .into_response()
}

/// Metrics endpoint for Prometheus scraping
///
/// Gathering blocks on the statistics fetch, so it runs on the blocking pool.
async fn metrics_handler(State(state): State<AppState>) -> Response {
    let registry = state.registry.clone();
    let gathered = tokio::task::spawn_blocking(move || metrics::gather_metrics(&registry)).await;

    match gathered {
        Ok(Ok(metrics_text)) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; version=0.0.4")],
            metrics_text,
        )
            .into_response(),
        Ok(Err(e)) => gather_error(format!("Failed to gather metrics: {}", e)),
        Err(e) => gather_error(format!("Metrics task failed: {}", e)),
    }
}

/// Build the exporter router
pub fn router(state: AppState) -> Router {
    let metrics_path = state.metrics_path.clone();
    Router::new()
        .route("/", get(landing_page))
        .route("/health", get(health_check))
        .route(&metrics_path, get(metrics_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
