// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! PowerDNS HTTP API client
//!
//! Fetches JSON documents from the PowerDNS built-in webserver API,
//! authenticating with the `X-API-Key` header. Both the connection and the
//! whole request are bounded by the configured timeout; exceeding either
//! surfaces as [`FetchError::Network`].

use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::types::{ExporterError, FetchError, ServerInfo, StatsEntry};

/// Server self-identification endpoint
pub const API_INFO_ENDPOINT: &str = "servers/localhost";

/// Statistics endpoint
pub const API_STATS_ENDPOINT: &str = "servers/localhost/statistics";

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Connect and request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// PowerDNS API client
#[derive(Debug, Clone)]
pub struct PdnsClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl PdnsClient {
    /// Create a new API client
    ///
    /// # Arguments
    /// * `base_url` - API base URL (e.g., "http://localhost:8001/")
    /// * `api_key` - Value of the `X-API-Key` header, may be empty
    /// * `timeout` - Applied to both connection establishment and the full request
    pub fn new(
        base_url: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ExporterError> {
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(ExporterError::Client)?;

        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint path against the base URL
    pub fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        Ok(self.base_url.join(path)?)
    }

    /// GET an endpoint and decode its JSON body
    ///
    /// # Errors
    /// - [`FetchError::Network`] on connection failure or timeout
    /// - [`FetchError::HttpStatus`] on a non-2xx response, carrying the body text
    /// - [`FetchError::Decode`] if the body is not the expected JSON
    pub async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = self.endpoint(path)?;
        debug!("fetching {}", url);

        let network = |source: reqwest::Error| FetchError::Network {
            url: url.to_string(),
            source,
        };

        let response = self
            .http
            .get(url.clone())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        let body = response.bytes().await.map_err(network)?;

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).trim().to_string(),
            });
        }

        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Fetch server self-identification
    pub async fn server_info(&self) -> Result<ServerInfo, FetchError> {
        self.fetch_json(API_INFO_ENDPOINT).await
    }

    /// Fetch the raw statistics list
    pub async fn statistics(&self) -> Result<Vec<StatsEntry>, FetchError> {
        self.fetch_json(API_STATS_ENDPOINT).await
    }
}
