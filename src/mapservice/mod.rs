//! Guland map-service upstream client.
//!
//! One thin GET proxy: the web front-end asks for a detail layer by id and
//! this client forwards the lookup to the FastAPI upstream, classifying the
//! reply so the handler can mirror the envelope contract the front-end
//! expects. The upstream occasionally serves HTML error pages with a 200
//! status — those are classified, not treated as transport failures.

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::UpstreamConfig;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    #[error("upstream request failed: {0}")]
    Transport(String),
}

/// Classified upstream reply for a detail-layer lookup.
#[derive(Debug)]
pub enum DetailLayerReply {
    /// Success status with a JSON body — passed through verbatim.
    Json(Value),
    /// Success status but the body is not JSON (typically an HTML error page).
    NonJson { status: u16, body: String },
    /// Upstream answered with a non-success status.
    Failed { status: u16 },
}

/// Cheap to clone — `reqwest::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct MapServiceClient {
    client: Client,
    base_url: String,
}

impl MapServiceClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| UpstreamError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch `/map-service/detail-layer?id=<id>` from the upstream.
    pub async fn detail_layer(&self, id: &str) -> Result<DetailLayerReply, UpstreamError> {
        let url = format!("{}/map-service/detail-layer", self.base_url);
        debug!(%id, %url, "fetching detail layer");

        let response = self
            .client
            .get(&url)
            .query(&[("id", id)])
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read error body>".to_string());
            warn!(
                status = status.as_u16(),
                body_len = body.len(),
                "detail-layer upstream returned error status"
            );
            return Ok(DetailLayerReply::Failed {
                status: status.as_u16(),
            });
        }

        let status = status.as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        match serde_json::from_str::<Value>(&body) {
            Ok(value) => Ok(DetailLayerReply::Json(value)),
            Err(_) => {
                warn!(
                    status,
                    body_len = body.len(),
                    "detail-layer returned a non-JSON body"
                );
                Ok(DetailLayerReply::NonJson { status, body })
            }
        }
    }
}
