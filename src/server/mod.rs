//! Axum HTTP surface of the gateway.
//!
//! ## URL layout
//!
//! ```text
//! GET  /api/health                    — service + provider availability
//! GET  /api/map-service/detail-layer  — proxied Guland detail-layer lookup
//! POST /api/search                    — AI market search
//! POST /api/radar-score               — radar chart scoring
//! ```

mod api;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::AppError;
use crate::mapservice::MapServiceClient;
use crate::search::MarketSearch;

/// Axum router state injected into every handler via [`axum::extract::State`].
///
/// Cheap to clone — all fields are reference-counted.
#[derive(Clone)]
pub struct AppState {
    /// Service name used in health payloads.
    pub service: Arc<str>,
    pub map: MapServiceClient,
    pub search: Arc<MarketSearch>,
}

/// Assemble the router. Public so integration tests can drive the exact
/// production routing with `tower::ServiceExt::oneshot`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/map-service/detail-layer", get(api::detail_layer))
        .route("/api/search", post(api::search))
        .route("/api/radar-score", post(api::radar_score))
        .with_state(state)
}

/// Bind and serve until `shutdown` fires.
pub async fn serve(
    bind: &str,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let router = build_router(state);

    let listener = TcpListener::bind(bind)
        .await
        .map_err(|e| AppError::Server(format!("bind failed on {bind}: {e}")))?;

    info!(%bind, "gateway listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Server(format!("server error: {e}")))?;

    info!("gateway shut down");
    Ok(())
}
