//! Handlers for the `/api/*` routes.
//!
//! Response envelopes follow what the web front-end already consumes:
//! `success` is always present, `message` carries the human-readable error,
//! and the detail-layer route passes the upstream body through verbatim.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::mapservice::DetailLayerReply;
use crate::scoring::{CombinedResult, RadarSummary};
use crate::search::prompt::SearchQuery;

use super::AppState;

#[derive(Deserialize)]
pub(super) struct DetailLayerParams {
    id: Option<String>,
}

/// GET /api/health
pub(super) async fn health(State(state): State<AppState>) -> Response {
    let providers = state.search.provider_status();
    let body = json!({
        "service": &*state.service,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
        "providers": {
            "proxy": providers.proxy,
            "perplexity": providers.perplexity,
        },
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// GET /api/map-service/detail-layer?id=<id>
///
/// Thin proxy: success bodies are forwarded as-is, upstream failures are
/// wrapped in a `success: false` envelope that keeps the upstream status
/// visible to the caller.
pub(super) async fn detail_layer(
    State(state): State<AppState>,
    Query(params): Query<DetailLayerParams>,
) -> Response {
    let Some(id) = params.id.as_deref().filter(|id| !id.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "message": "Missing id parameter"})),
        )
            .into_response();
    };

    match state.map.detail_layer(id).await {
        Ok(DetailLayerReply::Json(value)) => (StatusCode::OK, Json(value)).into_response(),
        Ok(DetailLayerReply::NonJson { status, body }) => {
            // Upstream answered with HTML (login page, proxy error, ...).
            // Keep its status code so the caller can tell what happened.
            let code = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (
                code,
                Json(json!({"success": false, "html": body, "status": status})),
            )
                .into_response()
        }
        Ok(DetailLayerReply::Failed { status }) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({
                "success": false,
                "message": "Upstream detail-layer error",
                "status": status,
            })),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "detail-layer proxy failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"success": false, "message": "Internal server error"})),
            )
                .into_response()
        }
    }
}

/// POST /api/search
///
/// Runs the provider cascade and always answers 200 — an exhausted cascade
/// shows up as `success: false` with an empty report, not as an HTTP error.
pub(super) async fn search(
    State(state): State<AppState>,
    Json(query): Json<SearchQuery>,
) -> Response {
    let report = state.search.search(&query).await;
    let body = json!({
        "success": !report.text.is_empty(),
        "provider": report.provider.map(|p| p.tag()),
        "partial": report.partial,
        "report": report.text,
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// POST /api/radar-score
pub(super) async fn radar_score(Json(result): Json<CombinedResult>) -> Response {
    let summary = RadarSummary::from_result(&result);
    (StatusCode::OK, Json(summary)).into_response()
}
