//! End-to-end tests for the detail-layer proxy route.
//!
//! The full production router is driven with `tower::ServiceExt::oneshot`
//! against a mock upstream, so envelope shapes and status mapping are
//! exercised exactly as the front-end sees them.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use httpmock::prelude::*;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use dinhgia_gateway::config::{
    PerplexityProviderConfig, ProxyProviderConfig, SearchConfig, UpstreamConfig,
};
use dinhgia_gateway::mapservice::MapServiceClient;
use dinhgia_gateway::search::MarketSearch;
use dinhgia_gateway::server::{build_router, AppState};

/// Search config with both providers unavailable — these tests never search.
fn search_config_disabled() -> SearchConfig {
    SearchConfig {
        prompts_dir: PathBuf::from("config/prompts"),
        max_tokens: 500,
        temperature: 0.2,
        proxy: ProxyProviderConfig {
            enabled: false,
            api_base_url: String::new(),
            model: "test-model".into(),
            timeout_seconds: 1,
            api_key: None,
        },
        perplexity: PerplexityProviderConfig {
            enabled: false,
            api_base_url: String::new(),
            model: "test-model".into(),
            timeout_seconds: 1,
            api_key: None,
        },
    }
}

fn state_for(upstream_base_url: &str) -> AppState {
    let upstream = UpstreamConfig {
        base_url: upstream_base_url.to_string(),
        timeout_seconds: 2,
    };
    AppState {
        service: Arc::from("dinhgia-gateway-test"),
        map: MapServiceClient::new(&upstream).unwrap(),
        search: Arc::new(MarketSearch::from_config(&search_config_disabled()).unwrap()),
    }
}

async fn get_json(state: AppState, uri: &str) -> (StatusCode, Value) {
    let response = build_router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

#[tokio::test]
async fn test_missing_id_is_rejected() {
    let state = state_for("http://127.0.0.1:1");

    let (status, body) = get_json(state, "/api/map-service/detail-layer").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Missing id parameter"));
}

#[tokio::test]
async fn test_empty_id_is_rejected() {
    let state = state_for("http://127.0.0.1:1");

    let (status, body) = get_json(state, "/api/map-service/detail-layer?id=").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Missing id parameter"));
}

#[tokio::test]
async fn test_json_body_passes_through() {
    let server = MockServer::start();
    let upstream = server.mock(|when, then| {
        when.method(GET)
            .path("/map-service/detail-layer")
            .query_param("id", "4281");
        then.status(200).json_body(json!({
            "success": true,
            "data": {"id": 4281, "name": "Quy hoạch 2030"}
        }));
    });
    let state = state_for(&server.base_url());

    let (status, body) = get_json(state, "/api/map-service/detail-layer?id=4281").await;

    upstream.assert();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["id"], json!(4281));
}

#[tokio::test]
async fn test_html_body_is_wrapped() {
    let server = MockServer::start();
    let upstream = server.mock(|when, then| {
        when.method(GET).path("/map-service/detail-layer");
        then.status(200)
            .header("content-type", "text/html")
            .body("<html><body>Đăng nhập</body></html>");
    });
    let state = state_for(&server.base_url());

    let (status, body) = get_json(state, "/api/map-service/detail-layer?id=9").await;

    upstream.assert();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["status"], json!(200));
    assert!(body["html"].as_str().unwrap().contains("Đăng nhập"));
}

#[tokio::test]
async fn test_upstream_error_maps_to_bad_gateway() {
    let server = MockServer::start();
    let upstream = server.mock(|when, then| {
        when.method(GET).path("/map-service/detail-layer");
        then.status(500).body("internal error");
    });
    let state = state_for(&server.base_url());

    let (status, body) = get_json(state, "/api/map-service/detail-layer?id=9").await;

    upstream.assert();
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Upstream detail-layer error"));
    assert_eq!(body["status"], json!(500));
}

#[tokio::test]
async fn test_unreachable_upstream_is_internal_error() {
    // Port 1 is never listening — the connect fails immediately.
    let state = state_for("http://127.0.0.1:1");

    let (status, body) = get_json(state, "/api/map-service/detail-layer?id=9").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Internal server error"));
}

#[tokio::test]
async fn test_health_reports_service_and_providers() {
    let state = state_for("http://127.0.0.1:1");

    let (status, body) = get_json(state, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], json!("dinhgia-gateway-test"));
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["providers"]["proxy"], json!(false));
    assert_eq!(body["providers"]["perplexity"], json!(false));
    assert!(body["version"].as_str().is_some());
}
