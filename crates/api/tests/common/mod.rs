//! Shared helpers for API integration tests.
//!
//! `build_test_app` mirrors the router construction in `main.rs` so tests
//! exercise the same middleware stack (CORS, request ID, timeout, tracing,
//! panic recovery) that production uses. The tariff source is unreachable
//! and the WMS unconfigured: the engine must degrade, never fail.

#![allow(dead_code)] // each test binary uses its own subset of helpers

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use florapack_api::config::ServerConfig;
use florapack_api::engine::cost_provider::{AllCosts, CostProvider, TariffSource};
use florapack_api::engine::orchestrator::AdviceOrchestrator;
use florapack_api::router::build_app_router;
use florapack_api::state::AppState;
use florapack_api::wms::WmsClient;

/// Tariff source standing in for an unreachable tariff system.
struct UnreachableTariffs;

#[async_trait]
impl TariffSource for UnreachableTariffs {
    async fn fetch_all(&self) -> Option<AllCosts> {
        None
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        tariff_api_url: None,
        wms_api_url: None,
        wms_api_key: None,
    }
}

/// Build the full application router against the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let cost_provider = Arc::new(CostProvider::new(Box::new(UnreachableTariffs)));
    let wms = Arc::new(WmsClient::new(None, None));
    let orchestrator = Arc::new(AdviceOrchestrator::new(
        pool.clone(),
        Arc::clone(&cost_provider),
        wms,
    ));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        cost_provider,
        orchestrator,
    };

    build_app_router(state, &config)
}

/// GET a path and return the raw response.
pub async fn get(app: Router, path: &str) -> Response {
    app.oneshot(
        Request::builder()
            .uri(path)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// POST a JSON body to a path.
pub async fn post_json(app: Router, path: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// POST with an empty body.
pub async fn post_empty(app: Router, path: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(path)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Parse a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
