//! Handlers for product classification maintenance.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::engine::classification::classify_all_products;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Re-run shipping-unit classification over the whole product catalog.
///
/// Called after a product sync or after operators adjust shipping-unit
/// windows. Idempotent; returns per-status counters for the sweep.
pub async fn classify(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let stats = classify_all_products(&state.pool).await?;
    Ok(Json(DataResponse { data: stats }))
}
