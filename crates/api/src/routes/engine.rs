//! Route definitions for the advice engine.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::engine;
use crate::state::AppState;

/// Engine routes mounted at `/engine`.
///
/// ```text
/// POST /calculate          -> calculate
/// POST /apply-tags         -> apply_tags
/// POST /cache-invalidate   -> cache_invalidate
/// GET  /costs              -> costs
/// ```
pub fn engine_router() -> Router<AppState> {
    Router::new()
        .route("/calculate", post(engine::calculate))
        .route("/apply-tags", post(engine::apply_tags))
        .route("/cache-invalidate", post(engine::cache_invalidate))
        .route("/costs", get(engine::costs))
}
