//! Route definitions for product classification maintenance.

use axum::routing::post;
use axum::Router;

use crate::handlers::products;
use crate::state::AppState;

/// Product routes mounted at `/products`.
///
/// ```text
/// POST /classify -> classify
/// ```
pub fn products_router() -> Router<AppState> {
    Router::new().route("/classify", post(products::classify))
}
