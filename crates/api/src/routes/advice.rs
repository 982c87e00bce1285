//! Route definitions for advice review.

use axum::routing::get;
use axum::Router;

use crate::handlers::advice;
use crate::state::AppState;

/// Advice routes mounted at `/advice`.
///
/// ```text
/// GET / -> list_for_review
/// ```
pub fn advice_router() -> Router<AppState> {
    Router::new().route("/", get(advice::list_for_review))
}
