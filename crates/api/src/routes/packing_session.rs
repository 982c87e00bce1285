//! Route definitions for packing-session outcome tracking.

use axum::routing::post;
use axum::Router;

use crate::handlers::packing_session;
use crate::state::AppState;

/// Packing-session routes mounted at `/packing-sessions`.
///
/// ```text
/// POST /{id}/record-outcome -> record_outcome
/// ```
pub fn packing_session_router() -> Router<AppState> {
    Router::new().route("/{id}/record-outcome", post(packing_session::record_outcome))
}
