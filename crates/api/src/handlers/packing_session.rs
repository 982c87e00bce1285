//! Handlers for packing-session outcome tracking.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use florapack_core::types::DbId;

use crate::engine::outcome::record_session_outcome;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Grade a completed packing session against its linked advice.
///
/// Responds with the classification, or `data: null` when the session never
/// carried an advice link (nothing to compare, not an error). Safe to
/// re-invoke: the outcome is recomputed from the same inputs.
pub async fn record_outcome(
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let result = record_session_outcome(&state.pool, session_id).await?;
    Ok(Json(DataResponse { data: result }))
}
