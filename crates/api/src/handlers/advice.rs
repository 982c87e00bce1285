//! Handlers for the advice review endpoint.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use florapack_core::advice::{Confidence, Outcome};
use florapack_db::repositories::AdviceRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Outcome filter value selecting advices whose outcome is not yet recorded.
const PENDING: &str = "pending";

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    pub confidence: Option<String>,
    pub outcome: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// List persisted advices for operational review, newest first.
///
/// `outcome=pending` selects rows still waiting for their packing session;
/// other outcome values filter on the recorded classification.
pub async fn list_for_review(
    State(state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> AppResult<impl IntoResponse> {
    if let Some(confidence) = query.confidence.as_deref() {
        if Confidence::parse(confidence).is_none() {
            return Err(AppError::BadRequest(format!(
                "unknown confidence filter '{confidence}'"
            )));
        }
    }
    if let Some(outcome) = query.outcome.as_deref() {
        if outcome != PENDING && Outcome::parse(outcome).is_none() {
            return Err(AppError::BadRequest(format!(
                "unknown outcome filter '{outcome}'"
            )));
        }
    }

    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    let advices = AdviceRepo::list_for_review(
        &state.pool,
        query.confidence.as_deref(),
        query.outcome.as_deref(),
        limit,
        offset,
    )
    .await?;

    Ok(Json(DataResponse { data: advices }))
}
