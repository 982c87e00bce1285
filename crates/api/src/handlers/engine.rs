//! Handlers for the advice engine endpoints: calculation, label
//! application, and cost-cache control.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use florapack_core::classification::OrderLine;
use florapack_core::costs::CountryCosts;
use florapack_core::types::DbId;

use crate::engine::orchestrator::CalculateInput;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Destination countries the operation ships to. Anything else is a typo or
/// an unsupported route and is rejected up front.
const VALID_COUNTRY_CODES: [&str; 9] = ["NL", "BE", "DE", "FR", "AT", "LU", "SE", "IT", "ES"];

/// Check a caller-supplied country code against the allow-list, returning
/// the canonical upper-case form.
fn validate_country_code(code: &str) -> Result<String, AppError> {
    let upper = code.trim().to_uppercase();
    if !VALID_COUNTRY_CODES.contains(&upper.as_str()) {
        return Err(AppError::BadRequest(format!(
            "country_code must be one of: {}",
            VALID_COUNTRY_CODES.join(", ")
        )));
    }
    Ok(upper)
}

// ---------------------------------------------------------------------------
// POST /engine/calculate — calculate and persist advice
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    pub order_id: DbId,
    pub picklist_id: Option<DbId>,
    pub products: Vec<OrderLine>,
    pub shipping_profile_id: Option<DbId>,
    pub country_code: Option<String>,
}

/// Calculate packaging advice for an order's product lines.
///
/// Soft degradations (unclassified products, no matching packaging,
/// unreachable tariff source) come back inside the advice payload, never as
/// an error status.
pub async fn calculate(
    State(state): State<AppState>,
    Json(body): Json<CalculateRequest>,
) -> AppResult<impl IntoResponse> {
    let country_code = body
        .country_code
        .as_deref()
        .map(validate_country_code)
        .transpose()?;

    let advice = state
        .orchestrator
        .calculate(CalculateInput {
            order_id: body.order_id,
            picklist_id: body.picklist_id,
            lines: body.products,
            shipping_profile_id: body.shipping_profile_id,
            country_code,
        })
        .await?;

    Ok(Json(DataResponse { data: advice }))
}

// ---------------------------------------------------------------------------
// POST /engine/apply-tags — write advice labels onto the order
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ApplyTagsRequest {
    pub order_id: DbId,
    pub advice_id: DbId,
}

/// Apply an advice's packaging labels to the order in the WMS.
///
/// The deliberate side-effecting counterpart of `calculate`; returns the
/// labels actually written.
pub async fn apply_tags(
    State(state): State<AppState>,
    Json(body): Json<ApplyTagsRequest>,
) -> AppResult<impl IntoResponse> {
    let tags_written = state
        .orchestrator
        .apply_tags(body.order_id, body.advice_id)
        .await?;
    Ok(Json(DataResponse { data: tags_written }))
}

// ---------------------------------------------------------------------------
// POST /engine/cache-invalidate — drop the cost cache
// ---------------------------------------------------------------------------

/// Invalidate the process-wide cost cache.
///
/// Called by the tariff system when it republishes rates. No body, no auth
/// (trusted internal network); the next lookup refetches.
pub async fn cache_invalidate(State(state): State<AppState>) -> StatusCode {
    state.cost_provider.invalidate().await;
    StatusCode::NO_CONTENT
}

// ---------------------------------------------------------------------------
// GET /engine/costs — country cost table for operators
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CostsQuery {
    pub country: String,
}

/// Cost table view: availability flag plus the per-SKU entries.
#[derive(Debug, Serialize)]
pub struct CountryCostsView {
    pub country: String,
    pub cost_data_available: bool,
    pub costs: CountryCosts,
}

/// The cached cost table for one destination country.
pub async fn costs(
    State(state): State<AppState>,
    Query(query): Query<CostsQuery>,
) -> AppResult<impl IntoResponse> {
    let country = validate_country_code(&query.country)?;
    let table = state.cost_provider.all_costs_for_country(&country).await;

    Ok(Json(DataResponse {
        data: CountryCostsView {
            country,
            cost_data_available: table.is_some(),
            costs: table.unwrap_or_default(),
        },
    }))
}
