pub mod advice;
pub mod engine;
pub mod health;
pub mod packing_session;
pub mod products;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /engine/calculate                        calculate + persist advice (POST)
/// /engine/apply-tags                       write advice labels to the order (POST)
/// /engine/cache-invalidate                 drop the cost cache (POST)
/// /engine/costs?country=DE                 country cost table (GET)
///
/// /products/classify                       re-run unit classification (POST)
///
/// /advice?confidence=&outcome=&limit=&offset=   review persisted advices (GET)
///
/// /packing-sessions/{id}/record-outcome    grade a completed session (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/engine", engine::engine_router())
        .nest("/products", products::products_router())
        .nest("/advice", advice::advice_router())
        .nest("/packing-sessions", packing_session::packing_session_router())
}
