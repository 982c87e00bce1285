//! Packing session models (read-only to the engine).

use serde::Serialize;
use sqlx::FromRow;

use florapack_core::types::{DbId, Timestamp};

/// A row from the `packing_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PackingSession {
    pub id: DbId,
    pub picklist_id: DbId,
    pub order_id: Option<DbId>,
    pub order_reference: Option<String>,
    pub delivery_country: Option<String>,
    pub status: String,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `packing_session_boxes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PackingSessionBox {
    pub id: DbId,
    pub session_id: DbId,
    pub idpackaging: Option<DbId>,
    pub packaging_name: String,
    pub box_index: i32,
    pub advice_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// A row from the `packing_session_products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PackingSessionProduct {
    pub id: DbId,
    pub box_id: DbId,
    pub product_code: String,
    pub amount: i64,
    pub created_at: Timestamp,
}
