//! Repository for packing sessions (read-only to the engine).

use sqlx::PgPool;

use florapack_core::types::DbId;

use crate::models::packing_session::{PackingSession, PackingSessionBox, PackingSessionProduct};

/// Read access to completed packing sessions for outcome tracking.
pub struct PackingSessionRepo;

impl PackingSessionRepo {
    /// Find a session by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PackingSession>, sqlx::Error> {
        sqlx::query_as::<_, PackingSession>(
            "SELECT id, picklist_id, order_id, order_reference, delivery_country, status, \
                    completed_at, created_at, updated_at \
             FROM packing_sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// List a session's boxes in packing order.
    pub async fn list_boxes(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<PackingSessionBox>, sqlx::Error> {
        sqlx::query_as::<_, PackingSessionBox>(
            "SELECT id, session_id, idpackaging, packaging_name, box_index, advice_id, created_at \
             FROM packing_session_boxes \
             WHERE session_id = $1 \
             ORDER BY box_index ASC, id ASC",
        )
        .bind(session_id)
        .fetch_all(pool)
        .await
    }

    /// List all products across a session's boxes.
    pub async fn list_products(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<PackingSessionProduct>, sqlx::Error> {
        sqlx::query_as::<_, PackingSessionProduct>(
            "SELECT p.id, p.box_id, p.product_code, p.amount, p.created_at \
             FROM packing_session_products p \
             JOIN packing_session_boxes b ON b.id = p.box_id \
             WHERE b.session_id = $1 \
             ORDER BY p.box_id ASC, p.id ASC",
        )
        .bind(session_id)
        .fetch_all(pool)
        .await
    }
}
