//! Repository for the `packaging_advice` table.

use sqlx::types::Json;
use sqlx::PgPool;

use florapack_core::types::DbId;

use crate::models::advice::{NewAdvice, OutcomeUpdate, PackagingAdvice};

const COLUMNS: &str = "id, order_id, picklist_id, status, confidence, advice_boxes, \
     units_detected, unclassified_products, tags_written, unit_fingerprint, country_code, \
     shipping_profile_id, cost_data_available, weight_exceeded, calculated_at, applied_at, \
     invalidated_at, outcome, deviation_type, actual_boxes, resolved_at";

/// Persistence for advice snapshots and their lifecycle updates.
pub struct AdviceRepo;

impl AdviceRepo {
    /// Insert a freshly calculated advice, returning the stored row.
    pub async fn insert(
        pool: &PgPool,
        input: &NewAdvice,
    ) -> Result<PackagingAdvice, sqlx::Error> {
        let query = format!(
            "INSERT INTO packaging_advice \
                (order_id, picklist_id, status, confidence, advice_boxes, units_detected, \
                 unclassified_products, unit_fingerprint, country_code, shipping_profile_id, \
                 cost_data_available, weight_exceeded) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PackagingAdvice>(&query)
            .bind(input.order_id)
            .bind(input.picklist_id)
            .bind(input.status.as_str())
            .bind(input.confidence.as_str())
            .bind(Json(&input.advice_boxes))
            .bind(&input.units_detected)
            .bind(&input.unclassified_products)
            .bind(&input.unit_fingerprint)
            .bind(&input.country_code)
            .bind(input.shipping_profile_id)
            .bind(input.cost_data_available)
            .bind(input.weight_exceeded)
            .fetch_one(pool)
            .await
    }

    /// Find an advice by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PackagingAdvice>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM packaging_advice WHERE id = $1");
        sqlx::query_as::<_, PackagingAdvice>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The newest non-invalidated advice for an order, if any.
    pub async fn latest_current_for_order(
        pool: &PgPool,
        order_id: DbId,
    ) -> Result<Option<PackagingAdvice>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM packaging_advice \
             WHERE order_id = $1 AND status <> 'invalidated' \
             ORDER BY calculated_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, PackagingAdvice>(&query)
            .bind(order_id)
            .fetch_optional(pool)
            .await
    }

    /// Mark an advice as superseded.
    pub async fn invalidate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE packaging_advice \
             SET status = 'invalidated', invalidated_at = now() \
             WHERE id = $1 AND status <> 'invalidated'",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record that labels were written to the order in the WMS.
    pub async fn mark_applied(
        pool: &PgPool,
        id: DbId,
        tags_written: &[String],
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE packaging_advice \
             SET status = 'applied', applied_at = now(), tags_written = $2 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(tags_written)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Store the packing-session outcome on the advice.
    ///
    /// Idempotent: re-running with the same inputs rewrites the same values
    /// and keeps the original resolution timestamp.
    pub async fn record_outcome(
        pool: &PgPool,
        id: DbId,
        update: &OutcomeUpdate,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE packaging_advice \
             SET outcome = $2, deviation_type = $3, actual_boxes = $4, \
                 resolved_at = COALESCE(resolved_at, now()) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&update.outcome)
        .bind(&update.deviation_type)
        .bind(Json(&update.actual_boxes))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List advices for operational review, newest first.
    ///
    /// `outcome = "pending"` selects rows whose outcome is not yet recorded.
    pub async fn list_for_review(
        pool: &PgPool,
        confidence: Option<&str>,
        outcome: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PackagingAdvice>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM packaging_advice \
             WHERE ($1::text IS NULL OR confidence = $1) \
               AND ($2::text IS NULL \
                    OR ($2 = 'pending' AND outcome IS NULL) \
                    OR outcome = $2) \
             ORDER BY calculated_at DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, PackagingAdvice>(&query)
            .bind(confidence)
            .bind(outcome)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
