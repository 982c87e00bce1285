//! Repository for the `packagings` table.

use sqlx::PgPool;

use crate::models::packaging::Packaging;

const COLUMNS: &str = "id, idpackaging, name, barcode, length_cm, width_cm, height_cm, \
     volume_cm3, max_weight_grams, box_category, specificity_score, material_cost, \
     handling_cost, cost_sku, tag_name, use_in_auto_advice, is_active, last_synced_at, \
     created_at, updated_at";

/// Read access to the packaging catalog.
pub struct PackagingRepo;

impl PackagingRepo {
    /// List all active packagings.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Packaging>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM packagings WHERE is_active = true ORDER BY name ASC"
        );
        sqlx::query_as::<_, Packaging>(&query).fetch_all(pool).await
    }

    /// List active packagings that participate in automatic advice.
    pub async fn list_auto_advice(pool: &PgPool) -> Result<Vec<Packaging>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM packagings \
             WHERE is_active = true AND use_in_auto_advice = true \
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, Packaging>(&query).fetch_all(pool).await
    }
}
