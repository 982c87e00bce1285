//! Repository for `product_attributes` and `product_composition_parts`.

use sqlx::PgPool;

use florapack_core::types::DbId;

use crate::models::product_attribute::{ProductAttribute, ProductCompositionPart};

const COLUMNS: &str = "id, picqer_product_id, product_code, product_name, product_type, \
     pot_size, height, weight_grams, is_fragile, is_mixable, is_composition, \
     default_packaging_id, shipping_unit_id, classification_status, created_at, updated_at";

/// Read access to product classification data, plus the single write the
/// classification process performs.
pub struct ProductAttributeRepo;

impl ProductAttributeRepo {
    /// Fetch attributes for a set of WMS product ids.
    pub async fn find_by_picqer_ids(
        pool: &PgPool,
        picqer_product_ids: &[DbId],
    ) -> Result<Vec<ProductAttribute>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM product_attributes WHERE picqer_product_id = ANY($1)"
        );
        sqlx::query_as::<_, ProductAttribute>(&query)
            .bind(picqer_product_ids)
            .fetch_all(pool)
            .await
    }

    /// List every product attribute row (classification sweeps).
    pub async fn list_all(pool: &PgPool) -> Result<Vec<ProductAttribute>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM product_attributes ORDER BY picqer_product_id ASC"
        );
        sqlx::query_as::<_, ProductAttribute>(&query).fetch_all(pool).await
    }

    /// Store a classification result for one product.
    pub async fn update_classification(
        pool: &PgPool,
        picqer_product_id: DbId,
        status: &str,
        shipping_unit_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE product_attributes \
             SET classification_status = $2, shipping_unit_id = $3, updated_at = now() \
             WHERE picqer_product_id = $1",
        )
        .bind(picqer_product_id)
        .bind(status)
        .bind(shipping_unit_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fetch composition parts for a set of parent products, with each
    /// part's shipping unit resolved through its own attribute row.
    pub async fn list_parts_for(
        pool: &PgPool,
        parent_product_ids: &[DbId],
    ) -> Result<Vec<ProductCompositionPart>, sqlx::Error> {
        sqlx::query_as::<_, ProductCompositionPart>(
            "SELECT p.parent_product_id, p.part_product_id, p.amount, \
                    a.shipping_unit_id AS part_shipping_unit_id \
             FROM product_composition_parts p \
             LEFT JOIN product_attributes a ON a.picqer_product_id = p.part_product_id \
             WHERE p.parent_product_id = ANY($1) \
             ORDER BY p.parent_product_id ASC, p.part_product_id ASC",
        )
        .bind(parent_product_ids)
        .fetch_all(pool)
        .await
    }
}
