//! Repository for the `shipping_units` table.

use sqlx::PgPool;

use crate::models::shipping_unit::ShippingUnit;

const COLUMNS: &str = "id, name, product_type, sort_order, is_active, \
     pot_size_min, pot_size_max, height_min, height_max, is_fragile_filter, \
     default_packaging_id, created_at, updated_at";

/// Read access to the shipping-unit catalog.
pub struct ShippingUnitRepo;

impl ShippingUnitRepo {
    /// List all active shipping units in classification order.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<ShippingUnit>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM shipping_units \
             WHERE is_active = true \
             ORDER BY product_type ASC, sort_order ASC"
        );
        sqlx::query_as::<_, ShippingUnit>(&query).fetch_all(pool).await
    }
}
