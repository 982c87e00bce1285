//! Repository for the `compartment_rules` table.

use sqlx::PgPool;

use crate::models::compartment_rule::CompartmentRule;

const COLUMNS: &str = "id, packaging_id, rule_group, shipping_unit_id, quantity, operator, \
     alternative_for_id, sort_order, is_active, created_at, updated_at";

/// Read access to compartment rules.
pub struct CompartmentRuleRepo;

impl CompartmentRuleRepo {
    /// List every active rule, grouped the way the matcher consumes them.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<CompartmentRule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM compartment_rules \
             WHERE is_active = true \
             ORDER BY packaging_id ASC, rule_group ASC, sort_order ASC"
        );
        sqlx::query_as::<_, CompartmentRule>(&query).fetch_all(pool).await
    }
}
