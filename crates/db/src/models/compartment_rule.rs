//! Compartment rule model.

use serde::Serialize;
use sqlx::FromRow;

use florapack_core::compartment::{self, RuleOperator};
use florapack_core::types::{DbId, Timestamp};

/// A row from the `compartment_rules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CompartmentRule {
    pub id: DbId,
    pub packaging_id: DbId,
    pub rule_group: i32,
    pub shipping_unit_id: DbId,
    pub quantity: i64,
    pub operator: String,
    pub alternative_for_id: Option<DbId>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CompartmentRule {
    /// Project into the matcher's rule type.
    pub fn to_core(&self) -> compartment::CompartmentRule {
        compartment::CompartmentRule {
            id: self.id,
            rule_group: self.rule_group,
            shipping_unit_id: self.shipping_unit_id,
            quantity: self.quantity,
            operator: RuleOperator::parse(&self.operator),
            alternative_for_id: self.alternative_for_id,
            sort_order: self.sort_order,
            is_active: self.is_active,
        }
    }
}
