//! Shipping unit model.

use serde::Serialize;
use sqlx::FromRow;

use florapack_core::classification::ShippingUnitDef;
use florapack_core::types::{DbId, Timestamp};

/// A row from the `shipping_units` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShippingUnit {
    pub id: DbId,
    pub name: String,
    pub product_type: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub pot_size_min: Option<f64>,
    pub pot_size_max: Option<f64>,
    pub height_min: Option<f64>,
    pub height_max: Option<f64>,
    pub is_fragile_filter: Option<bool>,
    pub default_packaging_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ShippingUnit {
    /// Project the row into the matching window the classifier works on.
    pub fn to_def(&self) -> ShippingUnitDef {
        ShippingUnitDef {
            id: self.id,
            name: self.name.clone(),
            product_type: self.product_type.clone(),
            sort_order: self.sort_order,
            pot_size_min: self.pot_size_min,
            pot_size_max: self.pot_size_max,
            height_min: self.height_min,
            height_max: self.height_max,
            is_fragile_filter: self.is_fragile_filter,
            default_packaging_id: self.default_packaging_id,
        }
    }
}
