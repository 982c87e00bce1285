//! Product attribute and composition part models.

use serde::Serialize;
use sqlx::FromRow;

use florapack_core::classification::{
    ClassificationStatus, CompositionPart, LineAttributes, ProductFacts,
};
use florapack_core::types::{DbId, Timestamp};

/// A row from the `product_attributes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductAttribute {
    pub id: DbId,
    pub picqer_product_id: DbId,
    pub product_code: String,
    pub product_name: String,
    pub product_type: String,
    pub pot_size: Option<f64>,
    pub height: Option<f64>,
    pub weight_grams: Option<f64>,
    pub is_fragile: bool,
    pub is_mixable: bool,
    pub is_composition: bool,
    pub default_packaging_id: Option<DbId>,
    pub shipping_unit_id: Option<DbId>,
    pub classification_status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProductAttribute {
    pub fn status(&self) -> ClassificationStatus {
        ClassificationStatus::parse(&self.classification_status)
    }

    /// Project into the facts the classifier matches on.
    pub fn to_facts(&self) -> ProductFacts {
        ProductFacts {
            product_type: self.product_type.clone(),
            pot_size: self.pot_size,
            height: self.height,
            is_fragile: self.is_fragile,
        }
    }

    /// Project into the per-line attributes the solver consumes.
    pub fn to_line_attributes(&self) -> LineAttributes {
        LineAttributes {
            picqer_product_id: self.picqer_product_id,
            product_code: self.product_code.clone(),
            status: self.status(),
            shipping_unit_id: self.shipping_unit_id,
            is_composition: self.is_composition,
            is_mixable: self.is_mixable,
            weight_grams: self.weight_grams.unwrap_or(0.0),
            default_packaging_id: self.default_packaging_id,
        }
    }
}

/// A composition part joined with the part's resolved shipping unit.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductCompositionPart {
    pub parent_product_id: DbId,
    pub part_product_id: DbId,
    pub amount: i64,
    pub part_shipping_unit_id: Option<DbId>,
}

impl ProductCompositionPart {
    pub fn to_core(&self) -> CompositionPart {
        CompositionPart {
            part_product_id: self.part_product_id,
            amount: self.amount,
            shipping_unit_id: self.part_shipping_unit_id,
        }
    }
}
