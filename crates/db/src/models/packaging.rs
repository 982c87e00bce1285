//! Packaging catalog model.

use serde::Serialize;
use sqlx::FromRow;

use florapack_core::compartment::PackagingInfo;
use florapack_core::types::{DbId, Timestamp};

/// A row from the `packagings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Packaging {
    pub id: DbId,
    pub idpackaging: DbId,
    pub name: String,
    pub barcode: Option<String>,
    pub length_cm: Option<f64>,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub volume_cm3: Option<f64>,
    pub max_weight_grams: Option<f64>,
    pub box_category: Option<String>,
    pub specificity_score: i32,
    pub material_cost: f64,
    pub handling_cost: f64,
    pub cost_sku: Option<String>,
    pub tag_name: Option<String>,
    pub use_in_auto_advice: bool,
    pub is_active: bool,
    pub last_synced_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Packaging {
    /// Project into the engine's packaging view. Volume falls back to the
    /// product of the stored dimensions when the derived column is unset.
    pub fn to_info(&self) -> PackagingInfo {
        let volume = self.volume_cm3.or_else(|| {
            match (self.length_cm, self.width_cm, self.height_cm) {
                (Some(l), Some(w), Some(h)) => Some(l * w * h),
                _ => None,
            }
        });
        PackagingInfo {
            id: self.id,
            idpackaging: self.idpackaging,
            name: self.name.clone(),
            tag_name: self.tag_name.clone(),
            cost_sku: self.cost_sku.clone(),
            specificity_score: self.specificity_score,
            volume_cm3: volume,
            max_weight_grams: self.max_weight_grams,
            material_cost: self.material_cost,
            handling_cost: self.handling_cost,
        }
    }
}
