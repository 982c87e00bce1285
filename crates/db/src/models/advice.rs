//! Packaging advice model and DTOs.

use serde::Serialize;
use sqlx::FromRow;

use florapack_core::advice::{ActualBox, AdviceBox, AdviceStatus, Confidence};
use florapack_core::types::{DbId, Timestamp};

/// A row from the `packaging_advice` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PackagingAdvice {
    pub id: DbId,
    pub order_id: DbId,
    pub picklist_id: Option<DbId>,
    pub status: String,
    pub confidence: String,
    pub advice_boxes: serde_json::Value,
    pub units_detected: serde_json::Value,
    pub unclassified_products: Vec<String>,
    pub tags_written: Vec<String>,
    pub unit_fingerprint: Option<String>,
    pub country_code: Option<String>,
    pub shipping_profile_id: Option<DbId>,
    pub cost_data_available: bool,
    pub weight_exceeded: bool,
    pub calculated_at: Timestamp,
    pub applied_at: Option<Timestamp>,
    pub invalidated_at: Option<Timestamp>,
    pub outcome: Option<String>,
    pub deviation_type: Option<String>,
    pub actual_boxes: Option<serde_json::Value>,
    pub resolved_at: Option<Timestamp>,
}

impl PackagingAdvice {
    pub fn status_enum(&self) -> Option<AdviceStatus> {
        AdviceStatus::parse(&self.status)
    }

    /// Deserialize the stored advice boxes payload.
    pub fn boxes(&self) -> Result<Vec<AdviceBox>, serde_json::Error> {
        serde_json::from_value(self.advice_boxes.clone())
    }
}

/// DTO for inserting a freshly calculated advice.
#[derive(Debug, Clone)]
pub struct NewAdvice {
    pub order_id: DbId,
    pub picklist_id: Option<DbId>,
    pub status: AdviceStatus,
    pub confidence: Confidence,
    pub advice_boxes: Vec<AdviceBox>,
    pub units_detected: serde_json::Value,
    pub unclassified_products: Vec<String>,
    pub unit_fingerprint: Option<String>,
    pub country_code: Option<String>,
    pub shipping_profile_id: Option<DbId>,
    pub cost_data_available: bool,
    pub weight_exceeded: bool,
}

/// DTO for the outcome tracker's one-time update.
#[derive(Debug, Clone)]
pub struct OutcomeUpdate {
    pub outcome: String,
    pub deviation_type: String,
    pub actual_boxes: Vec<ActualBox>,
}
