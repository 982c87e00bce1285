//! Product classification sweep.
//!
//! Matches every product against the active shipping units of its product
//! type using the pure window matching in `florapack-core` and writes the
//! resolved unit and status back per product. Runs after a product sync or
//! when operators change shipping-unit windows, and is safe to repeat:
//! every sweep recomputes from the current windows, so stale assignments
//! are corrected rather than preserved.

use serde::Serialize;

use florapack_core::classification::{classify_product, ClassificationStatus, ShippingUnitDef};
use florapack_db::repositories::{ProductAttributeRepo, ShippingUnitRepo};
use florapack_db::DbPool;

use crate::error::AppError;

/// Counters for one classification sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassificationStats {
    pub classified: i64,
    pub no_match: i64,
    pub missing_data: i64,
    /// Composition products resolve through their parts and keep their
    /// stored status.
    pub compositions_skipped: i64,
}

/// Classify the whole product catalog against the current shipping-unit
/// windows.
pub async fn classify_all_products(pool: &DbPool) -> Result<ClassificationStats, AppError> {
    let units: Vec<ShippingUnitDef> = ShippingUnitRepo::list_active(pool)
        .await?
        .iter()
        .map(|u| u.to_def())
        .collect();
    let products = ProductAttributeRepo::list_all(pool).await?;

    let mut stats = ClassificationStats::default();
    for product in &products {
        if product.is_composition {
            stats.compositions_skipped += 1;
            continue;
        }

        let (status, unit_id) = classify_product(&product.to_facts(), &units);
        ProductAttributeRepo::update_classification(
            pool,
            product.picqer_product_id,
            status.as_str(),
            unit_id,
        )
        .await?;

        match status {
            ClassificationStatus::Classified => stats.classified += 1,
            ClassificationStatus::MissingData => stats.missing_data += 1,
            _ => stats.no_match += 1,
        }
    }

    tracing::info!(
        products = products.len(),
        classified = stats.classified,
        no_match = stats.no_match,
        missing_data = stats.missing_data,
        compositions_skipped = stats.compositions_skipped,
        "Product classification sweep complete",
    );
    Ok(stats)
}
