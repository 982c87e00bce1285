//! Advice orchestrator: the engine's top-level entry point.
//!
//! `calculate` loads everything the pure solver needs (attributes,
//! composition parts, shipping units, the packaging catalog with its rules,
//! country costs), runs the solve, and persists the resulting advice
//! snapshot. `apply_tags` is the only operation with external side effects:
//! it writes the advised packaging labels onto the order in the WMS.
//! Calculation itself never touches external systems, so callers may
//! recalculate freely.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use florapack_core::advice::{AdviceBox, AdviceStatus, DetectedUnit};
use florapack_core::classification::{count_units, CompositionPart, LineAttributes, OrderLine};
use florapack_core::compartment::{PackagingCandidate, PackagingInfo};
use florapack_core::error::CoreError;
use florapack_core::solver::{solve, SolveInput};
use florapack_core::types::DbId;
use florapack_core::{advice, compartment};
use florapack_db::models::advice::{NewAdvice, PackagingAdvice};
use florapack_db::repositories::{
    AdviceRepo, CompartmentRuleRepo, PackagingRepo, ProductAttributeRepo, ShippingUnitRepo,
};
use florapack_db::DbPool;

use crate::engine::cost_provider::CostProvider;
use crate::error::AppError;
use crate::wms::WmsClient;

/// Prefix of the labels the engine owns on an order. Labels carrying it are
/// replaced wholesale on every apply.
const TAG_PREFIX: &str = "C-";

/// Fingerprint country used when the caller supplied no destination.
const UNKNOWN_COUNTRY: &str = "UNKNOWN";

/// Everything `calculate` needs from the caller, already validated at the
/// HTTP boundary except for the structural checks done here.
#[derive(Debug, Clone)]
pub struct CalculateInput {
    pub order_id: DbId,
    pub picklist_id: Option<DbId>,
    pub lines: Vec<OrderLine>,
    pub shipping_profile_id: Option<DbId>,
    /// Upper-case ISO country code, checked against the allow-list upstream.
    pub country_code: Option<String>,
}

/// The advice engine's orchestrating service.
pub struct AdviceOrchestrator {
    pool: DbPool,
    costs: Arc<CostProvider>,
    wms: Arc<WmsClient>,
}

impl AdviceOrchestrator {
    pub fn new(pool: DbPool, costs: Arc<CostProvider>, wms: Arc<WmsClient>) -> Self {
        Self { pool, costs, wms }
    }

    /// Calculate and persist packaging advice for an order.
    ///
    /// Soft problems (unclassified lines, no matching packaging, tariff
    /// source unreachable) are folded into the advice's own fields and
    /// never surface as errors; only bad input and storage failures do.
    pub async fn calculate(&self, input: CalculateInput) -> Result<PackagingAdvice, AppError> {
        validate_input(&input)?;

        tracing::info!(
            order_id = input.order_id,
            lines = input.lines.len(),
            country = input.country_code.as_deref().unwrap_or("-"),
            "Calculating packaging advice",
        );

        // --- Attributes and composition parts ---
        let product_ids: Vec<DbId> = input.lines.iter().map(|l| l.picqer_product_id).collect();
        let attr_rows = ProductAttributeRepo::find_by_picqer_ids(&self.pool, &product_ids).await?;
        let attrs: HashMap<DbId, LineAttributes> = attr_rows
            .iter()
            .map(|row| (row.picqer_product_id, row.to_line_attributes()))
            .collect();

        let composition_ids: Vec<DbId> = attr_rows
            .iter()
            .filter(|row| row.is_composition)
            .map(|row| row.picqer_product_id)
            .collect();
        let mut parts: HashMap<DbId, Vec<CompositionPart>> = HashMap::new();
        if !composition_ids.is_empty() {
            for row in ProductAttributeRepo::list_parts_for(&self.pool, &composition_ids).await? {
                parts
                    .entry(row.parent_product_id)
                    .or_default()
                    .push(row.to_core());
            }
        }

        // --- Shipping units ---
        let units = ShippingUnitRepo::list_active(&self.pool).await?;
        let unit_names: BTreeMap<DbId, String> =
            units.iter().map(|u| (u.id, u.name.clone())).collect();
        let unit_defaults: BTreeMap<DbId, DbId> = units
            .iter()
            .filter_map(|u| u.default_packaging_id.map(|pkg| (u.id, pkg)))
            .collect();

        let classified = count_units(&input.lines, &attrs, &parts);

        // --- Fingerprint dedup ---
        let fingerprint_country = input.country_code.as_deref().unwrap_or(UNKNOWN_COUNTRY);
        let fingerprint =
            advice::unit_fingerprint(fingerprint_country, &classified.unit_counts, &unit_names);

        if let Some(existing) =
            AdviceRepo::latest_current_for_order(&self.pool, input.order_id).await?
        {
            if existing.unit_fingerprint == fingerprint {
                tracing::info!(
                    advice_id = existing.id,
                    order_id = input.order_id,
                    "Fingerprint unchanged, returning existing advice",
                );
                return Ok(existing);
            }
            AdviceRepo::invalidate(&self.pool, existing.id).await?;
            tracing::info!(
                advice_id = existing.id,
                order_id = input.order_id,
                "Invalidated superseded advice",
            );
        }

        // --- Packaging catalog ---
        let active = PackagingRepo::list_active(&self.pool).await?;
        let packagings: BTreeMap<DbId, PackagingInfo> =
            active.iter().map(|p| (p.id, p.to_info())).collect();

        let mut rules_by_packaging: HashMap<DbId, Vec<compartment::CompartmentRule>> =
            HashMap::new();
        for row in CompartmentRuleRepo::list_active(&self.pool).await? {
            rules_by_packaging
                .entry(row.packaging_id)
                .or_default()
                .push(row.to_core());
        }
        let catalog: Vec<PackagingCandidate> = PackagingRepo::list_auto_advice(&self.pool)
            .await?
            .iter()
            .map(|p| PackagingCandidate {
                packaging: p.to_info(),
                rules: rules_by_packaging.remove(&p.id).unwrap_or_default(),
            })
            .collect();

        // --- Country costs (absence degrades ranking, never fails) ---
        let costs = match &input.country_code {
            Some(country) => {
                let table = self.costs.all_costs_for_country(country).await;
                if table.is_none() {
                    tracing::warn!(
                        %country,
                        "Cost data unavailable, ranking on specificity and size only",
                    );
                }
                table
            }
            None => None,
        };
        let cost_data_available = costs.is_some();

        // --- Solve ---
        let solution = solve(&SolveInput {
            catalog: &catalog,
            packagings: &packagings,
            unit_names: &unit_names,
            unit_defaults: &unit_defaults,
            lines: &input.lines,
            attrs: &attrs,
            classified: &classified,
            costs: costs.as_ref(),
        });

        let status = if solution.boxes.is_empty() {
            AdviceStatus::NoMatch
        } else {
            AdviceStatus::Calculated
        };

        let units_detected: Vec<DetectedUnit> = classified
            .unit_counts
            .iter()
            .map(|(id, qty)| DetectedUnit {
                shipping_unit_id: *id,
                shipping_unit_name: unit_names
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| id.to_string()),
                quantity: *qty,
            })
            .collect();
        let units_detected = serde_json::to_value(&units_detected)
            .map_err(|e| AppError::InternalError(format!("Failed to encode detected units: {e}")))?;

        // --- Persist (hard failure: advice must not be silently dropped) ---
        let stored = AdviceRepo::insert(
            &self.pool,
            &NewAdvice {
                order_id: input.order_id,
                picklist_id: input.picklist_id,
                status,
                confidence: solution.confidence,
                advice_boxes: solution.boxes,
                units_detected,
                unclassified_products: classified.unclassified,
                unit_fingerprint: fingerprint,
                country_code: input.country_code,
                shipping_profile_id: input.shipping_profile_id,
                cost_data_available,
                weight_exceeded: solution.weight_exceeded,
            },
        )
        .await?;

        tracing::info!(
            advice_id = stored.id,
            order_id = stored.order_id,
            status = %stored.status,
            confidence = %stored.confidence,
            weight_exceeded = stored.weight_exceeded,
            "Advice calculated and saved",
        );
        Ok(stored)
    }

    /// Write the advised packaging labels onto the order in the WMS.
    ///
    /// Replaces any engine-owned (`C-` prefixed) labels from a previous
    /// advice. Only labels that already exist in the WMS are written;
    /// missing ones are skipped and logged. Per-label WMS failures do not
    /// abort the rest, the advice records whatever was actually written.
    pub async fn apply_tags(
        &self,
        order_id: DbId,
        advice_id: DbId,
    ) -> Result<Vec<String>, AppError> {
        let advice = AdviceRepo::find_by_id(&self.pool, advice_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "PackagingAdvice",
                id: advice_id,
            })?;
        if advice.order_id != order_id {
            return Err(AppError::BadRequest(format!(
                "Advice {advice_id} does not belong to order {order_id}"
            )));
        }

        let boxes = advice
            .boxes()
            .map_err(|e| AppError::InternalError(format!("Corrupt advice payload: {e}")))?;
        if advice.status_enum() == Some(AdviceStatus::NoMatch) || boxes.is_empty() {
            tracing::info!(advice_id, order_id, "Advice has no boxes, not writing labels");
            return Ok(Vec::new());
        }

        // Remove labels left behind by an earlier advice.
        let current = self.wms.order_tags(order_id).await?;
        for tag in current.iter().filter(|t| t.title.starts_with(TAG_PREFIX)) {
            match self.wms.remove_order_tag(order_id, tag.idtag).await {
                Ok(()) => tracing::debug!(order_id, label = %tag.title, "Removed old label"),
                Err(e) => {
                    tracing::warn!(order_id, label = %tag.title, error = %e, "Failed to remove old label");
                }
            }
        }

        let known: HashMap<String, DbId> = self
            .wms
            .list_tags()
            .await?
            .into_iter()
            .map(|t| (t.title, t.idtag))
            .collect();

        let mut written = Vec::new();
        for name in advice_tag_names(&boxes) {
            let Some(&idtag) = known.get(&name) else {
                tracing::info!(order_id, label = %name, "Label not defined in WMS, skipping");
                continue;
            };
            match self.wms.add_order_tag(order_id, idtag).await {
                Ok(()) => written.push(name),
                Err(e) => {
                    tracing::warn!(order_id, label = %name, error = %e, "Failed to write label");
                }
            }
        }

        AdviceRepo::mark_applied(&self.pool, advice_id, &written).await?;
        tracing::info!(
            advice_id,
            order_id,
            labels = written.len(),
            "Labels applied to order",
        );
        Ok(written)
    }
}

/// Structural input checks, rejected before any rule evaluation runs.
fn validate_input(input: &CalculateInput) -> Result<(), CoreError> {
    if input.order_id < 1 {
        return Err(CoreError::Validation(
            "order_id must be a positive id".into(),
        ));
    }
    if input.lines.is_empty() {
        return Err(CoreError::Validation(
            "products must be a non-empty list".into(),
        ));
    }
    for line in &input.lines {
        if line.picqer_product_id < 1 {
            return Err(CoreError::Validation(format!(
                "product '{}' has an invalid picqer_product_id",
                line.product_code
            )));
        }
        if line.product_code.trim().is_empty() {
            return Err(CoreError::Validation(
                "every product needs a product_code".into(),
            ));
        }
        if line.quantity < 1 {
            return Err(CoreError::Validation(format!(
                "product '{}' has a non-positive quantity",
                line.product_code
            )));
        }
    }
    Ok(())
}

/// One label per advised box; repeats of the same packaging get a counted
/// suffix so "2x the same box" stays visible on the order.
fn advice_tag_names(boxes: &[AdviceBox]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(boxes.len());
    for b in boxes {
        let base = format!("{TAG_PREFIX}{}", b.packaging_name);
        let count = seen.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            names.push(format!("{base} ({count})", count = *count));
        } else {
            names.push(base);
        }
    }
    names
}
