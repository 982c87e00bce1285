//! Product classification into shipping units.
//!
//! A shipping unit is a bucket of physically-alike items ("pot 12cm",
//! "fragile item"). Products are matched against the active shipping units
//! of their product type using pot-size/height windows and the fragility
//! filter; order lines are then aggregated into per-unit counts, which is
//! the input the compartment rule matcher works on.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Classification status
// ---------------------------------------------------------------------------

/// Result state of classifying a product against the shipping-unit catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationStatus {
    /// Product resolved to exactly one shipping unit.
    Classified,
    /// Composition product; counted through its parts, not directly.
    Composition,
    /// Not yet classified.
    Unclassified,
    /// Attributes present but no shipping-unit window accepts them.
    NoMatch,
    /// Both pot size and height are missing; nothing to match on.
    MissingData,
}

impl ClassificationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classified => "classified",
            Self::Composition => "composition",
            Self::Unclassified => "unclassified",
            Self::NoMatch => "no_match",
            Self::MissingData => "missing_data",
        }
    }

    /// Parse a stored status string. Unknown values read as `Unclassified`
    /// so a bad row degrades to "needs classification" instead of failing.
    pub fn parse(s: &str) -> Self {
        match s {
            "classified" => Self::Classified,
            "composition" => Self::Composition,
            "no_match" => Self::NoMatch,
            "missing_data" => Self::MissingData,
            _ => Self::Unclassified,
        }
    }
}

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Matching window of one shipping unit, as configured by operators.
///
/// `None` bounds are open: a unit with only `pot_size_min` set accepts any
/// height. `is_fragile_filter = None` accepts fragile and non-fragile alike.
#[derive(Debug, Clone)]
pub struct ShippingUnitDef {
    pub id: DbId,
    pub name: String,
    pub product_type: String,
    pub sort_order: i32,
    pub pot_size_min: Option<f64>,
    pub pot_size_max: Option<f64>,
    pub height_min: Option<f64>,
    pub height_max: Option<f64>,
    pub is_fragile_filter: Option<bool>,
    pub default_packaging_id: Option<DbId>,
}

/// The attributes classification looks at.
#[derive(Debug, Clone)]
pub struct ProductFacts {
    pub product_type: String,
    pub pot_size: Option<f64>,
    pub height: Option<f64>,
    pub is_fragile: bool,
}

/// One line of the order under advice. Immutable input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_code: String,
    pub picqer_product_id: DbId,
    pub quantity: i64,
}

/// Resolved product attributes needed to count and pack an order line.
#[derive(Debug, Clone)]
pub struct LineAttributes {
    pub picqer_product_id: DbId,
    pub product_code: String,
    pub status: ClassificationStatus,
    pub shipping_unit_id: Option<DbId>,
    pub is_composition: bool,
    pub is_mixable: bool,
    pub weight_grams: f64,
    pub default_packaging_id: Option<DbId>,
}

/// One part of a composition product, with its own shipping unit resolved
/// through the part's product attributes.
#[derive(Debug, Clone)]
pub struct CompositionPart {
    pub part_product_id: DbId,
    pub amount: i64,
    pub shipping_unit_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Aggregated shipping-unit counts for an order, plus the lines that could
/// not be classified. Unclassified lines never abort counting of the rest.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedOrder {
    /// Shipping-unit id -> total quantity. BTreeMap keeps iteration (and
    /// everything derived from it, like the fingerprint) deterministic.
    pub unit_counts: BTreeMap<DbId, i64>,
    /// Product codes excluded from matching.
    pub unclassified: Vec<String>,
}

impl ClassifiedOrder {
    pub fn is_empty(&self) -> bool {
        self.unit_counts.is_empty() && self.unclassified.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Product -> shipping unit matching
// ---------------------------------------------------------------------------

/// Classify a single product against the shipping-unit catalog.
///
/// Returns the resolved unit id for `Classified`, `None` otherwise. Among
/// multiple accepting units the narrowest window wins; ties keep the
/// catalog order (callers supply units sorted by `sort_order`).
pub fn classify_product(
    facts: &ProductFacts,
    units: &[ShippingUnitDef],
) -> (ClassificationStatus, Option<DbId>) {
    if facts.pot_size.is_none() && facts.height.is_none() {
        return (ClassificationStatus::MissingData, None);
    }

    let accepting: Vec<&ShippingUnitDef> = units
        .iter()
        .filter(|u| u.product_type == facts.product_type)
        .filter(|u| unit_accepts(u, facts))
        .collect();

    match accepting
        .iter()
        .min_by(|a, b| window_span(a).total_cmp(&window_span(b)))
    {
        Some(best) => (ClassificationStatus::Classified, Some(best.id)),
        None => (ClassificationStatus::NoMatch, None),
    }
}

fn unit_accepts(unit: &ShippingUnitDef, facts: &ProductFacts) -> bool {
    // A set bound requires the corresponding measurement to exist and fit.
    if let Some(min) = unit.pot_size_min {
        match facts.pot_size {
            Some(v) if v >= min => {}
            _ => return false,
        }
    }
    if let Some(max) = unit.pot_size_max {
        match facts.pot_size {
            Some(v) if v <= max => {}
            _ => return false,
        }
    }
    if let Some(min) = unit.height_min {
        match facts.height {
            Some(v) if v >= min => {}
            _ => return false,
        }
    }
    if let Some(max) = unit.height_max {
        match facts.height {
            Some(v) if v <= max => {}
            _ => return false,
        }
    }
    if let Some(filter) = unit.is_fragile_filter {
        if filter != facts.is_fragile {
            return false;
        }
    }
    true
}

/// Total window width; open-ended dimensions count as infinitely wide so a
/// fully-bounded unit always beats a catch-all.
fn window_span(unit: &ShippingUnitDef) -> f64 {
    let pot = match (unit.pot_size_min, unit.pot_size_max) {
        (Some(min), Some(max)) => max - min,
        _ => f64::INFINITY,
    };
    let height = match (unit.height_min, unit.height_max) {
        (Some(min), Some(max)) => max - min,
        _ => f64::INFINITY,
    };
    pot + height
}

// ---------------------------------------------------------------------------
// Order line -> unit count aggregation
// ---------------------------------------------------------------------------

/// Aggregate order lines into shipping-unit counts.
///
/// - Lines without attributes, or with a non-classifiable status, land in
///   `unclassified` and are skipped.
/// - Composition lines expand into their parts (part amount x line
///   quantity). Parts without a resolved unit mark the line unclassified;
///   resolved parts of the same line still count.
pub fn count_units(
    lines: &[OrderLine],
    attrs: &HashMap<DbId, LineAttributes>,
    parts: &HashMap<DbId, Vec<CompositionPart>>,
) -> ClassifiedOrder {
    let mut order = ClassifiedOrder::default();

    for line in lines {
        let Some(attr) = attrs.get(&line.picqer_product_id) else {
            order.unclassified.push(line.product_code.clone());
            continue;
        };

        if attr.is_composition && attr.status != ClassificationStatus::Classified {
            let line_parts = parts
                .get(&line.picqer_product_id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            if line_parts.is_empty() {
                order.unclassified.push(line.product_code.clone());
                continue;
            }
            let mut all_resolved = true;
            for part in line_parts {
                match part.shipping_unit_id {
                    Some(unit_id) => {
                        *order.unit_counts.entry(unit_id).or_insert(0) +=
                            part.amount * line.quantity;
                    }
                    None => all_resolved = false,
                }
            }
            if !all_resolved {
                order.unclassified.push(line.product_code.clone());
            }
            continue;
        }

        match (attr.status, attr.shipping_unit_id) {
            (ClassificationStatus::Classified, Some(unit_id)) => {
                *order.unit_counts.entry(unit_id).or_insert(0) += line.quantity;
            }
            _ => order.unclassified.push(line.product_code.clone()),
        }
    }

    order
}
