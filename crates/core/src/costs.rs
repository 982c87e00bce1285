//! Shipping cost entries and selection policy.
//!
//! The tariff system publishes per-country, per-SKU cost entries. A SKU can
//! have several entries for different weight brackets; a `None` bracket is
//! the parcel rate and applies regardless of weight. For ranking we use the
//! parcel rate when present, otherwise the cheapest bracketed entry; once a
//! box's real content weight is known the cost is refined to the smallest
//! bracket that fits.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::compartment::PackagingMatch;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One published cost row for a box SKU in one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEntry {
    pub box_sku: String,
    /// Weight bracket label, e.g. `"0-5kg"`. `None` = parcel rate.
    pub weight_bracket: Option<String>,
    pub box_cost: f64,
    pub transport_cost: f64,
    pub total_cost: f64,
    pub carrier: String,
}

/// All cost entries for one country, keyed by box SKU.
pub type CountryCosts = HashMap<String, Vec<CostEntry>>;

// ---------------------------------------------------------------------------
// Selection policy
// ---------------------------------------------------------------------------

/// Pick the entry used for ranking: the parcel-rate entry when one exists,
/// otherwise the cheapest weight-bracketed entry.
pub fn ranking_estimate(entries: &[CostEntry]) -> Option<&CostEntry> {
    if let Some(parcel) = entries.iter().find(|e| e.weight_bracket.is_none()) {
        return Some(parcel);
    }
    entries
        .iter()
        .min_by(|a, b| a.total_cost.total_cmp(&b.total_cost))
}

/// Parse a bracket label like `"0-5kg"` or `"10-20kg"` into gram bounds.
///
/// Returns `None` for labels that do not follow the `<lo>-<hi>kg` form;
/// such entries are skipped during weight selection.
pub fn parse_bracket(label: &str) -> Option<(f64, f64)> {
    let label = label.trim();
    let rest = label.strip_suffix("kg")?;
    let (lo, hi) = rest.split_once('-')?;
    let lo: f64 = lo.trim().parse().ok()?;
    let hi: f64 = hi.trim().parse().ok()?;
    if hi < lo {
        return None;
    }
    Some((lo * 1000.0, hi * 1000.0))
}

/// Select the cost entry for a box of known content weight.
///
/// Bracketed entries whose range contains the weight compete; the smallest
/// upper bound wins. Falls back to the parcel-rate entry, then `None` (the
/// caller keeps its ranking estimate).
pub fn select_for_weight(entries: &[CostEntry], weight_grams: f64) -> Option<&CostEntry> {
    let mut best: Option<(&CostEntry, f64)> = None;
    for entry in entries {
        let Some(label) = entry.weight_bracket.as_deref() else {
            continue;
        };
        let Some((lo, hi)) = parse_bracket(label) else {
            continue;
        };
        if weight_grams < lo || weight_grams > hi {
            continue;
        }
        let smaller = match best {
            None => true,
            Some((_, best_hi)) => hi < best_hi,
        };
        if smaller {
            best = Some((entry, hi));
        }
    }
    match best {
        Some((entry, _)) => Some(entry),
        None => entries.iter().find(|e| e.weight_bracket.is_none()),
    }
}

// ---------------------------------------------------------------------------
// Match enrichment
// ---------------------------------------------------------------------------

/// Overwrite match costs with tariff data for the destination country.
///
/// - SKU present with entries: costs replaced by the ranking estimate.
/// - SKU present but no entries for this country: the match is dropped —
///   there is no preferred route to ship this box there.
/// - No SKU on the packaging: kept with its material+handling estimate.
/// - `costs = None` (tariff source unreachable): everything kept unchanged;
///   ranking degrades to specificity + size.
pub fn enrich_matches(
    matches: Vec<PackagingMatch>,
    costs: Option<&CountryCosts>,
) -> Vec<PackagingMatch> {
    let Some(costs) = costs else {
        return matches;
    };

    matches
        .into_iter()
        .filter_map(|mut m| {
            let Some(sku) = m.cost_sku.clone() else {
                return Some(m);
            };
            let entries = costs.get(&sku)?;
            let entry = ranking_estimate(entries)?;
            m.box_cost = entry.box_cost;
            m.transport_cost = entry.transport_cost;
            m.total_cost = entry.total_cost;
            Some(m)
        })
        .collect()
}
