//! Compartment rule matching.
//!
//! Every packaging type carries a set of compartment rules grouped by
//! `rule_group`. A packaging qualifies for an order when at least one of
//! its groups evaluates true against the order's shipping-unit counts
//! (groups are ORed). Within a group, `EN` (AND) rules must all be
//! satisfied, `OF` (OR) rules satisfy the group if any one is met, and a
//! rule carrying `alternative_for_id` may stand in for the rule it points
//! at ("either 2x unit X, or 1x unit Y").
//!
//! Evaluation is a pure interpreter over rule rows: no I/O, no ambient
//! state. Rules are consumed in `id` order, never `sort_order` — sort
//! order affects only display, matching must be invariant to it.

use std::collections::{BTreeMap, HashMap};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Rule types
// ---------------------------------------------------------------------------

/// Combinator stored on a rule row. The vocabulary is Dutch: `EN` = AND,
/// `OF` = OR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOperator {
    And,
    Or,
}

impl RuleOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "EN",
            Self::Or => "OF",
        }
    }

    /// Parse a stored operator. Anything unrecognised evaluates as `EN`,
    /// the strictest reading of a malformed row.
    pub fn parse(s: &str) -> Self {
        match s {
            "OF" => Self::Or,
            _ => Self::And,
        }
    }
}

/// One compartment rule row, as the matcher sees it.
#[derive(Debug, Clone)]
pub struct CompartmentRule {
    pub id: DbId,
    pub rule_group: i32,
    pub shipping_unit_id: DbId,
    pub quantity: i64,
    pub operator: RuleOperator,
    pub alternative_for_id: Option<DbId>,
    pub sort_order: i32,
    pub is_active: bool,
}

// ---------------------------------------------------------------------------
// Packaging catalog types
// ---------------------------------------------------------------------------

/// Physical packaging definition, the slice of the catalog row the engine
/// needs.
#[derive(Debug, Clone)]
pub struct PackagingInfo {
    pub id: DbId,
    /// WMS packaging identity; the outcome tracker compares on this.
    pub idpackaging: DbId,
    pub name: String,
    /// Label written back onto orders; falls back to `name` when unset.
    pub tag_name: Option<String>,
    /// Join key into the tariff system's cost entries.
    pub cost_sku: Option<String>,
    pub specificity_score: i32,
    pub volume_cm3: Option<f64>,
    pub max_weight_grams: Option<f64>,
    pub material_cost: f64,
    pub handling_cost: f64,
}

impl PackagingInfo {
    pub fn display_name(&self) -> &str {
        self.tag_name.as_deref().unwrap_or(&self.name)
    }
}

/// A packaging type together with its compartment rules: one entry of the
/// auto-advice catalog.
#[derive(Debug, Clone)]
pub struct PackagingCandidate {
    pub packaging: PackagingInfo,
    pub rules: Vec<CompartmentRule>,
}

// ---------------------------------------------------------------------------
// Match result
// ---------------------------------------------------------------------------

/// A qualifying packaging with the units its winning rule group consumed
/// (`covered`) and what the order still has left (`leftover`). Cost fields
/// start from the packaging's own material + handling estimate and are
/// overwritten by cost enrichment when tariff data is available.
#[derive(Debug, Clone)]
pub struct PackagingMatch {
    pub packaging_id: DbId,
    pub idpackaging: DbId,
    pub name: String,
    pub cost_sku: Option<String>,
    pub rule_group: i32,
    pub covered: BTreeMap<DbId, i64>,
    pub leftover: BTreeMap<DbId, i64>,
    pub specificity_score: i32,
    pub volume_cm3: f64,
    pub max_weight_grams: f64,
    pub box_cost: f64,
    pub transport_cost: f64,
    pub total_cost: f64,
}

impl PackagingMatch {
    pub fn covered_total(&self) -> i64 {
        self.covered.values().sum()
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate every candidate against the order's unit counts.
///
/// Returns one match per qualifying packaging; with several qualifying
/// groups the one consuming the most units wins (ties: lowest group).
pub fn match_catalog(
    catalog: &[PackagingCandidate],
    counts: &BTreeMap<DbId, i64>,
) -> Vec<PackagingMatch> {
    if counts.is_empty() {
        return Vec::new();
    }
    catalog
        .iter()
        .filter_map(|candidate| match_candidate(candidate, counts))
        .collect()
}

/// Evaluate one packaging's rule groups. `None` when no group matches.
pub fn match_candidate(
    candidate: &PackagingCandidate,
    counts: &BTreeMap<DbId, i64>,
) -> Option<PackagingMatch> {
    let active: Vec<&CompartmentRule> =
        candidate.rules.iter().filter(|r| r.is_active).collect();
    if active.is_empty() {
        return None;
    }

    let mut groups: BTreeMap<i32, Vec<&CompartmentRule>> = BTreeMap::new();
    for rule in active {
        groups.entry(rule.rule_group).or_default().push(rule);
    }

    let mut best: Option<(i32, GroupOutcome)> = None;
    for (group, rules) in &groups {
        if let Some(outcome) = evaluate_group(rules, counts) {
            let better = match &best {
                None => true,
                Some((_, current)) => outcome.covered_total() > current.covered_total(),
            };
            if better {
                best = Some((*group, outcome));
            }
        }
    }

    let (rule_group, outcome) = best?;
    let p = &candidate.packaging;
    Some(PackagingMatch {
        packaging_id: p.id,
        idpackaging: p.idpackaging,
        name: p.display_name().to_string(),
        cost_sku: p.cost_sku.clone(),
        rule_group,
        covered: outcome.covered,
        leftover: outcome.leftover,
        specificity_score: p.specificity_score,
        volume_cm3: p.volume_cm3.unwrap_or(f64::INFINITY),
        max_weight_grams: p.max_weight_grams.unwrap_or(f64::INFINITY),
        box_cost: 0.0,
        transport_cost: 0.0,
        total_cost: p.material_cost + p.handling_cost,
    })
}

struct GroupOutcome {
    covered: BTreeMap<DbId, i64>,
    leftover: BTreeMap<DbId, i64>,
}

impl GroupOutcome {
    fn covered_total(&self) -> i64 {
        self.covered.values().sum()
    }
}

/// Evaluate a single rule group. Consumes quantities from a scratch copy of
/// the order counts so that two AND rules on the same unit both need their
/// share.
fn evaluate_group(
    rules: &[&CompartmentRule],
    counts: &BTreeMap<DbId, i64>,
) -> Option<GroupOutcome> {
    // Alternatives are rows pointing at another rule; they only play when
    // their target cannot be satisfied directly.
    let mut alternatives: HashMap<DbId, Vec<&CompartmentRule>> = HashMap::new();
    let mut and_rules: Vec<&CompartmentRule> = Vec::new();
    let mut or_rules: Vec<&CompartmentRule> = Vec::new();

    for rule in rules {
        match rule.alternative_for_id {
            Some(target) => alternatives.entry(target).or_default().push(rule),
            None => match rule.operator {
                RuleOperator::And => and_rules.push(rule),
                RuleOperator::Or => or_rules.push(rule),
            },
        }
    }

    // Deterministic evaluation order: by id, never sort_order.
    and_rules.sort_by_key(|r| r.id);
    or_rules.sort_by_key(|r| r.id);
    for alts in alternatives.values_mut() {
        alts.sort_by_key(|r| r.id);
    }

    // A group consisting only of alternatives constrains nothing.
    if and_rules.is_empty() && or_rules.is_empty() {
        return None;
    }

    let mut remaining = counts.clone();
    let mut covered: BTreeMap<DbId, i64> = BTreeMap::new();

    let mut consume = |remaining: &mut BTreeMap<DbId, i64>,
                       covered: &mut BTreeMap<DbId, i64>,
                       rule: &CompartmentRule|
     -> bool {
        let available = remaining.get(&rule.shipping_unit_id).copied().unwrap_or(0);
        if available < rule.quantity {
            return false;
        }
        remaining.insert(rule.shipping_unit_id, available - rule.quantity);
        *covered.entry(rule.shipping_unit_id).or_insert(0) += rule.quantity;
        true
    };

    // AND chain: every rule satisfied directly or through an alternative.
    for rule in &and_rules {
        if consume(&mut remaining, &mut covered, rule) {
            continue;
        }
        let substituted = alternatives
            .get(&rule.id)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .any(|alt| consume(&mut remaining, &mut covered, alt));
        if !substituted {
            return None;
        }
    }

    // OR tier: at least one rule must be satisfiable.
    if !or_rules.is_empty() {
        let any = or_rules
            .iter()
            .any(|rule| consume(&mut remaining, &mut covered, rule));
        if !any {
            return None;
        }
    }

    let leftover: BTreeMap<DbId, i64> = remaining
        .into_iter()
        .filter(|(_, qty)| *qty > 0)
        .collect();

    Some(GroupOutcome { covered, leftover })
}
