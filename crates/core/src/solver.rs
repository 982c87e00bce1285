//! Multi-box solving: from classified unit counts to concrete advice boxes.
//!
//! The solver is pure: it receives the packaging catalog, the order's
//! classified lines, and (optionally) the destination country's cost table,
//! and produces the ordered list of advice boxes. Assignment happens in
//! phases:
//!
//! 1. operator overrides — lines whose product declares a default
//!    packaging are assigned to it before any ranking runs;
//! 2. non-mixable lines — each unit goes into its own box via a perfect
//!    single-unit match;
//! 3. the remaining pool — one box when a ranked match covers everything,
//!    otherwise a greedy split taking the best-covering match per round;
//! 4. if the pool cannot be placed at all, a fallback assigns lines to
//!    their shipping unit's default packaging.
//!
//! The solver never fails: an unsolvable order yields an empty box list
//! (the orchestrator persists it with status `no_match`).

use std::collections::{BTreeMap, HashMap};

use crate::advice::{AdviceBox, BoxProduct, Confidence, COMPOSITION_PARTS_CODE};
use crate::classification::{ClassificationStatus, ClassifiedOrder, LineAttributes, OrderLine};
use crate::compartment::{match_catalog, PackagingCandidate, PackagingInfo, PackagingMatch};
use crate::costs::{enrich_matches, select_for_weight, CountryCosts};
use crate::ranking::rank_matches;
use crate::types::DbId;

/// Greedy split safety bound; an order never sensibly needs more boxes.
const MAX_SPLIT_ITERATIONS: usize = 20;

/// Name used when a shipping unit has no display name on file.
const UNKNOWN_UNIT: &str = "Unknown";

// ---------------------------------------------------------------------------
// Input / output
// ---------------------------------------------------------------------------

/// Everything the solver needs, loaded by the orchestrator.
pub struct SolveInput<'a> {
    /// Active, auto-advice-enabled packagings with their compartment rules.
    pub catalog: &'a [PackagingCandidate],
    /// All active packagings by id; override and fallback targets may sit
    /// outside the auto-advice catalog.
    pub packagings: &'a BTreeMap<DbId, PackagingInfo>,
    /// Shipping unit id -> display name.
    pub unit_names: &'a BTreeMap<DbId, String>,
    /// Shipping unit id -> default packaging id.
    pub unit_defaults: &'a BTreeMap<DbId, DbId>,
    pub lines: &'a [OrderLine],
    /// Product attributes keyed by `picqer_product_id`.
    pub attrs: &'a HashMap<DbId, LineAttributes>,
    pub classified: &'a ClassifiedOrder,
    /// Destination country cost table; `None` = tariff source unreachable.
    pub costs: Option<&'a CountryCosts>,
}

#[derive(Debug, Clone)]
pub struct Solution {
    pub boxes: Vec<AdviceBox>,
    pub confidence: Confidence,
    pub weight_exceeded: bool,
    pub used_fallback: bool,
}

struct BuiltBox {
    advice: AdviceBox,
    exceeded: bool,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn solve(input: &SolveInput) -> Solution {
    let has_unclassified = !input.classified.unclassified.is_empty();

    if input.classified.unit_counts.is_empty() {
        return Solution {
            boxes: Vec::new(),
            confidence: Confidence::Low,
            weight_exceeded: false,
            used_fallback: false,
        };
    }

    if let Some(built) = solve_exact(input) {
        let weight_exceeded = built.iter().any(|b| b.exceeded);
        let boxes: Vec<AdviceBox> = built.into_iter().map(|b| b.advice).collect();
        let confidence =
            Confidence::derive(boxes.len(), has_unclassified, weight_exceeded, false);
        return Solution {
            boxes,
            confidence,
            weight_exceeded,
            used_fallback: false,
        };
    }

    solve_fallback(input, has_unclassified)
}

// ---------------------------------------------------------------------------
// Exact solving (phases 1-3)
// ---------------------------------------------------------------------------

fn solve_exact(input: &SolveInput) -> Option<Vec<BuiltBox>> {
    let cost_available = input.costs.is_some();
    let mut pool = input.classified.unit_counts.clone();
    let mut line_remaining: Vec<i64> = input.lines.iter().map(|l| l.quantity).collect();
    let mut boxes: Vec<BuiltBox> = Vec::new();

    // --- Phase 1: operator overrides -----------------------------------
    // Group override lines per target packaging; explicit operator intent
    // beats automatic ranking, so these never enter the matcher at all.
    let mut override_groups: BTreeMap<DbId, Vec<usize>> = BTreeMap::new();
    for (idx, line) in input.lines.iter().enumerate() {
        let Some(attr) = input.attrs.get(&line.picqer_product_id) else {
            continue;
        };
        if attr.status != ClassificationStatus::Classified {
            continue;
        }
        let (Some(pkg_id), Some(_)) = (attr.default_packaging_id, attr.shipping_unit_id) else {
            continue;
        };
        // Unknown override targets fall through to normal solving.
        if !input.packagings.contains_key(&pkg_id) {
            continue;
        }
        override_groups.entry(pkg_id).or_default().push(idx);
    }

    for (pkg_id, idxs) in override_groups {
        let info = &input.packagings[&pkg_id];
        let mut products = Vec::new();
        let mut weight = 0.0;
        for idx in idxs {
            let line = &input.lines[idx];
            let attr = &input.attrs[&line.picqer_product_id];
            let unit_id = attr.shipping_unit_id.expect("override lines have a unit");
            products.push(BoxProduct {
                product_code: line.product_code.clone(),
                shipping_unit_name: unit_name(input, unit_id),
                quantity: line.quantity,
            });
            weight += attr.weight_grams * line.quantity as f64;
            decrement(&mut pool, unit_id, line.quantity);
            line_remaining[idx] = 0;
        }
        boxes.push(build_from_info(info, products, weight, input.costs));
    }

    // --- Phase 2: non-mixable lines ------------------------------------
    for (idx, line) in input.lines.iter().enumerate() {
        if line_remaining[idx] == 0 {
            continue;
        }
        let Some(attr) = input.attrs.get(&line.picqer_product_id) else {
            continue;
        };
        if attr.is_mixable || attr.status != ClassificationStatus::Classified {
            continue;
        }
        let Some(unit_id) = attr.shipping_unit_id else {
            continue;
        };
        let name = unit_name(input, unit_id);
        for _ in 0..line.quantity {
            let single: BTreeMap<DbId, i64> = [(unit_id, 1)].into_iter().collect();
            let matches = enrich_matches(match_catalog(input.catalog, &single), input.costs);
            let ranked = rank_matches(matches, cost_available);
            // A non-mixable unit needs a dedicated perfect fit; a box with
            // leftover capacity would invite mixing.
            let perfect = ranked.into_iter().find(|m| m.leftover.is_empty())?;
            let product = BoxProduct {
                product_code: line.product_code.clone(),
                shipping_unit_name: name.clone(),
                quantity: 1,
            };
            boxes.push(build_from_match(
                &perfect,
                vec![product],
                attr.weight_grams,
                input.costs,
            ));
            decrement(&mut pool, unit_id, 1);
        }
        line_remaining[idx] = 0;
    }

    // --- Phase 3: remaining pool ---------------------------------------
    if !pool.is_empty() {
        let matches = enrich_matches(match_catalog(input.catalog, &pool), input.costs);
        let ranked = rank_matches(matches, cost_available);

        if let Some(single) = ranked.iter().find(|m| m.leftover.is_empty()) {
            let products = take_products(&single.covered, input, &mut line_remaining);
            let weight = products_weight(&products, input);
            boxes.push(build_from_match(single, products, weight, input.costs));
            pool.clear();
        } else {
            let mut iterations = 0;
            while !pool.is_empty() && iterations < MAX_SPLIT_ITERATIONS {
                iterations += 1;
                let matches =
                    enrich_matches(match_catalog(input.catalog, &pool), input.costs);
                let ranked = rank_matches(matches, cost_available);
                if ranked.is_empty() {
                    return None;
                }
                let best = pick_best_coverage(&ranked);
                let products = take_products(&best.covered, input, &mut line_remaining);
                let weight = products_weight(&products, input);
                for (unit_id, qty) in &best.covered {
                    decrement(&mut pool, *unit_id, *qty);
                }
                boxes.push(build_from_match(best, products, weight, input.costs));
            }
            if !pool.is_empty() {
                return None;
            }
        }
    }

    Some(boxes)
}

/// The match covering the most units wins; ties keep the ranking order.
fn pick_best_coverage<'m>(ranked: &'m [PackagingMatch]) -> &'m PackagingMatch {
    let mut best = &ranked[0];
    let mut best_coverage = best.covered_total();
    for m in &ranked[1..] {
        let coverage = m.covered_total();
        if coverage > best_coverage {
            best = m;
            best_coverage = coverage;
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Fallback (phase 4)
// ---------------------------------------------------------------------------

/// Assign every detected unit to its shipping unit's default packaging.
/// Only applies when every unit has one; otherwise the order is a no-match.
fn solve_fallback(input: &SolveInput, has_unclassified: bool) -> Solution {
    let no_match = Solution {
        boxes: Vec::new(),
        confidence: Confidence::Low,
        weight_exceeded: false,
        used_fallback: false,
    };

    for unit_id in input.classified.unit_counts.keys() {
        let Some(pkg_id) = input.unit_defaults.get(unit_id) else {
            return no_match;
        };
        if !input.packagings.contains_key(pkg_id) {
            return no_match;
        }
    }

    let mut line_remaining: Vec<i64> = input.lines.iter().map(|l| l.quantity).collect();
    let mut groups: BTreeMap<DbId, Vec<BoxProduct>> = BTreeMap::new();

    for (unit_id, count) in &input.classified.unit_counts {
        let pkg_id = input.unit_defaults[unit_id];
        let single: BTreeMap<DbId, i64> = [(*unit_id, *count)].into_iter().collect();
        let products = take_products(&single, input, &mut line_remaining);
        groups.entry(pkg_id).or_default().extend(products);
    }

    let built: Vec<BuiltBox> = groups
        .into_iter()
        .map(|(pkg_id, products)| {
            let info = &input.packagings[&pkg_id];
            let weight = products_weight(&products, input);
            build_from_info(info, products, weight, input.costs)
        })
        .collect();

    let weight_exceeded = built.iter().any(|b| b.exceeded);
    let boxes: Vec<AdviceBox> = built.into_iter().map(|b| b.advice).collect();
    Solution {
        confidence: Confidence::derive(boxes.len(), has_unclassified, weight_exceeded, true),
        weight_exceeded,
        used_fallback: true,
        boxes,
    }
}

// ---------------------------------------------------------------------------
// Box construction helpers
// ---------------------------------------------------------------------------

/// Draw products for the covered units from the order lines, in line order.
/// Quantities that no line accounts for (composition expansion) become a
/// generic composition-parts entry.
fn take_products(
    covered: &BTreeMap<DbId, i64>,
    input: &SolveInput,
    line_remaining: &mut [i64],
) -> Vec<BoxProduct> {
    let mut result = Vec::new();
    for (unit_id, covered_qty) in covered {
        let name = unit_name(input, *unit_id);
        let mut remaining = *covered_qty;
        for (idx, line) in input.lines.iter().enumerate() {
            if remaining == 0 {
                break;
            }
            let Some(attr) = input.attrs.get(&line.picqer_product_id) else {
                continue;
            };
            if attr.status != ClassificationStatus::Classified
                || attr.shipping_unit_id != Some(*unit_id)
            {
                continue;
            }
            let take = remaining.min(line_remaining[idx]);
            if take > 0 {
                result.push(BoxProduct {
                    product_code: line.product_code.clone(),
                    shipping_unit_name: name.clone(),
                    quantity: take,
                });
                line_remaining[idx] -= take;
                remaining -= take;
            }
        }
        if remaining > 0 {
            result.push(BoxProduct {
                product_code: COMPOSITION_PARTS_CODE.to_string(),
                shipping_unit_name: name,
                quantity: remaining,
            });
        }
    }
    result
}

fn products_weight(products: &[BoxProduct], input: &SolveInput) -> f64 {
    let weight_by_code: HashMap<&str, f64> = input
        .attrs
        .values()
        .map(|a| (a.product_code.as_str(), a.weight_grams))
        .collect();
    products
        .iter()
        .map(|p| weight_by_code.get(p.product_code.as_str()).copied().unwrap_or(0.0) * p.quantity as f64)
        .sum()
}

fn build_from_match(
    m: &PackagingMatch,
    products: Vec<BoxProduct>,
    weight: f64,
    costs: Option<&CountryCosts>,
) -> BuiltBox {
    let mut advice = AdviceBox {
        packaging_id: m.packaging_id,
        idpackaging: m.idpackaging,
        packaging_name: m.name.clone(),
        products,
        box_cost: none_if_zero(m.box_cost),
        transport_cost: none_if_zero(m.transport_cost),
        total_cost: none_if_zero(m.total_cost),
        weight_grams: weight,
        weight_bracket: None,
    };
    refine_cost(&mut advice, m.cost_sku.as_deref(), weight, costs);
    BuiltBox {
        exceeded: weight > m.max_weight_grams,
        advice,
    }
}

fn build_from_info(
    info: &PackagingInfo,
    products: Vec<BoxProduct>,
    weight: f64,
    costs: Option<&CountryCosts>,
) -> BuiltBox {
    let mut advice = AdviceBox {
        packaging_id: info.id,
        idpackaging: info.idpackaging,
        packaging_name: info.display_name().to_string(),
        products,
        box_cost: None,
        transport_cost: None,
        total_cost: none_if_zero(info.material_cost + info.handling_cost),
        weight_grams: weight,
        weight_bracket: None,
    };
    refine_cost(&mut advice, info.cost_sku.as_deref(), weight, costs);
    BuiltBox {
        exceeded: weight > info.max_weight_grams.unwrap_or(f64::INFINITY),
        advice,
    }
}

/// Replace the ranking-time cost estimate with the weight-correct bracket
/// once the box contents are final. Keeps the estimate when no bracket
/// fits.
fn refine_cost(
    advice: &mut AdviceBox,
    cost_sku: Option<&str>,
    weight: f64,
    costs: Option<&CountryCosts>,
) {
    let (Some(costs), Some(sku)) = (costs, cost_sku) else {
        return;
    };
    let Some(entries) = costs.get(sku) else {
        return;
    };
    let Some(entry) = select_for_weight(entries, weight) else {
        return;
    };
    advice.box_cost = Some(entry.box_cost);
    advice.transport_cost = Some(entry.transport_cost);
    advice.total_cost = Some(entry.total_cost);
    advice.weight_bracket = entry.weight_bracket.clone();
}

fn unit_name(input: &SolveInput, unit_id: DbId) -> String {
    input
        .unit_names
        .get(&unit_id)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_UNIT.to_string())
}

fn decrement(pool: &mut BTreeMap<DbId, i64>, unit_id: DbId, qty: i64) {
    if let Some(current) = pool.get_mut(&unit_id) {
        *current -= qty;
        if *current <= 0 {
            pool.remove(&unit_id);
        }
    }
}

fn none_if_zero(value: f64) -> Option<f64> {
    if value == 0.0 {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compartment::{CompartmentRule, RuleOperator};
    use crate::costs::CostEntry;

    // -----------------------------------------------------------------------
    // Fixture helpers
    // -----------------------------------------------------------------------

    fn rule(id: DbId, group: i32, unit: DbId, qty: i64, op: RuleOperator) -> CompartmentRule {
        CompartmentRule {
            id,
            rule_group: group,
            shipping_unit_id: unit,
            quantity: qty,
            operator: op,
            alternative_for_id: None,
            sort_order: id as i32,
            is_active: true,
        }
    }

    fn packaging(id: DbId, specificity: i32, volume: f64) -> PackagingInfo {
        PackagingInfo {
            id,
            idpackaging: id * 10,
            name: format!("Box {id}"),
            tag_name: None,
            cost_sku: None,
            specificity_score: specificity,
            volume_cm3: Some(volume),
            max_weight_grams: Some(10_000.0),
            material_cost: 1.0,
            handling_cost: 0.5,
        }
    }

    fn line(code: &str, pid: DbId, qty: i64) -> OrderLine {
        OrderLine {
            product_code: code.to_string(),
            picqer_product_id: pid,
            quantity: qty,
        }
    }

    fn attr(pid: DbId, code: &str, unit: DbId) -> LineAttributes {
        LineAttributes {
            picqer_product_id: pid,
            product_code: code.to_string(),
            status: ClassificationStatus::Classified,
            shipping_unit_id: Some(unit),
            is_composition: false,
            is_mixable: true,
            weight_grams: 500.0,
            default_packaging_id: None,
        }
    }

    struct Fixture {
        catalog: Vec<PackagingCandidate>,
        packagings: BTreeMap<DbId, PackagingInfo>,
        unit_names: BTreeMap<DbId, String>,
        unit_defaults: BTreeMap<DbId, DbId>,
        lines: Vec<OrderLine>,
        attrs: HashMap<DbId, LineAttributes>,
        classified: ClassifiedOrder,
        costs: Option<CountryCosts>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                catalog: Vec::new(),
                packagings: BTreeMap::new(),
                unit_names: [(7, "pot-12cm".to_string()), (8, "fragile".to_string())]
                    .into_iter()
                    .collect(),
                unit_defaults: BTreeMap::new(),
                lines: Vec::new(),
                attrs: HashMap::new(),
                classified: ClassifiedOrder::default(),
                costs: None,
            }
        }

        fn add_candidate(&mut self, info: PackagingInfo, rules: Vec<CompartmentRule>) {
            self.packagings.insert(info.id, info.clone());
            self.catalog.push(PackagingCandidate { packaging: info, rules });
        }

        fn add_line(&mut self, code: &str, pid: DbId, qty: i64, unit: DbId) {
            self.lines.push(line(code, pid, qty));
            self.attrs.insert(pid, attr(pid, code, unit));
            *self.classified.unit_counts.entry(unit).or_insert(0) += qty;
        }

        fn solve(&self) -> Solution {
            solve(&SolveInput {
                catalog: &self.catalog,
                packagings: &self.packagings,
                unit_names: &self.unit_names,
                unit_defaults: &self.unit_defaults,
                lines: &self.lines,
                attrs: &self.attrs,
                classified: &self.classified,
                costs: self.costs.as_ref(),
            })
        }
    }

    // -----------------------------------------------------------------------
    // Single box
    // -----------------------------------------------------------------------

    #[test]
    fn three_pots_fill_one_matching_box() {
        // Scenario A: packaging requires AND(pot-12cm >= 3).
        let mut f = Fixture::new();
        f.add_candidate(packaging(1, 50, 1000.0), vec![rule(1, 1, 7, 3, RuleOperator::And)]);
        f.add_line("POT-A", 101, 3, 7);

        let solution = f.solve();
        assert_eq!(solution.boxes.len(), 1);
        assert_eq!(solution.boxes[0].packaging_id, 1);
        assert_eq!(solution.boxes[0].products.len(), 1);
        assert_eq!(solution.boxes[0].products[0].quantity, 3);
        assert_eq!(solution.confidence, Confidence::High);
        assert!(!solution.weight_exceeded);
        assert!(!solution.used_fallback);
    }

    #[test]
    fn single_box_spans_multiple_lines_and_units() {
        let mut f = Fixture::new();
        f.add_candidate(
            packaging(1, 50, 1000.0),
            vec![
                rule(1, 1, 7, 2, RuleOperator::And),
                rule(2, 1, 8, 1, RuleOperator::And),
            ],
        );
        f.add_line("POT-A", 101, 2, 7);
        f.add_line("VASE-B", 102, 1, 8);

        let solution = f.solve();
        assert_eq!(solution.boxes.len(), 1);
        assert_eq!(solution.boxes[0].products.len(), 2);
        assert_eq!(solution.confidence, Confidence::High);
        // 2 x 500g + 1 x 500g
        assert_eq!(solution.boxes[0].weight_grams, 1500.0);
    }

    #[test]
    fn best_ranked_box_wins_when_several_fit() {
        let mut f = Fixture::new();
        f.add_candidate(packaging(1, 50, 2000.0), vec![rule(1, 1, 7, 1, RuleOperator::And)]);
        f.add_candidate(packaging(2, 80, 3000.0), vec![rule(2, 1, 7, 1, RuleOperator::And)]);
        f.add_line("POT-A", 101, 1, 7);

        let solution = f.solve();
        assert_eq!(solution.boxes[0].packaging_id, 2);
    }

    // -----------------------------------------------------------------------
    // Greedy split
    // -----------------------------------------------------------------------

    #[test]
    fn oversized_order_splits_into_multiple_boxes() {
        // The box takes at most 2 pots; the order has 5.
        let mut f = Fixture::new();
        f.add_candidate(packaging(1, 50, 1000.0), vec![rule(1, 1, 7, 2, RuleOperator::And)]);
        // A second group accepting a single pot lets the tail match too.
        f.catalog[0].rules.push(rule(2, 2, 7, 1, RuleOperator::And));
        f.add_line("POT-A", 101, 5, 7);

        let solution = f.solve();
        let total: i64 = solution
            .boxes
            .iter()
            .flat_map(|b| b.products.iter())
            .map(|p| p.quantity)
            .sum();
        assert_eq!(total, 5);
        assert_eq!(solution.boxes.len(), 3); // 2 + 2 + 1
        assert_eq!(solution.confidence, Confidence::Medium);
    }

    #[test]
    fn unplaceable_remainder_without_fallback_is_no_match() {
        let mut f = Fixture::new();
        f.add_candidate(packaging(1, 50, 1000.0), vec![rule(1, 1, 7, 2, RuleOperator::And)]);
        // 3 pots: one box of 2 fits, the last pot matches nothing.
        f.add_line("POT-A", 101, 3, 7);

        let solution = f.solve();
        assert!(solution.boxes.is_empty());
        assert_eq!(solution.confidence, Confidence::Low);
        assert!(!solution.used_fallback);
    }

    // -----------------------------------------------------------------------
    // Operator override
    // -----------------------------------------------------------------------

    #[test]
    fn default_packaging_override_bypasses_ranking() {
        let mut f = Fixture::new();
        // The catalog would happily put the pot into box 1...
        f.add_candidate(packaging(1, 90, 500.0), vec![rule(1, 1, 7, 1, RuleOperator::And)]);
        // ...but the product pins itself to packaging 5.
        let override_target = packaging(5, 10, 9000.0);
        f.packagings.insert(5, override_target);
        f.add_line("POT-A", 101, 1, 7);
        f.attrs.get_mut(&101).unwrap().default_packaging_id = Some(5);

        let solution = f.solve();
        assert_eq!(solution.boxes.len(), 1);
        assert_eq!(solution.boxes[0].packaging_id, 5);
        assert_eq!(solution.confidence, Confidence::High);
    }

    #[test]
    fn override_lines_share_a_box_per_target() {
        let mut f = Fixture::new();
        let target = packaging(5, 10, 9000.0);
        f.packagings.insert(5, target);
        f.add_line("POT-A", 101, 2, 7);
        f.add_line("POT-B", 102, 1, 7);
        f.attrs.get_mut(&101).unwrap().default_packaging_id = Some(5);
        f.attrs.get_mut(&102).unwrap().default_packaging_id = Some(5);

        let solution = f.solve();
        assert_eq!(solution.boxes.len(), 1);
        assert_eq!(solution.boxes[0].products.len(), 2);
    }

    // -----------------------------------------------------------------------
    // Non-mixable products
    // -----------------------------------------------------------------------

    #[test]
    fn non_mixable_units_each_get_their_own_box() {
        let mut f = Fixture::new();
        f.add_candidate(packaging(1, 50, 1000.0), vec![rule(1, 1, 8, 1, RuleOperator::And)]);
        f.add_line("FRAGILE-X", 101, 2, 8);
        f.attrs.get_mut(&101).unwrap().is_mixable = false;

        let solution = f.solve();
        assert_eq!(solution.boxes.len(), 2);
        for b in &solution.boxes {
            assert_eq!(b.products.len(), 1);
            assert_eq!(b.products[0].quantity, 1);
        }
        assert_eq!(solution.confidence, Confidence::Medium);
    }

    #[test]
    fn non_mixable_without_perfect_match_is_no_match() {
        let mut f = Fixture::new();
        // Only box requires 2 units, so a single unit always leaves a gap.
        f.add_candidate(packaging(1, 50, 1000.0), vec![rule(1, 1, 8, 2, RuleOperator::And)]);
        f.add_line("FRAGILE-X", 101, 1, 8);
        f.attrs.get_mut(&101).unwrap().is_mixable = false;

        let solution = f.solve();
        assert!(solution.boxes.is_empty());
    }

    // -----------------------------------------------------------------------
    // Default-unit fallback
    // -----------------------------------------------------------------------

    #[test]
    fn fallback_assigns_units_to_default_packaging() {
        let mut f = Fixture::new();
        // No catalog entry matches, but the unit declares a default.
        let fallback_box = packaging(9, 0, 5000.0);
        f.packagings.insert(9, fallback_box);
        f.unit_defaults.insert(7, 9);
        f.add_line("POT-A", 101, 4, 7);

        let solution = f.solve();
        assert!(solution.used_fallback);
        assert_eq!(solution.boxes.len(), 1);
        assert_eq!(solution.boxes[0].packaging_id, 9);
        assert_eq!(solution.boxes[0].products[0].quantity, 4);
        assert_eq!(solution.confidence, Confidence::Low);
    }

    #[test]
    fn fallback_requires_defaults_for_every_unit() {
        let mut f = Fixture::new();
        let fallback_box = packaging(9, 0, 5000.0);
        f.packagings.insert(9, fallback_box);
        f.unit_defaults.insert(7, 9);
        f.add_line("POT-A", 101, 1, 7);
        f.add_line("VASE-B", 102, 1, 8); // unit 8 has no default

        let solution = f.solve();
        assert!(solution.boxes.is_empty());
        assert!(!solution.used_fallback);
    }

    // -----------------------------------------------------------------------
    // Weight handling
    // -----------------------------------------------------------------------

    #[test]
    fn overweight_box_sets_flag_and_lowers_confidence() {
        let mut f = Fixture::new();
        let mut info = packaging(1, 50, 1000.0);
        info.max_weight_grams = Some(800.0);
        f.add_candidate(info, vec![rule(1, 1, 7, 3, RuleOperator::And)]);
        f.add_line("POT-A", 101, 3, 7); // 1500g > 800g

        let solution = f.solve();
        assert_eq!(solution.boxes.len(), 1);
        assert!(solution.weight_exceeded);
        assert_eq!(solution.confidence, Confidence::Low);
    }

    // -----------------------------------------------------------------------
    // Cost integration
    // -----------------------------------------------------------------------

    fn cost_entry(bracket: Option<&str>, total: f64) -> CostEntry {
        CostEntry {
            box_sku: "SKU-1".to_string(),
            weight_bracket: bracket.map(str::to_string),
            box_cost: 1.0,
            transport_cost: total - 1.0,
            total_cost: total,
            carrier: "postnl".to_string(),
        }
    }

    #[test]
    fn box_cost_refined_to_weight_bracket() {
        let mut f = Fixture::new();
        let mut info = packaging(1, 50, 1000.0);
        info.cost_sku = Some("SKU-1".to_string());
        f.add_candidate(info, vec![rule(1, 1, 7, 3, RuleOperator::And)]);
        f.add_line("POT-A", 101, 3, 7); // 1500g -> 0-5kg bracket

        let mut costs = CountryCosts::new();
        costs.insert(
            "SKU-1".to_string(),
            vec![cost_entry(Some("0-5kg"), 4.0), cost_entry(Some("5-10kg"), 6.0)],
        );
        f.costs = Some(costs);

        let solution = f.solve();
        let b = &solution.boxes[0];
        assert_eq!(b.weight_bracket.as_deref(), Some("0-5kg"));
        assert_eq!(b.total_cost, Some(4.0));
    }

    #[test]
    fn unreachable_cost_source_still_produces_advice() {
        // Scenario E: costs = None; ranking falls back to specificity+size.
        let mut f = Fixture::new();
        let mut sku_box = packaging(1, 50, 1000.0);
        sku_box.cost_sku = Some("SKU-1".to_string());
        f.add_candidate(sku_box, vec![rule(1, 1, 7, 1, RuleOperator::And)]);
        f.add_line("POT-A", 101, 1, 7);
        f.costs = None;

        let solution = f.solve();
        assert_eq!(solution.boxes.len(), 1);
        assert_eq!(solution.boxes[0].weight_bracket, None);
    }

    // -----------------------------------------------------------------------
    // Unclassified handling
    // -----------------------------------------------------------------------

    #[test]
    fn unclassified_lines_lower_confidence_but_keep_advice() {
        // Scenario B: one line classifies, one does not.
        let mut f = Fixture::new();
        f.add_candidate(packaging(1, 50, 1000.0), vec![rule(1, 1, 7, 1, RuleOperator::And)]);
        f.add_line("POT-A", 101, 1, 7);
        f.classified.unclassified.push("MYSTERY".to_string());

        let solution = f.solve();
        assert_eq!(solution.boxes.len(), 1);
        assert_eq!(solution.confidence, Confidence::Low);
    }

    #[test]
    fn nothing_classified_yields_no_boxes() {
        let mut f = Fixture::new();
        f.classified.unclassified.push("MYSTERY".to_string());
        let solution = f.solve();
        assert!(solution.boxes.is_empty());
        assert_eq!(solution.confidence, Confidence::Low);
    }

    // -----------------------------------------------------------------------
    // Determinism
    // -----------------------------------------------------------------------

    #[test]
    fn repeated_solves_produce_identical_boxes() {
        let mut f = Fixture::new();
        f.add_candidate(packaging(1, 50, 1000.0), vec![rule(1, 1, 7, 2, RuleOperator::And)]);
        f.add_candidate(packaging(2, 50, 1000.0), vec![rule(2, 1, 7, 2, RuleOperator::And)]);
        f.catalog[0].rules.push(rule(3, 2, 7, 1, RuleOperator::And));
        f.add_line("POT-A", 101, 5, 7);

        let first = f.solve();
        let second = f.solve();
        assert_eq!(first.boxes, second.boxes);
        assert_eq!(first.confidence, second.confidence);
    }
}
