//! Candidate packaging ranking.
//!
//! Strict tie-break sequence: specificity score (higher first), then usable
//! volume (smaller first), then total shipping cost for the destination
//! country (lower first). Fit dominates economics; cost only separates
//! otherwise-equal candidates. When the tariff source is unreachable the
//! cost tier is skipped and ordering falls back to specificity + size.
//!
//! The final tie on packaging id makes the ordering total, so repeated runs
//! over identical inputs produce identical advice (required for regression
//! tests and for outcome comparison to be meaningful).

use std::cmp::Ordering;

use crate::compartment::PackagingMatch;

/// Sort matches best-first. `cost_available` reflects whether tariff data
/// was reachable for the destination country.
pub fn rank_matches(mut matches: Vec<PackagingMatch>, cost_available: bool) -> Vec<PackagingMatch> {
    matches.sort_by(|a, b| compare(a, b, cost_available));
    matches
}

fn compare(a: &PackagingMatch, b: &PackagingMatch, cost_available: bool) -> Ordering {
    b.specificity_score
        .cmp(&a.specificity_score)
        .then_with(|| a.volume_cm3.total_cmp(&b.volume_cm3))
        .then_with(|| {
            if cost_available {
                a.total_cost.total_cmp(&b.total_cost)
            } else {
                Ordering::Equal
            }
        })
        .then_with(|| a.packaging_id.cmp(&b.packaging_id))
}
