//! Advice-vs-actual outcome classification.
//!
//! Compares the multiset of advised packaging identities against the
//! multiset the operator actually used. Multiplicities matter: advised
//! `[A, A, B]` vs actual `[A, B, B]` differ even though the identity sets
//! are equal. Implemented with explicit counting maps so the partial
//! overlap cases stay readable and testable in isolation.

use std::collections::BTreeMap;

use crate::advice::{DeviationType, Outcome};
use crate::types::DbId;

/// Classify how the actual packaging relates to the advice.
///
/// Classification precedence:
///
/// 1. advice had no boxes -> `no_advice` / `none`
/// 2. identical multisets -> `followed` / `none`
/// 3. zero overlap (multiplicity-aware) -> `ignored` / `different_packaging`
/// 4. actual strictly contains advised -> `modified` / `extra_boxes`
/// 5. actual strictly contained in advised -> `modified` / `fewer_boxes`
/// 6. same length, different identity sets -> `modified` /
///    `different_packaging`
/// 7. anything else -> `modified` / `mixed`
///
/// Pure over its inputs and invariant under reordering of either list.
pub fn compute_outcome(advised: &[DbId], actual: &[DbId]) -> (Outcome, DeviationType) {
    if advised.is_empty() {
        return (Outcome::NoAdvice, DeviationType::None);
    }

    let advised_counts = count(advised);
    let actual_counts = count(actual);

    if advised_counts == actual_counts {
        return (Outcome::Followed, DeviationType::None);
    }

    let overlap: i64 = advised_counts
        .iter()
        .map(|(id, qty)| (*qty).min(actual_counts.get(id).copied().unwrap_or(0)))
        .sum();
    if overlap == 0 {
        return (Outcome::Ignored, DeviationType::DifferentPackaging);
    }

    let actual_contains_advised = advised_counts
        .iter()
        .all(|(id, qty)| actual_counts.get(id).copied().unwrap_or(0) >= *qty);
    if actual_contains_advised {
        return (Outcome::Modified, DeviationType::ExtraBoxes);
    }

    let advised_contains_actual = actual_counts
        .iter()
        .all(|(id, qty)| advised_counts.get(id).copied().unwrap_or(0) >= *qty);
    if advised_contains_actual {
        return (Outcome::Modified, DeviationType::FewerBoxes);
    }

    let same_length = advised.len() == actual.len();
    let same_identity_sets = advised_counts.len() == actual_counts.len()
        && advised_counts.keys().all(|id| actual_counts.contains_key(id));
    if same_length && !same_identity_sets {
        return (Outcome::Modified, DeviationType::DifferentPackaging);
    }

    (Outcome::Modified, DeviationType::Mixed)
}

fn count(ids: &[DbId]) -> BTreeMap<DbId, i64> {
    let mut counts = BTreeMap::new();
    for id in ids {
        *counts.entry(*id).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Exact and empty cases
    // -----------------------------------------------------------------------

    #[test]
    fn identical_multisets_are_followed() {
        assert_eq!(
            compute_outcome(&[10, 10, 20], &[10, 10, 20]),
            (Outcome::Followed, DeviationType::None)
        );
    }

    #[test]
    fn order_does_not_matter_for_followed() {
        assert_eq!(
            compute_outcome(&[10, 20, 10], &[20, 10, 10]),
            (Outcome::Followed, DeviationType::None)
        );
    }

    #[test]
    fn empty_advice_is_no_advice() {
        assert_eq!(
            compute_outcome(&[], &[10, 20]),
            (Outcome::NoAdvice, DeviationType::None)
        );
    }

    // -----------------------------------------------------------------------
    // Zero overlap
    // -----------------------------------------------------------------------

    #[test]
    fn disjoint_identities_are_ignored() {
        assert_eq!(
            compute_outcome(&[10, 20], &[30, 40]),
            (Outcome::Ignored, DeviationType::DifferentPackaging)
        );
    }

    #[test]
    fn empty_actual_is_ignored() {
        assert_eq!(
            compute_outcome(&[10], &[]),
            (Outcome::Ignored, DeviationType::DifferentPackaging)
        );
    }

    // -----------------------------------------------------------------------
    // Superset / subset
    // -----------------------------------------------------------------------

    #[test]
    fn extra_boxes_when_actual_contains_advised() {
        // Scenario D: advised [10, 20], actual [10, 20, 30].
        assert_eq!(
            compute_outcome(&[10, 20], &[10, 20, 30]),
            (Outcome::Modified, DeviationType::ExtraBoxes)
        );
    }

    #[test]
    fn extra_boxes_counts_multiplicity() {
        assert_eq!(
            compute_outcome(&[10], &[10, 10]),
            (Outcome::Modified, DeviationType::ExtraBoxes)
        );
    }

    #[test]
    fn fewer_boxes_when_actual_is_proper_subset() {
        assert_eq!(
            compute_outcome(&[10, 10, 20], &[10, 20]),
            (Outcome::Modified, DeviationType::FewerBoxes)
        );
    }

    #[test]
    fn shorter_actual_that_is_not_a_subset_is_mixed() {
        assert_eq!(
            compute_outcome(&[10, 10, 20], &[10, 30]),
            (Outcome::Modified, DeviationType::Mixed)
        );
    }

    // -----------------------------------------------------------------------
    // Equal length partial overlap
    // -----------------------------------------------------------------------

    #[test]
    fn equal_length_same_sets_different_multiplicity_is_mixed() {
        // Scenario C: advised [10, 10, 20], actual [10, 20, 20].
        assert_eq!(
            compute_outcome(&[10, 10, 20], &[10, 20, 20]),
            (Outcome::Modified, DeviationType::Mixed)
        );
    }

    #[test]
    fn equal_length_different_sets_is_different_packaging() {
        assert_eq!(
            compute_outcome(&[10, 20], &[10, 30]),
            (Outcome::Modified, DeviationType::DifferentPackaging)
        );
    }

    #[test]
    fn longer_actual_with_partial_overlap_is_mixed() {
        assert_eq!(
            compute_outcome(&[10, 10], &[10, 20, 30]),
            (Outcome::Modified, DeviationType::Mixed)
        );
    }

    // -----------------------------------------------------------------------
    // Permutation symmetry
    // -----------------------------------------------------------------------

    #[test]
    fn classification_is_invariant_under_reordering() {
        let advised = [10, 10, 20];
        let actual = [10, 20, 20];
        let reference = compute_outcome(&advised, &actual);

        let permutations = [
            vec![10, 20, 20],
            vec![20, 10, 20],
            vec![20, 20, 10],
        ];
        for p in permutations {
            assert_eq!(compute_outcome(&advised, &p), reference);
        }
    }

    #[test]
    fn recomputation_is_deterministic() {
        let advised = [10, 20];
        let actual = [10, 20, 30];
        assert_eq!(
            compute_outcome(&advised, &actual),
            compute_outcome(&advised, &actual)
        );
    }
}
