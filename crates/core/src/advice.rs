//! Advice payload types, lifecycle enums, and confidence derivation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Lifecycle enums
// ---------------------------------------------------------------------------

/// Lifecycle state of a persisted advice record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceStatus {
    /// Freshly calculated, current for its order.
    Calculated,
    /// Labels were written to the order in the WMS.
    Applied,
    /// Superseded by a newer calculation for the same order.
    Invalidated,
    /// No packaging type satisfied any rule group.
    NoMatch,
}

impl AdviceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Calculated => "calculated",
            Self::Applied => "applied",
            Self::Invalidated => "invalidated",
            Self::NoMatch => "no_match",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "calculated" => Some(Self::Calculated),
            "applied" => Some(Self::Applied),
            "invalidated" => Some(Self::Invalidated),
            "no_match" => Some(Self::NoMatch),
            _ => None,
        }
    }
}

/// How much the engine trusts its own advice.
///
/// Derivation precedence (most specific condition wins, top to bottom):
///
/// 1. any unclassified line, `weight_exceeded`, or the shipping-unit
///    default fallback -> `Low`
/// 2. exactly one box -> `High`
/// 3. complete multi-box split -> `Medium`
///
/// An advice without boxes carries `Low` alongside status `no_match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    /// Apply the documented precedence table.
    pub fn derive(
        box_count: usize,
        has_unclassified: bool,
        weight_exceeded: bool,
        used_fallback: bool,
    ) -> Self {
        if box_count == 0 || has_unclassified || weight_exceeded || used_fallback {
            Self::Low
        } else if box_count == 1 {
            Self::High
        } else {
            Self::Medium
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome enums
// ---------------------------------------------------------------------------

/// Post-hoc classification of the operator's actual packaging vs advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Followed,
    Modified,
    Ignored,
    NoAdvice,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Followed => "followed",
            Self::Modified => "modified",
            Self::Ignored => "ignored",
            Self::NoAdvice => "no_advice",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "followed" => Some(Self::Followed),
            "modified" => Some(Self::Modified),
            "ignored" => Some(Self::Ignored),
            "no_advice" => Some(Self::NoAdvice),
            _ => None,
        }
    }
}

/// Sub-classification of a `modified`/`ignored` outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationType {
    None,
    ExtraBoxes,
    FewerBoxes,
    DifferentPackaging,
    Mixed,
}

impl DeviationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ExtraBoxes => "extra_boxes",
            Self::FewerBoxes => "fewer_boxes",
            Self::DifferentPackaging => "different_packaging",
            Self::Mixed => "mixed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "extra_boxes" => Some(Self::ExtraBoxes),
            "fewer_boxes" => Some(Self::FewerBoxes),
            "different_packaging" => Some(Self::DifferentPackaging),
            "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Payload types (stored as JSONB on the advice row)
// ---------------------------------------------------------------------------

/// Label used in box contents for quantities that came from composition
/// expansion and cannot be attributed to a single order line.
pub const COMPOSITION_PARTS_CODE: &str = "(composition parts)";

/// One product assignment inside an advised box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxProduct {
    pub product_code: String,
    pub shipping_unit_name: String,
    pub quantity: i64,
}

/// One advised box: the packaging to use and what goes in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceBox {
    pub packaging_id: DbId,
    pub idpackaging: DbId,
    pub packaging_name: String,
    pub products: Vec<BoxProduct>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
    pub weight_grams: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_bracket: Option<String>,
}

/// Detected shipping-unit count, stored on the advice for operator review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedUnit {
    pub shipping_unit_id: DbId,
    pub shipping_unit_name: String,
    pub quantity: i64,
}

/// One box the operator actually built, snapshotted by the outcome tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualBox {
    pub idpackaging: Option<DbId>,
    pub packaging_name: String,
    pub products: Vec<ActualBoxProduct>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualBoxProduct {
    pub product_code: String,
    pub amount: i64,
}

// ---------------------------------------------------------------------------
// Fingerprint
// ---------------------------------------------------------------------------

/// Build the dedup fingerprint for an advice: destination country plus the
/// name-sorted unit counts. Two calculations with the same fingerprint are
/// guaranteed to produce the same advice, so the newer one can reuse the
/// stored record. `None` when no unit was detected (all lines
/// unclassified both times compares as equal-null, same as the original
/// behaviour).
pub fn unit_fingerprint(
    country_code: &str,
    unit_counts: &BTreeMap<DbId, i64>,
    unit_names: &BTreeMap<DbId, String>,
) -> Option<String> {
    if unit_counts.is_empty() {
        return None;
    }
    let mut parts: Vec<(String, i64)> = unit_counts
        .iter()
        .map(|(id, qty)| {
            let name = unit_names
                .get(id)
                .cloned()
                .unwrap_or_else(|| id.to_string());
            (name, *qty)
        })
        .collect();
    parts.sort();
    let joined = parts
        .iter()
        .map(|(name, qty)| format!("{name}:{qty}"))
        .collect::<Vec<_>>()
        .join("|");
    Some(format!("{country_code}|{joined}"))
}
