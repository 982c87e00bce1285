//! Outcome tracker: grades advice against the operator's actual packing.
//!
//! Runs after a packing session completes. Builds the actual-boxes snapshot
//! from the session, locates the advice through the `advice_id` reference on
//! any of its boxes, classifies the deviation with the pure multiset
//! comparison in `florapack-core`, and stores the result on the advice in a
//! single idempotent update. Re-invocation recomputes the same
//! classification from the same inputs.

use std::collections::HashMap;

use serde::Serialize;

use florapack_core::advice::{ActualBox, ActualBoxProduct, DeviationType, Outcome};
use florapack_core::error::CoreError;
use florapack_core::outcome::compute_outcome;
use florapack_core::types::DbId;
use florapack_db::models::advice::OutcomeUpdate;
use florapack_db::repositories::{AdviceRepo, PackingSessionRepo};
use florapack_db::DbPool;

use crate::error::AppError;

/// Classification of one graded session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionOutcome {
    pub outcome: Outcome,
    pub deviation_type: DeviationType,
}

/// Grade a completed packing session against its linked advice.
///
/// `Ok(None)` when no advice was ever linked to the session (or the linked
/// advice no longer exists) — no comparison is possible, which is not an
/// error.
pub async fn record_session_outcome(
    pool: &DbPool,
    session_id: DbId,
) -> Result<Option<SessionOutcome>, AppError> {
    let session = PackingSessionRepo::find_by_id(pool, session_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "PackingSession",
            id: session_id,
        })?;
    tracing::debug!(session_id, status = %session.status, "Grading packing session");

    let boxes = PackingSessionRepo::list_boxes(pool, session_id).await?;
    let Some(advice_id) = boxes.iter().find_map(|b| b.advice_id) else {
        tracing::info!(session_id, "No advice linked to session, nothing to grade");
        return Ok(None);
    };
    let Some(advice) = AdviceRepo::find_by_id(pool, advice_id).await? else {
        tracing::warn!(session_id, advice_id, "Linked advice no longer exists");
        return Ok(None);
    };

    // Actual-boxes snapshot: packaging identity plus per-box contents.
    let products = PackingSessionRepo::list_products(pool, session_id).await?;
    let mut contents: HashMap<DbId, Vec<ActualBoxProduct>> = HashMap::new();
    for p in products {
        contents.entry(p.box_id).or_default().push(ActualBoxProduct {
            product_code: p.product_code,
            amount: p.amount,
        });
    }
    let actual_boxes: Vec<ActualBox> = boxes
        .iter()
        .map(|b| ActualBox {
            idpackaging: b.idpackaging,
            packaging_name: b.packaging_name.clone(),
            products: contents.remove(&b.id).unwrap_or_default(),
        })
        .collect();

    // Compare on packaging identities; boxes packed outside the WMS catalog
    // (no idpackaging) cannot be matched and drop out, as in the snapshot.
    let advised: Vec<DbId> = advice
        .boxes()
        .map_err(|e| AppError::InternalError(format!("Corrupt advice payload: {e}")))?
        .iter()
        .map(|b| b.idpackaging)
        .collect();
    let actual: Vec<DbId> = actual_boxes.iter().filter_map(|b| b.idpackaging).collect();

    let (outcome, deviation_type) = compute_outcome(&advised, &actual);

    AdviceRepo::record_outcome(
        pool,
        advice_id,
        &OutcomeUpdate {
            outcome: outcome.as_str().to_string(),
            deviation_type: deviation_type.as_str().to_string(),
            actual_boxes,
        },
    )
    .await?;

    tracing::info!(
        session_id,
        advice_id,
        outcome = outcome.as_str(),
        deviation = deviation_type.as_str(),
        "Recorded session outcome",
    );
    Ok(Some(SessionOutcome {
        outcome,
        deviation_type,
    }))
}
