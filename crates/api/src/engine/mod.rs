//! Engine services: the advice orchestrator, the cost provider with its
//! process-wide cache, the outcome tracker, and the product classification
//! sweep. These wire the repositories in `florapack-db` to the pure logic
//! in `florapack-core`.

pub mod classification;
pub mod cost_provider;
pub mod orchestrator;
pub mod outcome;
