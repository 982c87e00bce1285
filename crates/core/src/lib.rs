//! Pure domain logic for the FloraPack packaging advice engine.
//!
//! This crate has zero internal dependencies: every algorithm is a pure
//! function over caller-supplied data so it can be unit tested without a
//! database or HTTP stack. The `db` and `api` crates load rows, hand them
//! to these functions, and persist the results.

pub mod advice;
pub mod classification;
pub mod compartment;
pub mod costs;
pub mod error;
pub mod outcome;
pub mod ranking;
pub mod solver;
pub mod types;
