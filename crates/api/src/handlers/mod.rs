//! HTTP request handlers, one module per route group.

pub mod advice;
pub mod engine;
pub mod packing_session;
pub mod products;
