//! Row structs and DTOs, one module per aggregate.

pub mod advice;
pub mod compartment_rule;
pub mod packaging;
pub mod packing_session;
pub mod product_attribute;
pub mod shipping_unit;
