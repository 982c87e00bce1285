//! Stateless repository structs, one per aggregate. Each function takes the
//! pool explicitly so callers control transaction scope.

pub mod advice_repo;
pub mod compartment_rule_repo;
pub mod packaging_repo;
pub mod packing_session_repo;
pub mod product_attribute_repo;
pub mod shipping_unit_repo;

pub use advice_repo::AdviceRepo;
pub use compartment_rule_repo::CompartmentRuleRepo;
pub use packaging_repo::PackagingRepo;
pub use packing_session_repo::PackingSessionRepo;
pub use product_attribute_repo::ProductAttributeRepo;
pub use shipping_unit_repo::ShippingUnitRepo;
