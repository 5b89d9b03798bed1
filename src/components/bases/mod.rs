//! Shared field sets for component families.
//!
//! Leaf types embed one of these by value and overlay its command table on
//! their own, so a wearable-derived leaf answers `profile`, `bulky` and so on
//! without repeating them.

pub mod ammunition;
pub mod implant;
pub mod powered;
pub mod wearable;

pub use ammunition::AmmunitionBase;
pub use implant::ImplantBase;
pub use powered::PoweredMachineBase;
pub use wearable::WearableBase;
