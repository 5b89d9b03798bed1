//! # Item Components
//!
//! Component prototypes describe one facet an item can have (armour, belt,
//! syringe, power socket...). Each prototype is a revisioned envelope around a
//! type-specific definition that persists itself as an XML `<Definition>`,
//! answers building commands while in draft, and creates per-item instances
//! once approved.
//!
//! ## Layout
//!
//! - [`types`], [`units`], [`catalog`], [`input`], [`xml`] - shared value
//!   types and the collaborators components consult
//! - [`command`] - verb tables and argument helpers
//! - [`proto`] - the prototype contract and its lifecycle
//! - [`instance`] - runtime per-item component state
//! - [`manager`] - keyword and type-name registry
//! - [`bases`] - family structs embedded by leaf types
//! - [`kinds`] - the built-in component types
//! - [`item`] - item prototypes that aggregate components
//! - [`storage`] - sled persistence for prototypes

pub mod bases;
pub mod catalog;
pub mod command;
pub mod errors;
pub mod input;
pub mod instance;
pub mod item;
pub mod kinds;
pub mod manager;
pub mod proto;
pub mod storage;
pub mod types;
pub mod units;
pub mod xml;

pub use catalog::{Catalog, CatalogEntry, CatalogKind, InMemoryCatalog};
pub use command::{BuildContext, CommandOutcome};
pub use errors::ComponentError;
pub use input::StringStack;
pub use instance::ComponentInstance;
pub use item::{Item, ItemProto, PrototypeSet, PrototypeSource};
pub use manager::{ComponentManager, TypeHelp};
pub use proto::{ComponentDefinition, ComponentPrototype, ProtoHeader};
pub use storage::{ComponentStore, ComponentStoreBuilder};
pub use types::{
    CatalogId, Connectable, ConnectorGender, ConnectorType, Difficulty, ItemId, ProtoKey,
    RevisionStatus, SizeCategory,
};
pub use units::{MetricUnits, UnitConverter, UnitKind};
pub use xml::XmlElement;
