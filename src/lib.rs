//! # itemproto - Item Component Prototypes
//!
//! Revisioned, author-editable item component prototypes for a text-based
//! multiplayer game engine. Builders create component prototypes (belts,
//! armour, syringes, connectable sockets...) with line-oriented building
//! commands, submit them for approval, and revise approved ones
//! copy-on-write. Item prototypes combine approved components, and items
//! instantiated from them carry one runtime instance per component.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use itemproto::components::{ComponentManager, ComponentStore, InMemoryCatalog, MetricUnits};
//! use itemproto::olc::Workshop;
//!
//! fn main() -> anyhow::Result<()> {
//!     let store = ComponentStore::open("data/components")?;
//!     let mut workshop = Workshop::new(
//!         ComponentManager::with_builtin_types(),
//!         store,
//!         Box::new(InMemoryCatalog::new()),
//!         Box::new(MetricUnits),
//!         "builder",
//!     );
//!     println!("{}", workshop.handle_line("comp new belt \"leather belt\"")?);
//!     println!("{}", workshop.handle_line("capacity 3")?);
//!     println!("{}", workshop.handle_line("comp approve")?);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`components`] - the prototype contract, built-in types, items and storage
//! - [`olc`] - the line-oriented authoring workshop
//! - [`config`] - TOML configuration
//! - [`logutil`] - log sanitising helpers

pub mod components;
pub mod config;
pub mod logutil;
pub mod olc;
