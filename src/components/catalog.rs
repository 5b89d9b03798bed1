//! Catalog lookup collaborator.
//!
//! Components refer to weapon types, gases, bodyparts, progs and other item
//! prototypes by catalog id. Authors may type either the id or the name.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::components::types::CatalogId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    WeaponType,
    ArmourType,
    ShieldType,
    Gas,
    Liquid,
    AmmunitionType,
    ItemProto,
    BodyProto,
    Bodypart,
    Prog,
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CatalogKind::WeaponType => "weapon type",
            CatalogKind::ArmourType => "armour type",
            CatalogKind::ShieldType => "shield type",
            CatalogKind::Gas => "gas",
            CatalogKind::Liquid => "liquid",
            CatalogKind::AmmunitionType => "ammunition type",
            CatalogKind::ItemProto => "item prototype",
            CatalogKind::BodyProto => "body",
            CatalogKind::Bodypart => "bodypart",
            CatalogKind::Prog => "prog",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: CatalogId,
    pub name: String,
}

pub trait Catalog: Send + Sync {
    /// Resolve `id_or_name` within `kind`; ids win over names.
    fn lookup(&self, kind: CatalogKind, id_or_name: &str) -> Option<CatalogEntry>;

    fn name_of(&self, kind: CatalogKind, id: CatalogId) -> Option<String>;

    /// `Name (#id)` when known, `#id (missing)` otherwise.
    fn describe(&self, kind: CatalogKind, id: Option<CatalogId>) -> String {
        match id {
            None => "None".to_string(),
            Some(id) => match self.name_of(kind, id) {
                Some(name) => format!("{} (#{})", name, id),
                None => format!("#{} (missing)", id),
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    entries: HashMap<CatalogKind, Vec<CatalogEntry>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: CatalogKind, id: CatalogId, name: impl Into<String>) {
        let list = self.entries.entry(kind).or_default();
        list.retain(|entry| entry.id != id);
        list.push(CatalogEntry {
            id,
            name: name.into(),
        });
    }

    pub fn with(mut self, kind: CatalogKind, id: CatalogId, name: impl Into<String>) -> Self {
        self.insert(kind, id, name);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Catalog for InMemoryCatalog {
    fn lookup(&self, kind: CatalogKind, id_or_name: &str) -> Option<CatalogEntry> {
        let list = self.entries.get(&kind)?;
        let needle = id_or_name.trim().trim_start_matches('#');
        if let Ok(id) = needle.parse::<CatalogId>() {
            if let Some(entry) = list.iter().find(|entry| entry.id == id) {
                return Some(entry.clone());
            }
        }
        list.iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(needle))
            .or_else(|| {
                let lower = needle.to_lowercase();
                list.iter()
                    .find(|entry| entry.name.to_lowercase().starts_with(&lower))
            })
            .cloned()
    }

    fn name_of(&self, kind: CatalogKind, id: CatalogId) -> Option<String> {
        self.entries
            .get(&kind)?
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InMemoryCatalog {
        InMemoryCatalog::new()
            .with(CatalogKind::Gas, 1, "Oxygen")
            .with(CatalogKind::Gas, 2, "Nitrogen")
            .with(CatalogKind::ArmourType, 1, "Boiled Leather")
    }

    #[test]
    fn lookup_by_id_name_and_prefix() {
        let catalog = sample();
        assert_eq!(catalog.lookup(CatalogKind::Gas, "2").unwrap().name, "Nitrogen");
        assert_eq!(catalog.lookup(CatalogKind::Gas, "#1").unwrap().name, "Oxygen");
        assert_eq!(catalog.lookup(CatalogKind::Gas, "oxygen").unwrap().id, 1);
        assert_eq!(catalog.lookup(CatalogKind::Gas, "nitro").unwrap().id, 2);
        assert!(catalog.lookup(CatalogKind::Gas, "helium").is_none());
        assert!(catalog.lookup(CatalogKind::ShieldType, "1").is_none());
    }

    #[test]
    fn kinds_are_separate_namespaces() {
        let catalog = sample();
        assert_eq!(catalog.name_of(CatalogKind::ArmourType, 1).as_deref(), Some("Boiled Leather"));
        assert_eq!(catalog.describe(CatalogKind::Gas, Some(1)), "Oxygen (#1)");
        assert_eq!(catalog.describe(CatalogKind::Gas, Some(9)), "#9 (missing)");
        assert_eq!(catalog.describe(CatalogKind::Gas, None), "None");
        assert_eq!(catalog.len(), 3);
    }
}
