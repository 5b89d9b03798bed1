//! Test utilities & fixtures shared by the integration tests.

use itemproto::components::{
    BuildContext, CatalogKind, CommandOutcome, ComponentManager, ComponentPrototype,
    ComponentStore, InMemoryCatalog, MetricUnits, StringStack,
};
use itemproto::olc::Workshop;

/// Catalog with one or two entries of every kind the built-in types refer to.
pub fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with(CatalogKind::ArmourType, 1, "leather")
        .with(CatalogKind::ArmourType, 2, "chainmail")
        .with(CatalogKind::ShieldType, 1, "buckler")
        .with(CatalogKind::WeaponType, 3, "shield bash")
        .with(CatalogKind::AmmunitionType, 4, "musket ball")
        .with(CatalogKind::ItemProto, 50, "lead ball")
        .with(CatalogKind::ItemProto, 51, "spent cartridge")
        .with(CatalogKind::Gas, 6, "breathable air")
        .with(CatalogKind::Liquid, 7, "water")
        .with(CatalogKind::BodyProto, 8, "humanoid")
        .with(CatalogKind::Bodypart, 9, "heart")
        .with(CatalogKind::Prog, 10, "AlwaysTrue")
}

/// Run one building command line against a prototype with the shared fixtures.
#[allow(dead_code)]
pub fn run(prototype: &mut ComponentPrototype, line: &str) -> CommandOutcome {
    let catalog = catalog();
    let ctx = BuildContext::new("tester", &catalog, &MetricUnits);
    prototype.building_command(&ctx, &mut StringStack::new(line))
}

/// Describe a prototype with the shared fixtures.
#[allow(dead_code)]
pub fn describe(prototype: &ComponentPrototype) -> String {
    let catalog = catalog();
    let ctx = BuildContext::new("tester", &catalog, &MetricUnits);
    prototype.component_description_olc(&ctx)
}

/// A fresh draft of the type behind `keyword`.
#[allow(dead_code)]
pub fn draft(keyword: &str) -> ComponentPrototype {
    ComponentManager::with_builtin_types()
        .new_prototype(keyword, 1, "tester", &format!("test {}", keyword))
        .expect("registered keyword")
}

/// A workshop over a throwaway store inside `dir`.
#[allow(dead_code)]
pub fn workshop(dir: &tempfile::TempDir, actor: &str) -> Workshop {
    let store = ComponentStore::open(dir.path().join("components")).expect("open store");
    Workshop::new(
        ComponentManager::with_builtin_types(),
        store,
        Box::new(catalog()),
        Box::new(MetricUnits),
        actor,
    )
}
