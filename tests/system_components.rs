//! System-generated component types are never authored by hand.

use itemproto::components::kinds::system::{PileInstance, SystemKind};
use itemproto::components::{
    ComponentError, ComponentManager, ComponentStore, ProtoHeader, RevisionStatus,
};
use tempfile::TempDir;

fn current(manager: &ComponentManager, kind: SystemKind) -> itemproto::components::ComponentPrototype {
    let mut header = ProtoHeader::new_draft(1, "system", kind.type_name());
    header.status = RevisionStatus::Current;
    manager
        .load_prototype(header, kind.type_name(), "<Definition/>")
        .expect("database loader registered")
}

#[test]
fn revisions_are_not_supported() {
    let manager = ComponentManager::with_builtin_types();
    for kind in [SystemKind::Corpse, SystemKind::CurrencyPile, SystemKind::Pile] {
        let prototype = current(&manager, kind);
        assert!(prototype.read_only());
        assert!(matches!(
            prototype.create_new_revision("builder"),
            Err(ComponentError::RevisionNotSupported(_))
        ));
    }
}

#[test]
fn authors_cannot_create_them() {
    let manager = ComponentManager::with_builtin_types();
    for kind in SystemKind::ALL {
        assert!(manager.is_persisted_type(kind.type_name()));
        assert!(!manager.all_keywords().contains(&kind.type_name().to_lowercase().as_str()));
        assert!(matches!(
            manager.new_prototype(kind.type_name(), 1, "builder", "sneaky"),
            Err(ComponentError::UnknownComponentType(_))
        ));
        assert!(manager.type_help(kind.type_name()).is_some());
    }
}

#[test]
fn stored_piles_still_instantiate() {
    let dir = TempDir::new().expect("tempdir");
    let store = ComponentStore::open(dir.path()).expect("open store");
    let manager = ComponentManager::with_builtin_types();

    let mut pile = current(&manager, SystemKind::Pile);
    store.save_component(&mut pile).unwrap();

    let loaded = std::sync::Arc::new(store.load_component(&manager, pile.key()).unwrap());
    let mut instance = loaded.create_new(40, true).unwrap();
    assert!(instance.is_temporary());
    let heap = instance.as_any_mut().downcast_mut::<PileInstance>().unwrap();
    heap.add(41);
    heap.add(41);
    heap.add(42);
    assert_eq!(heap.items(), &[41, 42]);
}
