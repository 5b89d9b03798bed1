//! Draft, approve, revise and supersede through the building workshop.

mod common;

use common::workshop;
use itemproto::components::kinds::belt::{Belt, BeltInstance};
use itemproto::components::storage::ComponentProtoRecord;
use itemproto::components::{ItemProto, ProtoKey, RevisionStatus, SizeCategory};
use tempfile::TempDir;

#[test]
fn belt_from_draft_to_superseded() {
    let dir = TempDir::new().expect("tempdir");
    let mut shop = workshop(&dir, "ada");

    let reply = shop.handle_line("comp new belt \"leather belt\"").unwrap();
    assert!(reply.contains("Belt"), "{}", reply);
    let id = shop.open_prototype().unwrap().id();

    assert!(shop.handle_line("capacity 2").unwrap().contains('2'));
    // Edits are saved as they happen.
    let stored = shop.store().latest_component(shop.manager(), id).unwrap();
    assert_eq!(stored.definition_as::<Belt>().unwrap().maximum_number_of_belted_items, 2);
    assert!(!stored.is_changed());

    assert!(shop.handle_line("comp submit").unwrap().contains("ready"));
    assert!(shop.handle_line("comp approve").unwrap().contains("current"));
    assert_eq!(shop.open_prototype().unwrap().status(), RevisionStatus::Current);

    let refused = shop.handle_line("capacity 5").unwrap();
    assert!(refused.contains("new revision"), "{}", refused);

    shop.handle_line("comp revise").unwrap();
    assert_eq!(shop.open_prototype().unwrap().key(), ProtoKey::new(id, 1));
    shop.handle_line("capacity 5").unwrap();
    shop.handle_line("comp approve").unwrap();

    let revisions = shop.store().component_revisions(id).unwrap();
    let statuses: Vec<_> = revisions.iter().map(|record| record.header.status).collect();
    assert_eq!(statuses, vec![RevisionStatus::Superseded, RevisionStatus::Current]);

    let first = shop
        .store()
        .load_component(shop.manager(), ProtoKey::new(id, 0))
        .unwrap();
    assert_eq!(first.definition_as::<Belt>().unwrap().maximum_number_of_belted_items, 2);
}

#[test]
fn incomplete_drafts_are_reported_not_approved() {
    let dir = TempDir::new().expect("tempdir");
    let mut shop = workshop(&dir, "ada");
    shop.handle_line("comp new shield kite").unwrap();

    let report = shop.handle_line("comp submit").unwrap();
    assert!(report.contains("shield type"), "{}", report);
    let refused = shop.handle_line("comp approve").unwrap();
    assert!(refused.contains("shield type"), "{}", refused);
    assert_eq!(shop.open_prototype().unwrap().status(), RevisionStatus::Draft);

    shop.handle_line("shield buckler").unwrap();
    shop.handle_line("weapon 3").unwrap();
    shop.handle_line("comp approve").unwrap();
    assert_eq!(shop.open_prototype().unwrap().status(), RevisionStatus::Current);
}

#[test]
fn self_approval_can_be_disallowed() {
    let dir = TempDir::new().expect("tempdir");
    let mut shop = workshop(&dir, "ada").with_self_approval(false);
    shop.handle_line("comp new belt strap").unwrap();
    let id = shop.open_prototype().unwrap().id();

    assert!(shop.handle_line("comp approve").unwrap().contains("own work"));
    shop.set_actor("grace");
    shop.handle_line(&format!("comp edit {}", id)).unwrap();
    shop.handle_line("comp approve").unwrap();
    let approved = shop.open_prototype().unwrap();
    assert_eq!(approved.status(), RevisionStatus::Current);
    assert_eq!(approved.header().reviewer.as_deref(), Some("grace"));
}

#[test]
fn author_mistakes_are_messages() {
    let dir = TempDir::new().expect("tempdir");
    let mut shop = workshop(&dir, "ada");

    assert!(shop.handle_line("capacity 3").unwrap().contains("not editing"));
    assert!(shop.handle_line("comp new teleporter x").unwrap().contains("comp types"));
    assert!(shop.handle_line("comp new corpse x").unwrap().contains("comp types"));
    assert!(shop.handle_line("comp edit 999").unwrap().contains("not found"));
    assert!(shop.handle_line("comp edit").unwrap().starts_with("Usage"));
    assert!(shop.handle_line("comp list").unwrap().contains("no components"));

    shop.handle_line("comp new belt strap").unwrap();
    let refused = shop.handle_line("comp revise").unwrap();
    assert!(refused.to_lowercase().contains("cannot move"), "{}", refused);
}

#[test]
fn listing_help_and_xml() {
    let dir = TempDir::new().expect("tempdir");
    let mut shop = workshop(&dir, "ada");
    shop.handle_line("comp new syringe \"glass syringe\"").unwrap();
    shop.handle_line("capacity 5ml").unwrap();

    let xml = shop.handle_line("comp xml").unwrap();
    assert!(xml.starts_with("<Definition>"), "{}", xml);
    assert!(xml.contains("LiquidCapacity"), "{}", xml);

    let list = shop.handle_line("comp list").unwrap();
    assert!(list.contains("glass syringe"));
    assert!(list.contains("Syringe"));

    assert!(shop.handle_line("comp types").unwrap().contains("syringe"));
    assert!(shop.handle_line("comp help belt").unwrap().contains("capacity"));
    assert!(shop.handle_line("comp show").unwrap().contains("glass syringe"));

    assert!(shop.handle_line("comp close").unwrap().contains("stop editing"));
    assert!(shop.open_prototype().is_none());
}

#[test]
fn approved_components_build_items() {
    let dir = TempDir::new().expect("tempdir");
    let mut shop = workshop(&dir, "ada");
    shop.handle_line("comp new belt \"sword belt\"").unwrap();
    shop.handle_line("size normal").unwrap();
    let draft_key = shop.open_prototype().unwrap().key();

    let store = shop.store();
    let item_id = store.next_item_id().unwrap();
    let mut item_proto = ItemProto::new(item_id, "sword belt");
    item_proto.add_component(draft_key);
    store.put_item_proto(&item_proto).unwrap();
    let source = store.source(shop.manager());
    assert!(item_proto.instantiate(&source, 1, false).is_err());

    shop.handle_line("comp approve").unwrap();
    let store = shop.store();
    let item_proto = store.get_item_proto(item_id).unwrap();
    let source = store.source(shop.manager());
    let mut item = item_proto.instantiate(&source, 1, false).unwrap();
    let belt = item.component_mut::<BeltInstance>().unwrap();
    belt.attach(2, SizeCategory::Medium).unwrap();
    assert_eq!(belt.belted(), &[2]);
}

#[test]
fn unreadable_definitions_do_not_end_the_session() {
    let dir = TempDir::new().expect("tempdir");
    let mut shop = workshop(&dir, "ada");
    shop.handle_line("comp new connectable plug").unwrap();
    let prototype = shop.open_prototype().unwrap();
    let id = prototype.id();

    let mut record = ComponentProtoRecord::from_prototype(prototype);
    record.definition = r#"<Definition><Connectors><Connection gender="Male" type=""/></Connectors></Definition>"#.to_string();
    shop.store().put_component_record(&record).unwrap();
    shop.handle_line("comp close").unwrap();

    let reply = shop.handle_line(&format!("comp edit {}", id)).unwrap();
    assert!(reply.contains("could not be loaded"), "{}", reply);
    assert!(shop.open_prototype().is_none());
    assert!(shop.handle_line("comp new belt strap").unwrap().contains("Belt"));
}

#[test]
fn repeated_edits_are_not_written_again() {
    let dir = TempDir::new().expect("tempdir");
    let mut shop = workshop(&dir, "ada");
    shop.handle_line("comp new belt strap").unwrap();
    shop.handle_line("capacity 3").unwrap();
    let id = shop.open_prototype().unwrap().id();
    assert!(!shop.open_prototype().unwrap().is_changed());

    shop.handle_line("capacity 3").unwrap();
    assert!(!shop.open_prototype().unwrap().is_changed());
    let stored = shop.store().latest_component(shop.manager(), id).unwrap();
    assert_eq!(stored.definition_as::<Belt>().unwrap().maximum_number_of_belted_items, 3);
}
