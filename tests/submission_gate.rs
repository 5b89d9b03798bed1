//! Drafts with missing mandatory references cannot be approved.

mod common;

use common::{draft, run};
use itemproto::components::{ComponentError, ComponentPrototype, RevisionStatus};

fn assert_blocked(prototype: &ComponentPrototype) {
    assert!(!prototype.can_submit());
    let reason = prototype.why_cannot_submit().unwrap_or_default();
    assert!(!reason.is_empty());
}

#[test]
fn armour_needs_an_armour_type() {
    let mut armour = draft("armour");
    assert_blocked(&armour);
    assert!(armour
        .why_cannot_submit()
        .unwrap()
        .contains("armour type"));

    run(&mut armour, "type leather");
    assert!(armour.can_submit());
}

#[test]
fn shield_needs_both_types() {
    let mut shield = draft("shield");
    assert_blocked(&shield);
    run(&mut shield, "shield buckler");
    assert_blocked(&shield);
    run(&mut shield, "weapon shield bash");
    assert!(shield.can_submit());
}

#[test]
fn musket_cartridge_needs_a_bullet_first() {
    let mut cartridge = draft("musketcartridge");
    run(&mut cartridge, "type musket");
    assert_blocked(&cartridge);
    assert!(cartridge.why_cannot_submit().unwrap().contains("bullet"));

    run(&mut cartridge, "bullet lead ball");
    assert!(cartridge.can_submit());
}

#[test]
fn blocked_drafts_stay_drafts() {
    let mut shield = draft("shield");
    let err = shield
        .change_status(RevisionStatus::Current, "reviewer")
        .unwrap_err();
    assert!(matches!(err, ComponentError::SubmissionBlocked { .. }));
    assert_eq!(shield.status(), RevisionStatus::Draft);

    run(&mut shield, "shield 1");
    run(&mut shield, "weapon 3");
    shield.change_status(RevisionStatus::Current, "reviewer").unwrap();
    assert_eq!(shield.status(), RevisionStatus::Current);
    assert_eq!(shield.header().reviewer.as_deref(), Some("reviewer"));
}

#[test]
fn unnamed_drafts_are_blocked() {
    let mut belt = draft("belt");
    assert!(belt.can_submit());
    run(&mut belt, "name \"   \"");
    assert!(!belt.can_submit());
}

#[test]
fn approved_prototypes_reject_edits() {
    let mut armour = draft("armour");
    run(&mut armour, "type leather");
    armour.change_status(RevisionStatus::Current, "reviewer").unwrap();
    let before = armour.save_to_xml();
    assert!(run(&mut armour, "type chainmail").is_rejected());
    assert_eq!(armour.save_to_xml(), before);
}
