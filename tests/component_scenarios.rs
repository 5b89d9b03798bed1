//! Building command scenarios for individual component types.

mod common;

use common::{describe, draft, run};
use itemproto::components::kinds::belt::Belt;
use itemproto::components::kinds::defibrillator::Defibrillator;
use itemproto::components::kinds::sheath::Sheath;
use itemproto::components::{CommandOutcome, Difficulty, SizeCategory};

#[test]
fn belt_capacity_and_size() {
    let mut belt = draft("belt");
    let config = belt.definition_as::<Belt>().unwrap();
    assert_eq!(config.maximum_number_of_belted_items, 1);
    assert_eq!(config.maximum_size, SizeCategory::Small);

    assert!(run(&mut belt, "capacity 4").is_changed());
    assert!(run(&mut belt, "size medium").is_changed());

    let config = belt.definition_as::<Belt>().unwrap();
    assert_eq!(config.maximum_number_of_belted_items, 4);
    assert_eq!(config.maximum_size, SizeCategory::Medium);

    let description = describe(&belt);
    assert!(description.contains('4'), "{}", description);
    assert!(description.contains("Medium"), "{}", description);
}

#[test]
fn defibrillator_watts() {
    let mut defib = draft("defibrillator");
    assert_eq!(defib.definition_as::<Defibrillator>().unwrap().wattage_per_shock, 20_000.0);

    let outcome = run(&mut defib, "watts 500");
    assert!(outcome.is_changed());
    assert!(outcome.message().contains("500"), "{}", outcome.message());
    assert_eq!(defib.definition_as::<Defibrillator>().unwrap().wattage_per_shock, 500.0);
}

#[test]
fn sheath_guns_toggles() {
    let mut sheath = draft("sheath");
    let config = sheath.definition_as::<Sheath>().unwrap();
    assert_eq!(config.maximum_size, SizeCategory::Small);
    assert_eq!(config.stealth_draw_difficulty, Difficulty::Normal);
    assert!(!config.designed_for_guns);

    run(&mut sheath, "guns");
    assert!(sheath.definition_as::<Sheath>().unwrap().designed_for_guns);
    run(&mut sheath, "guns");
    assert!(!sheath.definition_as::<Sheath>().unwrap().designed_for_guns);
}

#[test]
fn repeating_a_command_gives_the_same_state() {
    let cases = [
        ("belt", "capacity 3"),
        ("sheath", "size large"),
        ("defibrillator", "watts 1.5kW"),
        ("chair", "occupants 2"),
        ("syringe", "capacity 20ml"),
        ("armour", "type leather"),
        ("shield", "weapon 3"),
        ("rebreather", "gas breathable"),
        ("musketcartridge", "powder 8g"),
        ("poweredprop", "wattage 60"),
        ("immobilising", "escape easy"),
    ];
    for (keyword, line) in cases {
        let mut prototype = draft(keyword);
        assert!(run(&mut prototype, line).is_changed(), "{} {}", keyword, line);
        let first = prototype.save_to_xml();
        assert!(prototype.is_changed());
        let again = run(&mut prototype, line);
        assert!(matches!(again, CommandOutcome::Unchanged(_)), "{} {} -> {}", keyword, line, again);
        assert_eq!(prototype.save_to_xml(), first, "{} {}", keyword, line);
        assert!(prototype.is_changed());
    }
}

#[test]
fn renaming_to_the_same_name_is_unchanged() {
    let mut belt = draft("belt");
    assert!(run(&mut belt, "name \"war belt\"").is_changed());
    assert!(!run(&mut belt, "name \"war belt\"").is_changed());
    assert!(run(&mut belt, "desc plain").is_changed());
    assert!(!run(&mut belt, "desc plain").is_changed());
}

#[test]
fn bad_arguments_leave_the_prototype_untouched() {
    let mut belt = draft("belt");
    let before = belt.save_to_xml();
    for line in ["capacity", "capacity -2", "capacity lots", "size colossal"] {
        assert!(matches!(run(&mut belt, line), CommandOutcome::Rejected(_)), "{}", line);
    }
    assert_eq!(belt.save_to_xml(), before);

    let mut armour = draft("armour");
    assert!(matches!(run(&mut armour, "type mithril"), CommandOutcome::Rejected(_)));
    assert!(armour.why_cannot_submit().is_some());
}

#[test]
fn unknown_verbs_fall_back_to_the_shared_options() {
    let mut belt = draft("belt");
    assert!(matches!(run(&mut belt, "juggle 3"), CommandOutcome::Unknown(_)));

    let outcome = run(&mut belt, "name \"tooled leather belt\"");
    assert!(outcome.is_changed());
    assert_eq!(belt.name(), "tooled leather belt");

    let help = run(&mut belt, "help");
    assert!(help.message().contains("capacity"));
    assert!(help.message().contains("name"));
}

#[test]
fn family_verbs_reach_leaf_types() {
    let mut cartridge = draft("musketcartridge");
    assert!(run(&mut cartridge, "grade Pistol").is_changed());
    assert!(run(&mut cartridge, "fired \"spent cartridge\"").is_changed());
    assert!(run(&mut cartridge, "fired none").is_changed());

    let mut restraint = draft("restraint");
    assert!(run(&mut restraint, "bulky").is_changed());
    assert!(run(&mut restraint, "movement").is_changed());

    let mut organ = draft("implantorgan");
    assert!(matches!(run(&mut organ, "organ heart"), CommandOutcome::Rejected(_)));
    assert!(run(&mut organ, "body humanoid").is_changed());
    assert!(run(&mut organ, "organ heart").is_changed());
}
