//! Every persisted component type reloads from its own `<Definition>` unchanged.

mod common;

use common::{draft, run};
use itemproto::components::kinds::musket_cartridge::MusketCartridge;
use itemproto::components::kinds::syringe::Syringe;
use itemproto::components::{ComponentManager, ComponentPrototype, ProtoHeader};

/// Building lines that move each type away from its defaults.
const CONFIGURED: &[(&str, &[&str])] = &[
    ("armour", &["type chainmail", "penalties"]),
    ("belt", &["capacity 5", "size very small"]),
    ("blindfold", &[]),
    ("chair", &["occupants 3", "sitting \"lounging on\""]),
    ("connectable", &["connector male \"Grid Power\"", "connector neuter Data"]),
    ("defibrillator", &["watts 750", "emote @ zap|zaps $1"]),
    ("gridpowersupply", &[]),
    ("immobilising", &["escape very hard", "movement", "profile wrists", "bulky"]),
    ("implantorgan", &["body humanoid", "organ heart", "power 5W", "difficulty easy", "external"]),
    ("musketball", &["grade Rifle", "type 4", "fired 51"]),
    ("musketcartridge", &["bullet 50", "powder 0.25oz", "type musket", "fired 51"]),
    ("neuralinterface", &["connections 4", "body humanoid", "bodypart heart"]),
    ("poweredprop", &["wattage 1kW", "onemote @ hum|hums", "onprog AlwaysTrue", "powered glowing softly"]),
    ("rebreather", &["gas breathable", "connector female Scuba"]),
    ("sheath", &["size large", "difficulty easy", "guns"]),
    ("shield", &["shield buckler", "weapon shield bash"]),
    ("syringe", &["capacity 50ml", "transparent"]),
    ("wearable", &["profile torso", "profile \"left arm\"", "displays", "canwear AlwaysTrue"]),
];

fn reload(manager: &ComponentManager, prototype: &ComponentPrototype) -> ComponentPrototype {
    let header = ProtoHeader::new_draft(prototype.id(), "tester", prototype.name());
    manager
        .load_prototype(header, prototype.type_name(), &prototype.save_to_xml())
        .expect("reload")
}

#[test]
fn configured_definitions_round_trip() {
    let manager = ComponentManager::with_builtin_types();
    for (keyword, lines) in CONFIGURED {
        let mut prototype = draft(keyword);
        for line in *lines {
            let outcome = run(&mut prototype, line);
            assert!(outcome.is_changed(), "{}: {} -> {}", keyword, line, outcome);
        }
        let reloaded = reload(&manager, &prototype);
        assert_eq!(reloaded.type_name(), prototype.type_name());
        assert_eq!(reloaded.save_to_xml(), prototype.save_to_xml(), "{}", keyword);
        assert!(!reloaded.is_changed());
    }
}

#[test]
fn every_builder_type_is_covered() {
    let manager = ComponentManager::with_builtin_types();
    let covered: Vec<&str> = CONFIGURED.iter().map(|(keyword, _)| *keyword).collect();
    for (keyword, _) in manager.keywords() {
        assert!(covered.contains(&keyword), "{} has no round trip case", keyword);
    }
}

#[test]
fn typed_fields_survive_exactly() {
    let manager = ComponentManager::with_builtin_types();

    let mut syringe = draft("syringe");
    run(&mut syringe, "capacity 12.5ml");
    let reloaded = reload(&manager, &syringe);
    assert_eq!(
        reloaded.definition_as::<Syringe>(),
        syringe.definition_as::<Syringe>()
    );

    let mut cartridge = draft("cartridge");
    run(&mut cartridge, "bullet lead ball");
    let reloaded = reload(&manager, &cartridge);
    let config = reloaded.definition_as::<MusketCartridge>().unwrap();
    assert_eq!(config.bullet_proto, Some(50));
    assert_eq!(config, cartridge.definition_as::<MusketCartridge>().unwrap());
}

#[test]
fn missing_optional_elements_keep_defaults() {
    let manager = ComponentManager::with_builtin_types();
    let header = ProtoHeader::new_draft(1, "tester", "bare belt");
    let belt = manager
        .load_prototype(header, "Belt", "<Definition/>")
        .unwrap();
    assert_eq!(belt.save_to_xml(), draft("belt").save_to_xml());
}

#[test]
fn malformed_definitions_are_errors() {
    let manager = ComponentManager::with_builtin_types();
    for xml in [
        "<Definition><MaximumSize>Gigantic</MaximumSize></Definition>",
        "<Definition><MaximumNumberOfBeltedItems>many</MaximumNumberOfBeltedItems></Definition>",
        "<Belt/>",
        "<Definition>",
    ] {
        let header = ProtoHeader::new_draft(1, "tester", "broken belt");
        assert!(manager.load_prototype(header, "Belt", xml).is_err(), "{}", xml);
    }
}
