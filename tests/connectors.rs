//! Connector matching across component types.

mod common;

use std::sync::Arc;

use common::{draft, run};
use itemproto::components::kinds::connectable::ConnectableInstance;
use itemproto::components::kinds::rebreather::RebreatherInstance;
use itemproto::components::{
    ComponentManager, ComponentPrototype, Connectable, ConnectorGender, ConnectorType,
    ProtoHeader, RevisionStatus,
};

fn connector(gender: ConnectorGender, name: &str) -> ConnectorType {
    ConnectorType::new(gender, name)
}

#[test]
fn gender_matrix() {
    use ConnectorGender::{Female, Male, Neuter};
    let cases = [
        (Male, Female, true),
        (Female, Male, true),
        (Male, Male, false),
        (Female, Female, false),
        (Neuter, Male, true),
        (Female, Neuter, true),
        (Neuter, Neuter, true),
    ];
    for (left, right, expected) in cases {
        let a = connector(left, "Gas Line");
        let b = connector(right, "Gas Line");
        assert_eq!(a.can_connect(&b), expected, "{} / {}", a, b);
        assert_eq!(b.can_connect(&a), expected, "{} / {}", b, a);
    }
}

#[test]
fn type_names_must_agree() {
    let male = connector(ConnectorGender::Male, "Gas Line");
    assert!(!male.can_connect(&connector(ConnectorGender::Female, "Grid Power")));
    assert!(!connector(ConnectorGender::Neuter, "Data")
        .can_connect(&connector(ConnectorGender::Neuter, "Gas Line")));
    assert!(male.can_connect(&connector(ConnectorGender::Female, "gas line")));
}

fn approved(mut prototype: ComponentPrototype) -> Arc<ComponentPrototype> {
    prototype
        .change_status(RevisionStatus::Current, "reviewer")
        .expect("approvable");
    Arc::new(prototype)
}

#[test]
fn grid_power_accepts_a_male_plug() {
    let socket = approved(draft("gridpowersupply"));

    let mut plug = draft("connectable");
    run(&mut plug, "connector male \"Grid Power\"");
    let plug = approved(plug);
    assert!(plug.can_connect_to(socket.as_ref()));
    assert!(socket.can_connect_to(plug.as_ref()));

    let mut lamp = plug.create_new(1, false).unwrap();
    let lamp = lamp
        .as_any_mut()
        .downcast_mut::<ConnectableInstance>()
        .unwrap();
    lamp.connect(2, socket.as_ref()).unwrap();
    assert_eq!(lamp.connected(), &[2]);
    assert!(lamp.connect(3, socket.as_ref()).is_err(), "only one connector");
    assert!(lamp.disconnect(2));
    assert!(lamp.connected().is_empty());
}

#[test]
fn rebreather_needs_a_matching_tank() {
    let mut rebreather = draft("rebreather");
    run(&mut rebreather, "gas breathable");
    let rebreather = approved(rebreather);

    let mut tank = draft("connectable");
    run(&mut tank, "connector female \"Gas Line\"");
    let tank = approved(tank);

    let mut wrong = draft("connectable");
    run(&mut wrong, "connector male \"Gas Line\"");
    let wrong = approved(wrong);

    let mut mask = rebreather.create_new(10, false).unwrap();
    let mask = mask
        .as_any_mut()
        .downcast_mut::<RebreatherInstance>()
        .unwrap();
    assert!(mask.connect_tank(12, wrong.as_ref()).is_err());
    mask.connect_tank(11, tank.as_ref()).unwrap();
    assert_eq!(mask.tank(), Some(11));
}

#[test]
fn blank_connection_types_are_refused() {
    let manager = ComponentManager::with_builtin_types();
    for keyword in ["connectable", "rebreather"] {
        let mut prototype = draft(keyword);
        let before = prototype.save_to_xml();
        for line in ["connector male \"\"", "connector female ''", "connector neuter \"   \""] {
            assert!(run(&mut prototype, line).is_rejected(), "{}: {}", keyword, line);
        }
        assert_eq!(prototype.save_to_xml(), before, "{}", keyword);

        let header = ProtoHeader::new_draft(1, "tester", keyword);
        assert!(manager
            .load_prototype(header, prototype.type_name(), &before)
            .is_ok());
    }
}

#[test]
fn connectable_without_connectors_cannot_be_submitted() {
    let mut plug = draft("connectable");
    assert!(!plug.can_submit());
    run(&mut plug, "connector neuter Data");
    assert!(plug.can_submit());
    run(&mut plug, "connector neuter Data");
    assert!(!plug.can_submit(), "second toggle removes the connector");
}
