// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use noc_models::config::NetworkConfig;
use noc_models::network::Network;
use noc_models::topology::Coord;
use noc_track::entity::toplevel;
use noc_track::test_helpers::check_and_clear;
use noc_track::test_init;

fn position(events: &[String], expected: &str) -> usize {
    events
        .iter()
        .position(|e| e == expected)
        .unwrap_or_else(|| panic!("missing {expected:?} in {events:?}"))
}

#[test]
fn build_connects_neighbours() {
    let (test_tracker, tracker) = test_init!(10);
    let top = toplevel(&tracker, "top");
    let _network = Network::new(&top, "noc", NetworkConfig::mesh(2, 1)).unwrap();

    check_and_clear(
        &test_tracker,
        &[
            "0: created 10, top, 0, 0 bytes",
            "10: created 11, top::noc, 0, 0 bytes",
            "11: created 12, top::noc::node_0_0, 0, 0 bytes",
            "11: created 13, top::noc::node_1_0, 0, 0 bytes",
            "12: connect to 13",
            "13: connect to 12",
            "11:INFO: built 2x1 mesh of 2 nodes",
        ],
    );
}

#[test]
fn packet_lifecycle_is_tracked() {
    let (test_tracker, tracker) = test_init!(10);
    let top = toplevel(&tracker, "top");
    let mut network = Network::new(&top, "noc", NetworkConfig::mesh(2, 1)).unwrap();
    check_and_clear(&test_tracker, &[".*"; 7]);

    network
        .send_message_with(Coord::new(0, 0), Coord::new(1, 0), "ping", true, 128)
        .unwrap();
    network.run_until_drained(10).unwrap();

    let events = test_tracker.events();
    let created = position(&events, "12: created 14, ping, 1, 128 bytes");
    let step_1 = position(&events, "11: step 1");
    let exited = position(&events, "12: 14 exited");
    let entered = position(&events, "13: 14 entered");
    let step_2 = position(&events, "11: step 2");
    let destroyed = position(&events, "13: destroyed 14");

    assert!(created < step_1);
    assert!(step_1 < exited);
    assert!(exited < entered);
    assert!(entered < step_2);
    assert!(step_2 < destroyed);
    assert!(events.iter().any(|e| e.starts_with("13:DEBUG: received")));
}

#[test]
fn packet_track_ids_are_distinct_from_entities() {
    let (test_tracker, tracker) = test_init!(1);
    let top = toplevel(&tracker, "top");
    let mut network = Network::new(&top, "noc", NetworkConfig::mesh(2, 1)).unwrap();
    check_and_clear(&test_tracker, &[".*"; 7]);

    let entity_ids = [top.id, network.entity.id]
        .into_iter()
        .chain(network.nodes().map(|n| n.entity.id))
        .collect::<Vec<_>>();

    for i in 0..4 {
        let packet_id = network
            .send_message(Coord::new(0, 0), Coord::new(1, 0), &format!("p{i}"))
            .unwrap();
        assert_eq!(packet_id, i + 1);
    }

    let created = test_tracker
        .events()
        .iter()
        .filter_map(|e| e.strip_prefix(&format!("{}: created ", entity_ids[2])))
        .map(|rest| rest.split(',').next().unwrap().parse::<u64>().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(created, vec![5, 6, 7, 8]);
    for id in &created {
        assert!(entity_ids.iter().all(|e| e.0 != *id));
    }
}
