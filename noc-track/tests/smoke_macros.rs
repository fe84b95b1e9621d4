// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Ensure that all version of each macro can be used

use noc_track::entity::{Entity, toplevel};
use noc_track::{
    Id, create, create_id, debug, destroy, enter, error, exit, info, set_time, test_helpers,
    test_init, trace, warn,
};

macro_rules! build_with_entity {
    ($name:ident, $macro:ident, $slvl:expr) => (
        #[test]
        fn $name() {
            let (test_tracker, tracker) = test_init!(100);

            let top = toplevel(&tracker, "top");
            test_helpers::check_and_clear(&test_tracker, &["0: created 100, top, 0, 0 bytes"]);
            assert_eq!(top.id, Id(100));

            $macro!(top ; "Loc with no args");
            test_helpers::check_and_clear(&test_tracker, &[concat!("100:", $slvl, ": Loc with no args")]);

            $macro!(top ; "Loc with {} argument", 1);
            test_helpers::check_and_clear(&test_tracker, &[concat!("100:", $slvl, ": Loc with 1 argument")]);

            $macro!(top ; "Loc with {}, {} arguments", 1, 1 + 1);
            test_helpers::check_and_clear(&test_tracker, &[concat!("100:", $slvl,": Loc with 1, 2 arguments")]);

            drop(top);
            test_helpers::check_and_clear(&test_tracker, &["100: destroyed 0"]);
        }
    );
}

build_with_entity!(trace_with_entity, trace, "TRACE");
build_with_entity!(info_with_entity, info, "INFO");
build_with_entity!(debug_with_entity, debug, "DEBUG");
build_with_entity!(warn_with_entity, warn, "WARN");
build_with_entity!(error_with_entity, error, "ERROR");

#[test]
fn create_destroy_packet() {
    let (test_tracker, tracker) = test_init!(10);

    let top = toplevel(&tracker, "top");
    test_helpers::check_and_clear(&test_tracker, &["0: created 10, top, 0, 0 bytes"]);

    let packet = create_id!(top);
    create!(top ; packet, 64, 1, "packet");
    test_helpers::check_and_clear(&test_tracker, &["10: created 11, packet, 1, 64 bytes"]);

    destroy!(top ; packet);
    test_helpers::check_and_clear(&test_tracker, &["10: destroyed 11"]);
}

#[test]
fn enter_exit_basics() {
    let (test_tracker, tracker) = test_init!(40);

    let top = toplevel(&tracker, "top");
    let obj = Id(7);
    enter!(top ; obj);
    exit!(top ; obj);
    test_helpers::check_and_clear(
        &test_tracker,
        &["0: created 40, top, 0, 0 bytes", "40: 7 entered", "40: 7 exited"],
    );
}

#[test]
fn child_entities() {
    let (test_tracker, tracker) = test_init!(1000);

    let top = toplevel(&tracker, "top");
    let mesh = std::rc::Rc::new(Entity::new(&top, "mesh"));
    let node = Entity::new(&mesh, "node_1_2");

    assert_eq!(node.full_name(), "top::mesh::node_1_2");
    assert_eq!(format!("{node}"), "top::mesh::node_1_2");
    test_helpers::check_and_clear(
        &test_tracker,
        &[
            "0: created 1000, top, 0, 0 bytes",
            "1000: created 1001, top::mesh, 0, 0 bytes",
            "1001: created 1002, top::mesh::node_1_2, 0, 0 bytes",
        ],
    );

    drop(node);
    test_helpers::check_and_clear(&test_tracker, &["1002: destroyed 1001"]);
}

#[test]
fn step_updates() {
    let (test_tracker, tracker) = test_init!(5);

    let top = toplevel(&tracker, "top");
    set_time!(top ; 3);
    test_helpers::check_and_clear(
        &test_tracker,
        &["0: created 5, top, 0, 0 bytes", "5: step 3"],
    );
}
