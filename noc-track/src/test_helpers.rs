// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! This module provides helper functions for testing _track_ output
//!
//! The aim of this module is to provide commonly-used functions that enable the
//! testing of the output that should appear from the tracking macros.

use std::cell::{Cell, RefCell};
use std::fs;
use std::io::BufWriter;
use std::path::Path;
use std::rc::Rc;

use regex::Regex;

use crate::tracker::{EntityManager, TextTracker, dev_null_tracker};
use crate::{Id, Track, Tracker, Writer};

/// A tracker that keeps track events.
pub struct TestTracker {
    events: RefCell<Vec<String>>,

    unique_id: Cell<u64>,
}

impl TestTracker {
    /// Create a new [`Tracker`](crate::Tracker) for the tests.
    ///
    /// This keeps the track events in memory for checking later.
    #[must_use]
    pub fn new(initial_id: u64) -> Self {
        Self {
            events: RefCell::new(Vec::new()),
            unique_id: Cell::new(initial_id),
        }
    }

    fn add_event(&self, event: String) {
        println!("{event}");
        self.events.borrow_mut().push(event);
    }

    /// Return a copy of the events seen so far.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}

impl Track for TestTracker {
    fn unique_id(&self) -> Id {
        let id = self.unique_id.get();
        self.unique_id.set(id + 1);
        Id(id)
    }

    fn is_entity_enabled(&self, _id: Id, _level: log::Level) -> bool {
        true
    }

    fn add_entity(&self, _id: Id, _entity_name: &str) {
        // Do nothing
    }

    fn enter(&self, id: Id, item: Id) {
        self.add_event(format!("{id}: {item} entered"));
    }

    fn exit(&self, id: Id, item: Id) {
        self.add_event(format!("{id}: {item} exited"));
    }

    fn create(&self, created_by: Id, id: Id, num_bytes: usize, req_type: i8, name: &str) {
        self.add_event(format!(
            "{created_by}: created {id}, {name}, {req_type}, {num_bytes} bytes"
        ));
    }

    fn destroy(&self, destroyed_by: Id, id: Id) {
        self.add_event(format!("{destroyed_by}: destroyed {id}"));
    }

    fn connect(&self, connect_from: Id, connect_to: Id) {
        self.add_event(format!("{connect_from}: connect to {connect_to}"));
    }

    fn log(&self, id: Id, level: log::Level, msg: std::fmt::Arguments) {
        self.add_event(format!("{id}:{level}: {msg}"));
    }

    fn time(&self, set_by: Id, step: u64) {
        self.add_event(format!("{set_by}: step {step}"));
    }

    fn shutdown(&self) {
        // Do nothing
    }
}

/// Initialise a [`TestTracker`] for tests
///
/// Returns both the concrete [`TestTracker`] (for checking events) and the
/// same object as a [`Tracker`] to hand to entities.
///
/// # Examples
///
/// ```
/// use noc_track::test_helpers;
///
/// let (test_tracker, tracker) = noc_track::test_init!(10);
/// let top = noc_track::entity::toplevel(&tracker, "top");
/// test_helpers::check_and_clear(&test_tracker, &["0: created 10, top, 0, 0 bytes"]);
/// ```
#[macro_export]
macro_rules! test_init {
    ($start_id:expr) => {{
        let test_tracker = std::rc::Rc::new($crate::test_helpers::TestTracker::new($start_id));
        let tracker: $crate::Tracker = test_tracker.clone();
        (test_tracker, tracker)
    }};
}

/// Check and clear the _trace_ and _log_ output
///
/// Asserts that the events seen since the start (or the last call) match the
/// `expected` regular expressions one-for-one and then clears them.
///
/// # Panics
///
/// If the number of events differs or any event does not match.
pub fn check_and_clear(tracker: &Rc<TestTracker>, expected: &[&str]) {
    let mut events = tracker.events.borrow_mut();

    println!("Checking {:?} matches {:?}", expected, *events);

    assert_eq!(expected.len(), events.len());

    for (i, (log_expect, actual)) in expected.iter().zip(events.iter()).enumerate() {
        let re = Regex::new(log_expect).unwrap();
        println!("Checking {i}: {log_expect:?} matches {actual:?}");
        assert!(re.is_match(actual));
    }

    events.clear();
}

/// Create a tracker for a test that writes every event to
/// `traces/<test file stem>.log`.
///
/// Falls back to a tracker that drops all events if the file cannot be
/// created.
#[must_use]
pub fn create_tracker(full_filepath: &str) -> Tracker {
    // Place all trace files in one folder
    const FOLDER: &str = "traces";

    let Some(filename_only) = Path::new(full_filepath)
        .file_stem()
        .and_then(|s| s.to_str())
    else {
        return dev_null_tracker();
    };

    if fs::create_dir_all(FOLDER).is_err() {
        return dev_null_tracker();
    }
    let Ok(file) = fs::File::create(format!("{FOLDER}/{filename_only}.log")) else {
        return dev_null_tracker();
    };

    let writer: Writer = Box::new(BufWriter::new(file));
    let entity_manager = EntityManager::new(log::Level::Trace);
    let tracker: Tracker = Rc::new(TextTracker::new(entity_manager, writer));
    tracker
}
