// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

use crate::tracker::{EntityManager, Track};
use crate::{Id, SharedWriter, Writer};

/// A simple text logger to output messages to a Writer.
///
/// Log messages are prefixed with the simulation step that was current when
/// they were emitted.
pub struct TextTracker {
    entity_manager: EntityManager,

    /// Writer to which all _log_ events will be written.
    writer: SharedWriter,
}

impl TextTracker {
    /// Create a new [`TextTracker`] with an [`EntityManager`].
    pub fn new(entity_manager: EntityManager, writer: Writer) -> Self {
        Self {
            entity_manager,
            writer: Rc::new(RefCell::new(writer)),
        }
    }

    fn write_line(&self, line: fmt::Arguments) {
        if let Err(e) = writeln!(self.writer.borrow_mut(), "{line}") {
            eprintln!("Failed to write track event: {e}");
        }
    }
}

/// Implementation for each [`Track`] event
impl Track for TextTracker {
    fn unique_id(&self) -> Id {
        self.entity_manager.unique_id()
    }

    fn is_entity_enabled(&self, id: Id, level: log::Level) -> bool {
        self.entity_manager.is_log_enabled_at_level(id, level)
    }

    fn add_entity(&self, id: Id, entity_name: &str) {
        self.entity_manager.add_entity(id, entity_name);
    }

    fn enter(&self, id: Id, object: Id) {
        self.write_line(format_args!("{id}: enter {object}"));
    }

    fn exit(&self, id: Id, object: Id) {
        self.write_line(format_args!("{id}: exit {object}"));
    }

    fn create(&self, created_by: Id, id: Id, num_bytes: usize, req_type: i8, name: &str) {
        self.write_line(format_args!(
            "{created_by}: created {id}, {name}, {req_type}, {num_bytes} bytes"
        ));
    }

    fn destroy(&self, destroyed_by: Id, id: Id) {
        self.write_line(format_args!("{destroyed_by}: destroyed {id}"));
    }

    fn connect(&self, connect_from: Id, connect_to: Id) {
        self.write_line(format_args!("{connect_from}: connect to {connect_to}"));
    }

    fn log(&self, id: Id, level: log::Level, msg: std::fmt::Arguments) {
        let step = self.entity_manager.step();
        self.write_line(format_args!("[{step}] {id}:{level}: {msg}"));
    }

    fn time(&self, set_by: Id, step: u64) {
        self.entity_manager.set_step(step);
        if self.is_entity_enabled(set_by, log::Level::Trace) {
            self.write_line(format_args!("{set_by}: step {step}"));
        }
    }

    fn shutdown(&self) {
        if let Err(e) = self.writer.borrow_mut().flush() {
            eprintln!("Failed to flush track output: {e}");
        }
    }
}
