// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use std::rc::Rc;

use noc_track::entity::{Entity, toplevel};
use noc_track::test_helpers::create_tracker;

use crate::config::NetworkConfig;
use crate::network::Network;

/// Create the top-level entity for a test, tracing to a file named after
/// the test source file.
#[must_use]
pub fn start_test(full_filepath: &str) -> Rc<Entity> {
    toplevel(&create_tracker(full_filepath), "top")
}

/// Create a built network for a test.
///
/// # Panics
///
/// If the configuration is invalid.
#[must_use]
pub fn test_network(full_filepath: &str, config: NetworkConfig) -> Network {
    let top = start_test(full_filepath);
    Network::new(&top, "noc", config).unwrap()
}
