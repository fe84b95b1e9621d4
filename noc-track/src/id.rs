// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Id

/// IDs that should be unique across the simulation
///
/// Entities take their IDs from the [`Tracker`](crate::Tracker). Packets use
/// the network's packet counter so that their IDs are stable regardless of
/// which tracker is installed.
#[derive(Copy, Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Id(pub u64);

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Debug for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
