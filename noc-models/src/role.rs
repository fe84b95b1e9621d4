// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Workload roles assigned to nodes by their position in the grid.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::topology::Coord;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// The `(0,0)` corner
    Master,

    /// The corner opposite the master
    MemoryController,

    /// Any other node on the edge of the grid
    Io,

    /// Interior nodes
    Compute,
}

impl NodeRole {
    /// Role of the node at `coord` in a `width` x `height` grid.
    #[must_use]
    pub fn for_position(coord: Coord, width: usize, height: usize) -> Self {
        let max_x = width.saturating_sub(1);
        let max_y = height.saturating_sub(1);
        if coord.x == 0 && coord.y == 0 {
            NodeRole::Master
        } else if coord.x == max_x && coord.y == max_y {
            NodeRole::MemoryController
        } else if coord.x == 0 || coord.y == 0 || coord.x == max_x || coord.y == max_y {
            NodeRole::Io
        } else {
            NodeRole::Compute
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            NodeRole::Master => "master core - STREAM benchmark",
            NodeRole::MemoryController => "memory controller - random access",
            NodeRole::Io => "I/O core - single stream",
            NodeRole::Compute => "compute core - GUPS benchmark",
        }
    }
}

/// Written the same way as the serialized form so that every export agrees.
impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            NodeRole::Master => "master",
            NodeRole::MemoryController => "memory_controller",
            NodeRole::Io => "io",
            NodeRole::Compute => "compute",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_by_four() {
        let role = |x, y| NodeRole::for_position(Coord::new(x, y), 4, 4);
        assert_eq!(role(0, 0), NodeRole::Master);
        assert_eq!(role(3, 3), NodeRole::MemoryController);
        assert_eq!(role(3, 0), NodeRole::Io);
        assert_eq!(role(0, 2), NodeRole::Io);
        assert_eq!(role(1, 1), NodeRole::Compute);
        assert_eq!(role(2, 2), NodeRole::Compute);
    }

    #[test]
    fn single_node_is_master() {
        assert_eq!(
            NodeRole::for_position(Coord::new(0, 0), 1, 1),
            NodeRole::Master
        );
    }

    #[test]
    fn display_matches_serialized_name() {
        for role in [
            NodeRole::Master,
            NodeRole::MemoryController,
            NodeRole::Io,
            NodeRole::Compute,
        ] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{role}\""));
        }
    }
}
