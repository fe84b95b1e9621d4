// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Routing decisions.
//!
//! A router is owned by a node and decides, for a packet destination, which
//! direction the packet should leave the node in. Routing has no side effects
//! and always resolves the X dimension before the Y dimension.

use crate::config::NetworkConfig;
use crate::topology::{Coord, Direction, TopologyKind};

/// Interface of a routing-decision engine.
pub trait Route {
    /// Return the next hop for a packet at this router heading to
    /// `destination`. Returns [`Direction::Local`] if and only if the
    /// destination is this router's node.
    fn route(&self, destination: Coord) -> Direction;
}

/// Dimension-ordered routing for a mesh.
#[must_use]
pub fn route_mesh(current: Coord, destination: Coord) -> Direction {
    if destination.x > current.x {
        Direction::East
    } else if destination.x < current.x {
        Direction::West
    } else if destination.y > current.y {
        Direction::South
    } else if destination.y < current.y {
        Direction::North
    } else {
        Direction::Local
    }
}

/// Resolve one dimension of a torus route.
///
/// Returns `None` when already aligned. Ties between the direct and the
/// wraparound distance take the direct path.
fn torus_step(
    current: usize,
    destination: usize,
    size: usize,
    increasing: Direction,
    decreasing: Direction,
) -> Option<Direction> {
    if current == destination {
        return None;
    }
    let direct_distance = current.abs_diff(destination);
    let wrap_distance = size - direct_distance;
    let direct = if destination > current {
        increasing
    } else {
        decreasing
    };
    if direct_distance <= wrap_distance {
        Some(direct)
    } else {
        Some(direct.opposite())
    }
}

/// Shortest-direction routing with wraparound for a torus.
#[must_use]
pub fn route_torus(current: Coord, destination: Coord, width: usize, height: usize) -> Direction {
    torus_step(
        current.x,
        destination.x,
        width,
        Direction::East,
        Direction::West,
    )
    .or_else(|| {
        torus_step(
            current.y,
            destination.y,
            height,
            Direction::South,
            Direction::North,
        )
    })
    .unwrap_or(Direction::Local)
}

/// The router held by each node.
#[derive(Clone, Debug)]
pub struct NodeRouter {
    position: Coord,
    width: usize,
    height: usize,
    topology: TopologyKind,
}

impl NodeRouter {
    #[must_use]
    pub fn new(position: Coord, config: &NetworkConfig) -> Self {
        Self {
            position,
            width: config.width,
            height: config.height,
            topology: config.topology,
        }
    }

    #[must_use]
    pub fn position(&self) -> Coord {
        self.position
    }
}

impl Route for NodeRouter {
    fn route(&self, destination: Coord) -> Direction {
        match self.topology {
            TopologyKind::Mesh => route_mesh(self.position, destination),
            TopologyKind::Torus => {
                route_torus(self.position, destination, self.width, self.height)
            }
        }
    }
}
