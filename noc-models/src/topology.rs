// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Grid coordinates, link directions and topology kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a node in the grid.
///
/// `x` grows to the east, `y` grows to the south.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

impl From<(usize, usize)> for Coord {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

/// Next-hop direction chosen by a router.
#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards `y - 1`
    North,

    /// Towards `y + 1`
    South,

    /// Towards `x + 1`
    East,

    /// Towards `x - 1`
    West,

    /// The packet has arrived
    Local,
}

impl Direction {
    /// All directions, in the order used for reports.
    pub const ALL: [Direction; 5] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::Local,
    ];

    /// The directions that correspond to links between nodes.
    pub const LINKS: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Index into per-link tables. `Local` has no link so returns `None`.
    #[must_use]
    pub fn link_index(self) -> Option<usize> {
        match self {
            Direction::North => Some(0),
            Direction::South => Some(1),
            Direction::East => Some(2),
            Direction::West => Some(3),
            Direction::Local => None,
        }
    }

    /// The direction a neighbour uses to point back at this node.
    #[must_use]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Local => Direction::Local,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
            Direction::Local => "local",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(
    clap::ValueEnum, Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum TopologyKind {
    /// Edge nodes have no neighbour in the outward direction
    #[default]
    Mesh,

    /// Edge nodes wrap around to the opposite edge in both dimensions
    Torus,
}

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TopologyKind::Mesh => write!(f, "mesh"),
            TopologyKind::Torus => write!(f, "torus"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposites_pair_up() {
        for direction in Direction::LINKS {
            assert_ne!(direction, direction.opposite());
            assert_eq!(direction, direction.opposite().opposite());
        }
        assert_eq!(Direction::Local.opposite(), Direction::Local);
    }

    #[test]
    fn link_indices_are_distinct() {
        let mut seen = [false; 4];
        for direction in Direction::LINKS {
            let index = direction.link_index().unwrap();
            assert!(!seen[index]);
            seen[index] = true;
        }
        assert!(Direction::Local.link_index().is_none());
    }
}
