// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Configuration of a network.

use serde::{Deserialize, Serialize};

use crate::topology::{Coord, Direction, TopologyKind};
use crate::types::{NocError, NocResult, NodeId};

/// Bandwidth of a single link used when none is configured (GiB/s).
pub const DEFAULT_LINK_BANDWIDTH_GIB: f64 = 40.0;

fn default_link_bandwidth_gib() -> f64 {
    DEFAULT_LINK_BANDWIDTH_GIB
}

/// Configuration structure for a network
///
/// The grid is `width` columns by `height` rows. Node IDs are allocated in
/// row-major order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Number of columns in the network
    pub width: usize,

    /// Number of rows in the network
    pub height: usize,

    /// Whether the edges wrap around
    #[serde(default)]
    pub topology: TopologyKind,

    /// Bandwidth of each link used to report utilization percentages
    #[serde(default = "default_link_bandwidth_gib")]
    pub link_bandwidth_gib: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            width: 4,
            height: 4,
            topology: TopologyKind::Mesh,
            link_bandwidth_gib: DEFAULT_LINK_BANDWIDTH_GIB,
        }
    }
}

impl NetworkConfig {
    #[must_use]
    pub fn new(width: usize, height: usize, topology: TopologyKind) -> Self {
        Self {
            width,
            height,
            topology,
            link_bandwidth_gib: DEFAULT_LINK_BANDWIDTH_GIB,
        }
    }

    #[must_use]
    pub fn mesh(width: usize, height: usize) -> Self {
        Self::new(width, height, TopologyKind::Mesh)
    }

    #[must_use]
    pub fn torus(width: usize, height: usize) -> Self {
        Self::new(width, height, TopologyKind::Torus)
    }

    #[must_use]
    pub fn with_link_bandwidth_gib(mut self, link_bandwidth_gib: f64) -> Self {
        self.link_bandwidth_gib = link_bandwidth_gib;
        self
    }

    /// Check that the grid is not empty and that every node can be given an
    /// ID.
    pub fn validate(&self) -> NocResult<()> {
        let num_nodes = self.width.checked_mul(self.height);
        if self.width == 0 || self.height == 0 || num_nodes.is_none() {
            return Err(NocError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.width * self.height
    }

    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// Fail with an address range error if `coord` is not in the grid.
    pub fn check_coord(&self, coord: Coord) -> NocResult<()> {
        if self.contains(coord) {
            Ok(())
        } else {
            Err(NocError::AddressRange {
                coord,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Row-major node ID of a coordinate.
    ///
    /// The coordinate is not validated.
    #[must_use]
    pub fn node_id(&self, coord: Coord) -> NodeId {
        coord.y * self.width + coord.x
    }

    /// Coordinate of a node ID.
    pub fn coord_of(&self, id: NodeId) -> NocResult<Coord> {
        if id >= self.num_nodes() {
            return Err(NocError::UnknownNode(id));
        }
        Ok(Coord::new(id % self.width, id / self.width))
    }

    /// The coordinate of the node wired to `coord` in `direction`.
    ///
    /// Returns `None` at the edge of a mesh and for [`Direction::Local`].
    #[must_use]
    pub fn neighbour_of(&self, coord: Coord, direction: Direction) -> Option<Coord> {
        let Coord { x, y } = coord;
        match self.topology {
            TopologyKind::Mesh => match direction {
                Direction::North if y > 0 => Some(Coord::new(x, y - 1)),
                Direction::South if y + 1 < self.height => Some(Coord::new(x, y + 1)),
                Direction::East if x + 1 < self.width => Some(Coord::new(x + 1, y)),
                Direction::West if x > 0 => Some(Coord::new(x - 1, y)),
                _ => None,
            },
            TopologyKind::Torus => match direction {
                Direction::North => Some(Coord::new(x, (y + self.height - 1) % self.height)),
                Direction::South => Some(Coord::new(x, (y + 1) % self.height)),
                Direction::East => Some(Coord::new((x + 1) % self.width, y)),
                Direction::West => Some(Coord::new((x + self.width - 1) % self.width, y)),
                Direction::Local => None,
            },
        }
    }

    /// Minimum number of hops between two nodes.
    #[must_use]
    pub fn distance(&self, from: Coord, to: Coord) -> usize {
        let dx = from.x.abs_diff(to.x);
        let dy = from.y.abs_diff(to.y);
        match self.topology {
            TopologyKind::Mesh => dx + dy,
            TopologyKind::Torus => dx.min(self.width - dx) + dy.min(self.height - dy),
        }
    }

    /// Total link bandwidth of the network (GiB/s), counting four links per
    /// node.
    #[must_use]
    pub fn total_bandwidth_gib(&self) -> f64 {
        (self.num_nodes() * Direction::LINKS.len()) as f64 * self.link_bandwidth_gib
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_row_major() {
        let config = NetworkConfig::mesh(4, 3);
        assert_eq!(config.node_id(Coord::new(0, 0)), 0);
        assert_eq!(config.node_id(Coord::new(3, 0)), 3);
        assert_eq!(config.node_id(Coord::new(1, 2)), 9);
        assert_eq!(config.coord_of(9).unwrap(), Coord::new(1, 2));
        assert_eq!(config.coord_of(12), Err(NocError::UnknownNode(12)));
    }

    #[test]
    fn mesh_edges_have_no_neighbours() {
        let config = NetworkConfig::mesh(3, 3);
        let corner = Coord::new(0, 0);
        assert_eq!(config.neighbour_of(corner, Direction::North), None);
        assert_eq!(config.neighbour_of(corner, Direction::West), None);
        assert_eq!(
            config.neighbour_of(corner, Direction::East),
            Some(Coord::new(1, 0))
        );
        assert_eq!(
            config.neighbour_of(corner, Direction::South),
            Some(Coord::new(0, 1))
        );
        assert_eq!(config.neighbour_of(corner, Direction::Local), None);
    }

    #[test]
    fn torus_edges_wrap() {
        let config = NetworkConfig::torus(4, 3);
        let corner = Coord::new(0, 0);
        assert_eq!(
            config.neighbour_of(corner, Direction::North),
            Some(Coord::new(0, 2))
        );
        assert_eq!(
            config.neighbour_of(corner, Direction::West),
            Some(Coord::new(3, 0))
        );
        assert_eq!(
            config.neighbour_of(Coord::new(3, 2), Direction::East),
            Some(Coord::new(0, 2))
        );
        assert_eq!(
            config.neighbour_of(Coord::new(3, 2), Direction::South),
            Some(Coord::new(3, 0))
        );
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert_eq!(
            NetworkConfig::mesh(0, 4).validate(),
            Err(NocError::InvalidDimensions {
                width: 0,
                height: 4
            })
        );
        assert!(NetworkConfig::torus(1, 1).validate().is_ok());
    }

    #[test]
    fn node_count_overflow_rejected() {
        let config = NetworkConfig::mesh(usize::MAX, 2);
        assert_eq!(
            config.validate(),
            Err(NocError::InvalidDimensions {
                width: usize::MAX,
                height: 2
            })
        );
    }

    #[test]
    fn link_bandwidth_defaults_when_missing() {
        let config: NetworkConfig =
            serde_json::from_str(r#"{"width": 2, "height": 3, "topology": "torus"}"#).unwrap();
        assert_eq!(config, NetworkConfig::torus(2, 3));
    }
}
