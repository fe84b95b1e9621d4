// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Shared types.

use std::error::Error;
use std::fmt;

use crate::topology::{Coord, Direction};

/// Simulation time, counted in network steps.
pub type Tick = u64;

/// Row-major index of a node in the grid (`y * width + x`).
pub type NodeId = usize;

/// The `NocError` is what should be returned in the case of an error
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NocError {
    /// A coordinate lies outside the `width` x `height` grid.
    AddressRange {
        coord: Coord,
        width: usize,
        height: usize,
    },

    /// A packet was routed towards a direction with no wired neighbour.
    UnreachableNeighbor { at: Coord, direction: Direction },

    /// Injection or simulation was attempted before the network was built.
    NotBuilt,

    /// The network has already been built.
    AlreadyBuilt,

    /// A network needs at least one row and one column.
    InvalidDimensions { width: usize, height: usize },

    /// Packets must carry at least one byte.
    InvalidPacketSize,

    /// No node has this ID.
    UnknownNode(NodeId),

    /// Exporting statistics failed.
    Io(String),
}

impl fmt::Display for NocError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NocError::AddressRange {
                coord,
                width,
                height,
            } => {
                write!(f, "Error: {coord} is outside the {width}x{height} grid")
            }
            NocError::UnreachableNeighbor { at, direction } => {
                write!(f, "Error: node {at} has no neighbour to the {direction}")
            }
            NocError::NotBuilt => write!(f, "Error: network has not been built"),
            NocError::AlreadyBuilt => write!(f, "Error: network has already been built"),
            NocError::InvalidDimensions { width, height } => {
                write!(f, "Error: invalid network dimensions {width}x{height}")
            }
            NocError::InvalidPacketSize => write!(f, "Error: packet size must be non-zero"),
            NocError::UnknownNode(id) => write!(f, "Error: unknown node {id}"),
            NocError::Io(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl Error for NocError {}

impl From<std::io::Error> for NocError {
    fn from(e: std::io::Error) -> Self {
        NocError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for NocError {
    fn from(e: serde_json::Error) -> Self {
        NocError::Io(e.to_string())
    }
}

/// The NocResult is the return type for most network functions
pub type NocResult<T> = Result<T, NocError>;
