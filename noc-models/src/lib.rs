// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Models of a 2D mesh or torus network-on-chip.
//!
//! A [`Network`](network::Network) is a `width` x `height` grid of
//! [`Node`](node::Node)s. Every node is connected to up to four neighbours
//! (north, south, east, west) and routes packets one hop at a time using
//! dimension-ordered XY routing. On a torus the edges wrap around and each
//! dimension takes the shorter way round.
//!
//! The network is step driven: nothing moves until
//! [`simulate_step`](network::Network::simulate_step) is called. Every node
//! keeps [`NodeStats`](stats::NodeStats) from which the
//! [`analysis`] and [`export`] modules derive system-wide reports.
//!
//! # Example
//!
//! ```rust
//! use noc_models::config::NetworkConfig;
//! use noc_models::network::Network;
//! use noc_models::topology::Coord;
//! use noc_track::entity::toplevel;
//! use noc_track::tracker::dev_null_tracker;
//!
//! let top = toplevel(&dev_null_tracker(), "top");
//! let mut network = Network::new(&top, "mesh", NetworkConfig::mesh(4, 4)).unwrap();
//! network
//!     .send_message(Coord::new(0, 0), Coord::new(3, 3), "hello")
//!     .unwrap();
//! network.run_until_drained(100).unwrap();
//!
//! let stats = network.node(Coord::new(3, 3)).unwrap().stats();
//! assert_eq!(stats.received.packets, 1);
//! ```

pub mod analysis;
pub mod config;
pub mod export;
pub mod network;
pub mod node;
pub mod packet;
pub mod role;
pub mod router;
pub mod sink;
pub mod stats;
pub mod test_helpers;
pub mod topology;
pub mod traffic;
pub mod types;
