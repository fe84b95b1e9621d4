// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Traffic patterns used to drive a network.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::config::NetworkConfig;
use crate::packet::DEFAULT_PACKET_SIZE_BYTES;
use crate::role::NodeRole;
use crate::topology::Coord;

#[derive(clap::ValueEnum, Clone, Copy, Default, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrafficPattern {
    /// Repeated exchanges between (0,0) and (1,1)
    PingPong,

    /// Every node sends to the memory controller corner
    #[default]
    Hotspot,

    /// Every node sends to its diagonal neighbour (wrapping at the edges)
    Shift,

    /// (0,0) sends to every other node
    Broadcast,

    /// Every node sends to random (valid) destinations
    UniformRandom,

    /// Every node sends to every other node
    AllToAll,

    /// Mixed master / compute / memory / I/O workload
    Workload,
}

impl fmt::Display for TrafficPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// One message to be injected into a network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Injection {
    pub src: Coord,
    pub dst: Coord,
    pub payload: String,
    pub is_priority_class: bool,
    pub size_bytes: usize,
}

impl Injection {
    #[must_use]
    pub fn new(src: Coord, dst: Coord, payload: String, size_bytes: usize) -> Self {
        Self {
            src,
            dst,
            payload,
            is_priority_class: false,
            size_bytes,
        }
    }

    #[must_use]
    pub fn priority(mut self, is_priority_class: bool) -> Self {
        self.is_priority_class = is_priority_class;
        self
    }
}

/// Parameters of a generated traffic pattern.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrafficConfig {
    pub pattern: TrafficPattern,

    /// Messages sent by each source (per destination for the patterns with
    /// several destinations per source).
    pub packets_per_source: usize,

    pub size_bytes: usize,

    /// Probability that a generated message is a memory request. Ignored by
    /// [`TrafficPattern::Workload`] which has fixed classes.
    pub priority_fraction: f64,

    /// Seed for random number generator.
    pub seed: u64,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            pattern: TrafficPattern::default(),
            packets_per_source: 1,
            size_bytes: DEFAULT_PACKET_SIZE_BYTES,
            priority_fraction: 0.0,
            seed: 1,
        }
    }
}

fn all_coords(config: &NetworkConfig) -> impl Iterator<Item = Coord> + '_ {
    (0..config.height).flat_map(move |y| (0..config.width).map(move |x| Coord::new(x, y)))
}

fn coords_with_role(config: &NetworkConfig, role: NodeRole) -> Vec<Coord> {
    all_coords(config)
        .filter(|c| NodeRole::for_position(*c, config.width, config.height) == role)
        .collect()
}

/// Generate the messages of a traffic pattern for a network.
///
/// The result is fully determined by the network dimensions and `traffic`.
#[must_use]
pub fn generate(config: &NetworkConfig, traffic: &TrafficConfig) -> Vec<Injection> {
    let mut injections = match traffic.pattern {
        TrafficPattern::PingPong => ping_pong(config, traffic),
        TrafficPattern::Hotspot => hotspot(config, traffic),
        TrafficPattern::Shift => shift(config, traffic),
        TrafficPattern::Broadcast => broadcast(config, traffic),
        TrafficPattern::UniformRandom => uniform_random(config, traffic),
        TrafficPattern::AllToAll => all_to_all(config, traffic),
        TrafficPattern::Workload => return workload(config, traffic),
    };

    let fraction = traffic.priority_fraction.clamp(0.0, 1.0);
    if fraction > 0.0 {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(traffic.seed);
        for injection in &mut injections {
            injection.is_priority_class = rng.gen_bool(fraction);
        }
    }
    injections
}

fn ping_pong(config: &NetworkConfig, traffic: &TrafficConfig) -> Vec<Injection> {
    let a = Coord::new(0, 0);
    let b = Coord::new((config.width - 1).min(1), (config.height - 1).min(1));
    let mut injections = Vec::new();
    for i in 0..traffic.packets_per_source {
        injections.push(Injection::new(a, b, format!("ping {i}"), traffic.size_bytes));
        injections.push(Injection::new(b, a, format!("pong {i}"), traffic.size_bytes));
    }
    injections
}

fn hotspot(config: &NetworkConfig, traffic: &TrafficConfig) -> Vec<Injection> {
    let target = Coord::new(config.width - 1, config.height - 1);
    let mut injections = Vec::new();
    for src in all_coords(config).filter(|c| *c != target) {
        for i in 0..traffic.packets_per_source {
            injections.push(Injection::new(
                src,
                target,
                format!("hotspot {src} #{i}"),
                traffic.size_bytes,
            ));
        }
    }
    injections
}

fn shift(config: &NetworkConfig, traffic: &TrafficConfig) -> Vec<Injection> {
    let mut injections = Vec::new();
    for src in all_coords(config) {
        let dst = Coord::new((src.x + 1) % config.width, (src.y + 1) % config.height);
        for i in 0..traffic.packets_per_source {
            injections.push(Injection::new(
                src,
                dst,
                format!("shift {src} #{i}"),
                traffic.size_bytes,
            ));
        }
    }
    injections
}

fn broadcast(config: &NetworkConfig, traffic: &TrafficConfig) -> Vec<Injection> {
    let src = Coord::new(0, 0);
    let mut injections = Vec::new();
    for dst in all_coords(config).filter(|c| *c != src) {
        for i in 0..traffic.packets_per_source {
            injections.push(Injection::new(
                src,
                dst,
                format!("broadcast to {dst} #{i}"),
                traffic.size_bytes,
            ));
        }
    }
    injections
}

fn uniform_random(config: &NetworkConfig, traffic: &TrafficConfig) -> Vec<Injection> {
    let num_nodes = config.num_nodes();
    let mut injections = Vec::new();
    if num_nodes < 2 {
        return injections;
    }

    for (source_index, src) in all_coords(config).enumerate() {
        // Create a local RNG which is different per source
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(traffic.seed ^ (source_index as u64));
        for i in 0..traffic.packets_per_source {
            let mut dest_index = rng.gen_range(0..num_nodes - 1);
            if dest_index >= source_index {
                dest_index += 1;
            }
            let dst = Coord::new(dest_index % config.width, dest_index / config.width);
            injections.push(Injection::new(
                src,
                dst,
                format!("random {src} #{i}"),
                traffic.size_bytes,
            ));
        }
    }
    injections
}

fn all_to_all(config: &NetworkConfig, traffic: &TrafficConfig) -> Vec<Injection> {
    let mut injections = Vec::new();
    for src in all_coords(config) {
        for dst in all_coords(config).filter(|c| *c != src) {
            for i in 0..traffic.packets_per_source {
                injections.push(Injection::new(
                    src,
                    dst,
                    format!("stress {src}->{dst} #{i}"),
                    traffic.size_bytes,
                ));
            }
        }
    }
    injections
}

/// Tasks go out from the master, compute nodes fetch from the memory
/// controller, I/O nodes stream towards the centre and results are collected
/// back at the master.
fn workload(config: &NetworkConfig, traffic: &TrafficConfig) -> Vec<Injection> {
    let master = Coord::new(0, 0);
    let memory = Coord::new(config.width - 1, config.height - 1);
    let centre = Coord::new(config.width / 2, config.height / 2);
    let compute = coords_with_role(config, NodeRole::Compute);
    let io = coords_with_role(config, NodeRole::Io);

    let mut injections = Vec::new();
    for dst in &compute {
        injections.push(Injection::new(
            master,
            *dst,
            format!("task distribution to {dst}"),
            256,
        ));
    }
    for src in &compute {
        injections.push(
            Injection::new(*src, memory, format!("memory access from {src}"), 1024).priority(true),
        );
    }
    for src in &io {
        for i in 0..traffic.packets_per_source {
            injections.push(Injection::new(
                *src,
                centre,
                format!("I/O data stream {i} from {src}"),
                256,
            ));
        }
    }
    for src in &compute {
        injections.push(Injection::new(
            *src,
            master,
            format!("result from {src}"),
            512,
        ));
    }
    injections
}
