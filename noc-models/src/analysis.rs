// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Network-wide statistics derived from the per-node counters.
//!
//! Nothing here is stored; every call recomputes from the nodes so the
//! results always reflect the current state of the network.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::network::Network;
use crate::packet::TrafficClass;
use crate::role::NodeRole;
use crate::stats::{ClassTraffic, Traffic};
use crate::topology::{Coord, Direction, TopologyKind};
use crate::types::{NodeId, Tick};

/// Nodes whose forwarding ratio exceeds this are flagged as congested.
pub const HOTSPOT_RATIO_THRESHOLD: f64 = 0.5;

const BYTES_PER_GIB: f64 = (1u64 << 30) as f64;

/// System level totals and averages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemSummary {
    pub width: usize,
    pub height: usize,
    pub topology: TopologyKind,
    pub steps: Tick,
    pub sent: Traffic,
    pub received: Traffic,
    pub forwarded: Traffic,

    /// `received / sent * 100`, 0 if nothing was sent.
    pub success_rate: f64,

    /// Mean latency (in steps) of all delivered packets.
    pub avg_latency: f64,

    /// Mean of the average hop count of each node that received packets.
    pub avg_hop_count: f64,

    pub by_direction: BTreeMap<Direction, Traffic>,
    pub by_class: BTreeMap<TrafficClass, ClassTraffic>,
    pub in_flight: usize,

    /// Bytes touched as a percentage of the total link bandwidth.
    pub network_utilization: f64,
}

/// Traffic carried by one link, in either direction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkUtilization {
    /// The lower of the two endpoints
    pub a: Coord,
    pub b: Coord,
    pub traffic: Traffic,

    /// Bytes as a percentage of one second of link bandwidth.
    pub utilization: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HotspotEntry {
    pub coord: Coord,
    pub node_id: NodeId,
    pub role: NodeRole,
    pub total_bytes: u64,
    pub forwarded_packets: u64,

    /// `forwarded / (sent + received + 1)`
    pub forwarding_ratio: f64,

    pub congested: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HotspotReport {
    /// All nodes by total bytes, busiest first.
    pub ranking: Vec<HotspotEntry>,

    /// Congested nodes by forwarding ratio, highest first.
    pub congested: Vec<HotspotEntry>,
}

impl HotspotReport {
    /// The `n` busiest nodes.
    #[must_use]
    pub fn top(&self, n: usize) -> &[HotspotEntry] {
        &self.ranking[..n.min(self.ranking.len())]
    }

    #[must_use]
    pub fn is_congested(&self, coord: Coord) -> bool {
        self.congested.iter().any(|entry| entry.coord == coord)
    }
}

impl Network {
    /// Traffic from each node to the node it was handed to.
    ///
    /// Built from the per-direction counters by following the wired
    /// neighbour in each direction. Delivered traffic maps a node to itself.
    /// Only pairs with traffic are present.
    #[must_use]
    pub fn traffic_matrix(&self) -> BTreeMap<(Coord, Coord), Traffic> {
        let mut matrix: BTreeMap<(Coord, Coord), Traffic> = BTreeMap::new();
        for node in self.nodes() {
            for direction in Direction::ALL {
                let traffic = node.stats().direction(direction);
                if traffic.is_empty() {
                    continue;
                }
                let to = match direction {
                    Direction::Local => Some(node.coord()),
                    _ => node
                        .neighbour(direction)
                        .and_then(|id| self.coord_of(id).ok()),
                };
                if let Some(to) = to {
                    *matrix.entry((node.coord(), to)).or_default() += traffic;
                }
            }
        }
        matrix
    }

    /// Traffic carried by each link that was used, sorted by endpoints.
    #[must_use]
    pub fn link_utilization(&self) -> Vec<LinkUtilization> {
        let mut links: BTreeMap<(Coord, Coord), Traffic> = BTreeMap::new();
        for ((from, to), traffic) in self.traffic_matrix() {
            if from == to {
                continue;
            }
            let key = if from < to { (from, to) } else { (to, from) };
            *links.entry(key).or_default() += traffic;
        }

        let link_bytes = self.config().link_bandwidth_gib * BYTES_PER_GIB;
        links
            .into_iter()
            .map(|((a, b), traffic)| LinkUtilization {
                a,
                b,
                traffic,
                utilization: if link_bytes > 0.0 {
                    traffic.bytes as f64 / link_bytes * 100.0
                } else {
                    0.0
                },
            })
            .collect()
    }

    /// Bytes sent, received and forwarded by all nodes as a percentage of the
    /// network's theoretical bandwidth.
    #[must_use]
    pub fn network_utilization(&self) -> f64 {
        let total_bytes: u64 = self.nodes().map(|node| node.stats().total_bytes()).sum();
        let capacity = self.config().total_bandwidth_gib();
        if capacity > 0.0 {
            total_bytes as f64 / BYTES_PER_GIB / capacity * 100.0
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn hotspot_report(&self) -> HotspotReport {
        let mut ranking: Vec<HotspotEntry> = self
            .nodes()
            .map(|node| {
                let stats = node.stats();
                let forwarding_ratio = stats.forwarding_ratio();
                HotspotEntry {
                    coord: node.coord(),
                    node_id: node.id(),
                    role: node.role(),
                    total_bytes: stats.total_bytes(),
                    forwarded_packets: stats.forwarded.packets,
                    forwarding_ratio,
                    congested: stats.forwarded.packets > 0
                        && forwarding_ratio > HOTSPOT_RATIO_THRESHOLD,
                }
            })
            .collect();

        let mut congested: Vec<HotspotEntry> =
            ranking.iter().filter(|e| e.congested).cloned().collect();
        congested.sort_by(|a, b| b.forwarding_ratio.total_cmp(&a.forwarding_ratio));

        ranking.sort_by(|a, b| b.total_bytes.cmp(&a.total_bytes));
        HotspotReport { ranking, congested }
    }

    #[must_use]
    pub fn system_summary(&self) -> SystemSummary {
        let mut sent = Traffic::default();
        let mut received = Traffic::default();
        let mut forwarded = Traffic::default();
        let mut by_direction: BTreeMap<Direction, Traffic> = BTreeMap::new();
        let mut by_class: BTreeMap<TrafficClass, ClassTraffic> = BTreeMap::new();
        let mut latency_sum: Tick = 0;
        let mut latency_count: usize = 0;
        let mut node_hop_averages = Vec::new();

        for node in self.nodes() {
            let stats = node.stats();
            sent += stats.sent;
            received += stats.received;
            forwarded += stats.forwarded;
            for direction in Direction::ALL {
                *by_direction.entry(direction).or_default() += stats.direction(direction);
            }
            for class in TrafficClass::ALL {
                *by_class.entry(class).or_default() += stats.class(class);
            }
            latency_sum += stats.latencies.iter().sum::<Tick>();
            latency_count += stats.latencies.len();
            if stats.received.packets > 0 {
                node_hop_averages.push(stats.avg_hop_count());
            }
        }

        let success_rate = if sent.packets > 0 {
            received.packets as f64 / sent.packets as f64 * 100.0
        } else {
            0.0
        };
        let avg_latency = if latency_count > 0 {
            latency_sum as f64 / latency_count as f64
        } else {
            0.0
        };
        let avg_hop_count = if node_hop_averages.is_empty() {
            0.0
        } else {
            node_hop_averages.iter().sum::<f64>() / node_hop_averages.len() as f64
        };

        SystemSummary {
            width: self.width(),
            height: self.height(),
            topology: self.topology(),
            steps: self.current_step(),
            sent,
            received,
            forwarded,
            success_rate,
            avg_latency,
            avg_hop_count,
            by_direction,
            by_class,
            in_flight: self.in_flight(),
            network_utilization: self.network_utilization(),
        }
    }
}
