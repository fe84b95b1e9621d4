// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Per-node traffic counters.

use std::collections::BTreeMap;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::packet::{Packet, TrafficClass};
use crate::topology::Direction;
use crate::types::Tick;

/// A packet and byte count.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Traffic {
    pub packets: u64,
    pub bytes: u64,
}

impl Traffic {
    pub fn record(&mut self, size_bytes: usize) {
        self.packets += 1;
        self.bytes += size_bytes as u64;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packets == 0
    }
}

impl AddAssign for Traffic {
    fn add_assign(&mut self, other: Self) {
        self.packets += other.packets;
        self.bytes += other.bytes;
    }
}

/// Traffic of one class broken down by what happened to it at a node.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ClassTraffic {
    pub sent: Traffic,
    pub received: Traffic,
    pub forwarded: Traffic,
}

impl AddAssign for ClassTraffic {
    fn add_assign(&mut self, other: Self) {
        self.sent += other.sent;
        self.received += other.received;
        self.forwarded += other.forwarded;
    }
}

fn empty_direction_table() -> BTreeMap<Direction, Traffic> {
    Direction::ALL
        .iter()
        .map(|direction| (*direction, Traffic::default()))
        .collect()
}

fn empty_class_table() -> BTreeMap<TrafficClass, ClassTraffic> {
    TrafficClass::ALL
        .iter()
        .map(|class| (*class, ClassTraffic::default()))
        .collect()
}

/// Counters kept by every node.
///
/// Forwarding is attributed to the node that made the routing decision.
/// Delivery is recorded in the [`Direction::Local`] bucket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeStats {
    pub sent: Traffic,
    pub received: Traffic,
    pub forwarded: Traffic,
    pub by_direction: BTreeMap<Direction, Traffic>,
    pub by_class: BTreeMap<TrafficClass, ClassTraffic>,

    /// End-to-end latency of each delivered packet, in steps.
    pub latencies: Vec<Tick>,

    /// Sum of the hop counts of delivered packets.
    pub total_hop_count: u64,
}

impl Default for NodeStats {
    fn default() -> Self {
        Self {
            sent: Traffic::default(),
            received: Traffic::default(),
            forwarded: Traffic::default(),
            by_direction: empty_direction_table(),
            by_class: empty_class_table(),
            latencies: Vec::new(),
            total_hop_count: 0,
        }
    }
}

impl NodeStats {
    fn class_mut(&mut self, class: TrafficClass) -> &mut ClassTraffic {
        self.by_class.entry(class).or_default()
    }

    pub fn record_sent(&mut self, packet: &Packet) {
        self.sent.record(packet.size_bytes);
        self.class_mut(packet.traffic_class)
            .sent
            .record(packet.size_bytes);
    }

    pub fn record_forwarded(&mut self, direction: Direction, packet: &Packet) {
        self.forwarded.record(packet.size_bytes);
        self.by_direction
            .entry(direction)
            .or_default()
            .record(packet.size_bytes);
        self.class_mut(packet.traffic_class)
            .forwarded
            .record(packet.size_bytes);
    }

    pub fn record_received(&mut self, packet: &Packet, latency: Tick) {
        self.received.record(packet.size_bytes);
        self.latencies.push(latency);
        self.total_hop_count += packet.hop_count as u64;
        self.by_direction
            .entry(Direction::Local)
            .or_default()
            .record(packet.size_bytes);
        self.class_mut(packet.traffic_class)
            .received
            .record(packet.size_bytes);
    }

    #[must_use]
    pub fn direction(&self, direction: Direction) -> Traffic {
        self.by_direction
            .get(&direction)
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn class(&self, class: TrafficClass) -> ClassTraffic {
        self.by_class.get(&class).copied().unwrap_or_default()
    }

    /// Bytes sent, received and forwarded by this node.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.sent.bytes + self.received.bytes + self.forwarded.bytes
    }

    #[must_use]
    pub fn total_packets(&self) -> u64 {
        self.sent.packets + self.received.packets + self.forwarded.packets
    }

    /// Mean latency of delivered packets, 0 if none were delivered.
    #[must_use]
    pub fn avg_latency(&self) -> f64 {
        if self.latencies.is_empty() {
            return 0.0;
        }
        self.latencies.iter().sum::<Tick>() as f64 / self.latencies.len() as f64
    }

    /// Mean hop count of delivered packets, 0 if none were delivered.
    #[must_use]
    pub fn avg_hop_count(&self) -> f64 {
        if self.received.packets == 0 {
            return 0.0;
        }
        self.total_hop_count as f64 / self.received.packets as f64
    }

    /// `forwarded / (sent + received + 1)`
    #[must_use]
    pub fn forwarding_ratio(&self) -> f64 {
        self.forwarded.packets as f64 / (self.sent.packets + self.received.packets + 1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Coord;

    fn packet(size_bytes: usize, hop_count: usize, class: TrafficClass) -> Packet {
        let mut packet = Packet::new(1, Coord::new(0, 0), Coord::new(1, 0), "p", class, size_bytes, 0);
        packet.hop_count = hop_count;
        packet
    }

    #[test]
    fn empty_node_averages_are_zero() {
        let stats = NodeStats::default();
        assert_eq!(stats.avg_latency(), 0.0);
        assert_eq!(stats.avg_hop_count(), 0.0);
        assert_eq!(stats.forwarding_ratio(), 0.0);
        assert_eq!(stats.by_direction.len(), 5);
        assert_eq!(stats.by_class.len(), 2);
    }

    #[test]
    fn counters_accumulate() {
        let mut stats = NodeStats::default();
        stats.record_sent(&packet(64, 0, TrafficClass::Data));
        stats.record_forwarded(Direction::East, &packet(32, 0, TrafficClass::MemoryRequest));
        stats.record_received(&packet(128, 3, TrafficClass::MemoryRequest), 4);
        stats.record_received(&packet(128, 1, TrafficClass::Data), 2);

        assert_eq!(stats.sent, Traffic { packets: 1, bytes: 64 });
        assert_eq!(stats.forwarded, Traffic { packets: 1, bytes: 32 });
        assert_eq!(stats.received, Traffic { packets: 2, bytes: 256 });
        assert_eq!(stats.direction(Direction::East).bytes, 32);
        assert_eq!(stats.direction(Direction::Local).packets, 2);
        assert_eq!(stats.class(TrafficClass::MemoryRequest).received.bytes, 128);
        assert_eq!(stats.class(TrafficClass::Data).sent.packets, 1);
        assert_eq!(stats.total_bytes(), 352);
        assert_eq!(stats.avg_latency(), 3.0);
        assert_eq!(stats.avg_hop_count(), 2.0);
        assert_eq!(stats.forwarding_ratio(), 0.25);
    }
}
