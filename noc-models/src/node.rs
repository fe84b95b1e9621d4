// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! A node of the network grid.
//!
//! Each node has a single input queue holding packets that are waiting for a
//! routing decision, and one output queue per link direction holding packets
//! that have been routed and are waiting to cross to the neighbour:
//!
//! ```txt
//!                      +-----------------------------+
//!                      |            NODE             |
//!  injected  --------> | input -> ROUTER -+-> north  | --> neighbour input
//!  neighbour --------> |                  +-> south  | --> neighbour input
//!                      |                  +-> east   | --> neighbour input
//!                      |                  +-> west   | --> neighbour input
//!                      |                  \-> local (delivered)
//!                      +-----------------------------+
//! ```
//!
//! Neighbours are held as node IDs; the [`Network`](crate::network::Network)
//! owns all nodes and performs the transfers between them.

use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use noc_track::entity::{Entity, GetEntity};
use noc_track::{create, create_id, debug, destroy, enter, exit, trace};

use crate::config::NetworkConfig;
use crate::packet::{Packet, TrafficClass};
use crate::role::NodeRole;
use crate::router::{NodeRouter, Route};
use crate::sink::StatsSink;
use crate::stats::NodeStats;
use crate::topology::{Coord, Direction};
use crate::types::{NodeId, Tick};

pub struct Node {
    pub entity: Rc<Entity>,
    id: NodeId,
    coord: Coord,
    role: NodeRole,
    router: NodeRouter,
    neighbours: [Option<NodeId>; 4],
    input_queue: VecDeque<Packet>,
    output_queues: [VecDeque<Packet>; 4],
    stats: NodeStats,
}

impl Node {
    #[must_use]
    pub fn new(parent: &Rc<Entity>, id: NodeId, coord: Coord, config: &NetworkConfig) -> Self {
        let entity = Rc::new(Entity::new(parent, &format!("node_{}_{}", coord.x, coord.y)));
        Self {
            entity,
            id,
            coord,
            role: NodeRole::for_position(coord, config.width, config.height),
            router: NodeRouter::new(coord, config),
            neighbours: [None; 4],
            input_queue: VecDeque::new(),
            output_queues: Default::default(),
            stats: NodeStats::default(),
        }
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn coord(&self) -> Coord {
        self.coord
    }

    #[must_use]
    pub fn role(&self) -> NodeRole {
        self.role
    }

    #[must_use]
    pub fn stats(&self) -> &NodeStats {
        &self.stats
    }

    /// The node wired in `direction`, if any.
    #[must_use]
    pub fn neighbour(&self, direction: Direction) -> Option<NodeId> {
        direction
            .link_index()
            .and_then(|index| self.neighbours[index])
    }

    pub(crate) fn set_neighbour(&mut self, direction: Direction, neighbour: NodeId) {
        if let Some(index) = direction.link_index() {
            self.neighbours[index] = Some(neighbour);
        }
    }

    #[cfg(test)]
    pub(crate) fn clear_neighbour(&mut self, direction: Direction) {
        if let Some(index) = direction.link_index() {
            self.neighbours[index] = None;
        }
    }

    #[must_use]
    pub fn input_queue_len(&self) -> usize {
        self.input_queue.len()
    }

    /// Packets waiting for a routing decision, oldest first.
    pub fn input_queue(&self) -> impl Iterator<Item = &Packet> {
        self.input_queue.iter()
    }

    #[must_use]
    pub fn output_queue_len(&self, direction: Direction) -> usize {
        direction
            .link_index()
            .map_or(0, |index| self.output_queues[index].len())
    }

    /// Number of packets held in any queue of this node.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.input_queue.len()
            + self
                .output_queues
                .iter()
                .map(VecDeque::len)
                .sum::<usize>()
    }

    /// Create a packet at this node and queue it for routing.
    #[expect(clippy::too_many_arguments)]
    pub fn enqueue_send(
        &mut self,
        destination: Coord,
        payload: &str,
        packet_id: u64,
        traffic_class: TrafficClass,
        size_bytes: usize,
        now: Tick,
        sink: &mut dyn StatsSink,
    ) {
        let packet = Packet::new(
            packet_id,
            self.coord,
            destination,
            payload,
            traffic_class,
            size_bytes,
            now,
        )
        .with_track_id(create_id!(self.entity));

        create!(self.entity ; packet.track_id, size_bytes, traffic_class.req_type(), payload);
        debug!(self.entity ; "send {}", packet);

        self.stats.record_sent(&packet);
        sink.packet_sent(self.coord, &packet);
        self.input_queue.push_back(packet);
    }

    /// Route every packet in the input queue.
    ///
    /// Packets for this node are delivered and dropped, all others move to
    /// the output queue of the chosen direction. Forwarding is counted here,
    /// at the node making the decision.
    pub fn process_input_queue(&mut self, now: Tick, sink: &mut dyn StatsSink) {
        while let Some(packet) = self.input_queue.pop_front() {
            let direction = self.router.route(packet.destination);
            match direction.link_index() {
                None => self.deliver(packet, now, sink),
                Some(index) => {
                    trace!(self.entity ; "route {} {}", packet.packet_id, direction);
                    self.stats.record_forwarded(direction, &packet);
                    sink.packet_forwarded(self.coord, direction, &packet);
                    self.output_queues[index].push_back(packet);
                }
            }
        }
    }

    fn deliver(&mut self, packet: Packet, now: Tick, sink: &mut dyn StatsSink) {
        let latency = now.saturating_sub(packet.created_at);
        debug!(self.entity ; "received {} after {} hops, latency {}", packet, packet.hop_count, latency);

        self.stats.record_received(&packet, latency);
        sink.packet_received(self.coord, &packet, latency);
        destroy!(self.entity ; packet.track_id);
    }

    /// Remove the oldest packet waiting to cross the link in `direction`.
    pub(crate) fn take_for_transfer(&mut self, direction: Direction) -> Option<Packet> {
        let index = direction.link_index()?;
        let packet = self.output_queues[index].pop_front()?;
        exit!(self.entity ; packet.track_id);
        Some(packet)
    }

    /// Accept a packet arriving from a neighbour.
    pub(crate) fn accept(&mut self, packet: Packet) {
        enter!(self.entity ; packet.track_id);
        self.input_queue.push_back(packet);
    }
}

impl GetEntity for Node {
    fn entity(&self) -> &Rc<Entity> {
        &self.entity
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{NullSink, RecordingSink, SinkEvent};
    use crate::test_helpers::start_test;

    #[test]
    fn local_packet_delivered_on_first_pass() {
        let top = start_test(file!());
        let config = NetworkConfig::mesh(2, 2);
        let mut node = Node::new(&top, 0, Coord::new(0, 0), &config);
        let mut sink = NullSink;

        node.enqueue_send(Coord::new(0, 0), "self", 1, TrafficClass::Data, 64, 0, &mut sink);
        assert_eq!(node.in_flight(), 1);
        assert_eq!(node.stats().sent.packets, 1);

        node.process_input_queue(1, &mut sink);
        assert_eq!(node.in_flight(), 0);
        assert_eq!(node.stats().received.bytes, 64);
        assert_eq!(node.stats().forwarded.packets, 0);
        assert_eq!(node.stats().latencies, vec![1]);
    }

    #[test]
    fn forwarding_is_counted_at_deciding_node() {
        let top = start_test(file!());
        let config = NetworkConfig::mesh(2, 2);
        let mut node = Node::new(&top, 0, Coord::new(0, 0), &config);
        let recorder = RecordingSink::new();
        let mut sink = recorder.clone();

        node.enqueue_send(Coord::new(1, 1), "a", 1, TrafficClass::Data, 8, 0, &mut sink);
        node.enqueue_send(Coord::new(0, 1), "b", 2, TrafficClass::MemoryRequest, 16, 0, &mut sink);
        node.process_input_queue(1, &mut sink);

        assert_eq!(node.output_queue_len(Direction::East), 1);
        assert_eq!(node.output_queue_len(Direction::South), 1);
        assert_eq!(node.stats().forwarded.packets, 2);
        assert_eq!(node.stats().direction(Direction::East).bytes, 8);
        assert_eq!(node.stats().direction(Direction::South).bytes, 16);

        let events = recorder.events();
        assert!(matches!(
            events[2],
            SinkEvent::Forwarded {
                direction: Direction::East,
                packet_id: 1,
                ..
            }
        ));

        let packet = node.take_for_transfer(Direction::East).unwrap();
        assert_eq!(packet.packet_id, 1);
        assert_eq!(packet.hop_count, 0);
        assert!(node.take_for_transfer(Direction::East).is_none());
        assert!(node.take_for_transfer(Direction::Local).is_none());
    }

    #[test]
    fn entity_named_by_position() {
        let top = start_test(file!());
        let config = NetworkConfig::mesh(4, 4);
        let node = Node::new(&top, 6, Coord::new(2, 1), &config);
        assert_eq!(node.entity.name, "node_2_1");
        assert_eq!(node.role(), NodeRole::Compute);
        assert_eq!(node.id(), 6);
    }
}
