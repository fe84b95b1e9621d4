// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! The mesh/torus network driver.
//!
//! The [`Network`] owns every [`Node`], wires their neighbour links, accepts
//! injected messages and advances the simulation one step at a time.
//!
//! # Stepping
//!
//! Each call to [`Network::simulate_step`] makes two full passes over the
//! nodes in row-major order:
//!  1. every node routes everything in its input queue,
//!  2. every node moves at most one packet per output link to the input queue
//!     of the neighbour on that link.
//!
//! A packet therefore crosses at most one link per step, and a packet that
//! needs `k` hops is delivered during step `k + 1`.

use std::rc::Rc;

use noc_track::entity::{Entity, GetEntity};
use noc_track::{connect, info, set_time, warn};

use crate::config::NetworkConfig;
use crate::node::Node;
use crate::packet::{DEFAULT_PACKET_SIZE_BYTES, TrafficClass};
use crate::sink::{NullSink, StatsSink};
use crate::topology::{Coord, Direction, TopologyKind};
use crate::traffic::Injection;
use crate::types::{NocError, NocResult, NodeId, Tick};

pub struct Network {
    pub entity: Rc<Entity>,
    config: NetworkConfig,
    nodes: Vec<Node>,
    packet_counter: u64,
    step: Tick,
    sink: Box<dyn StatsSink>,
}

impl Network {
    /// Create and build a network.
    pub fn new(parent: &Rc<Entity>, name: &str, config: NetworkConfig) -> NocResult<Self> {
        let mut network = Self::unbuilt(parent, name, config)?;
        network.build()?;
        Ok(network)
    }

    /// Create a network without any nodes. [`Network::build`] must be called
    /// before messages can be sent.
    pub fn unbuilt(parent: &Rc<Entity>, name: &str, config: NetworkConfig) -> NocResult<Self> {
        config.validate()?;
        Ok(Self {
            entity: Rc::new(Entity::new(parent, name)),
            config,
            nodes: Vec::new(),
            packet_counter: 0,
            step: 0,
            sink: Box::new(NullSink),
        })
    }

    /// Allocate all nodes and wire their neighbour links.
    ///
    /// Fails with [`NocError::AlreadyBuilt`] if called more than once, leaving
    /// the network unchanged.
    pub fn build(&mut self) -> NocResult<()> {
        if self.is_built() {
            return Err(NocError::AlreadyBuilt);
        }

        let mut nodes = Vec::with_capacity(self.config.num_nodes());
        for y in 0..self.config.height {
            for x in 0..self.config.width {
                let coord = Coord::new(x, y);
                nodes.push(Node::new(
                    &self.entity,
                    self.config.node_id(coord),
                    coord,
                    &self.config,
                ));
            }
        }

        for node in &mut nodes {
            for direction in Direction::LINKS {
                if let Some(neighbour) = self.config.neighbour_of(node.coord(), direction) {
                    node.set_neighbour(direction, self.config.node_id(neighbour));
                }
            }
        }

        for node in &nodes {
            for direction in Direction::LINKS {
                if let Some(neighbour) = node.neighbour(direction) {
                    connect!(node.entity ; nodes[neighbour].entity);
                }
            }
        }

        self.nodes = nodes;
        info!(self.entity ; "built {}x{} {} of {} nodes",
            self.config.width, self.config.height, self.config.topology, self.nodes.len());
        Ok(())
    }

    #[must_use]
    pub fn is_built(&self) -> bool {
        !self.nodes.is_empty()
    }

    fn check_built(&self) -> NocResult<()> {
        if self.is_built() {
            Ok(())
        } else {
            Err(NocError::NotBuilt)
        }
    }

    #[must_use]
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.config.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.config.height
    }

    #[must_use]
    pub fn topology(&self) -> TopologyKind {
        self.config.topology
    }

    /// Number of steps simulated so far.
    #[must_use]
    pub fn current_step(&self) -> Tick {
        self.step
    }

    /// Number of packets injected so far. This is also the last allocated
    /// packet ID.
    #[must_use]
    pub fn packets_injected(&self) -> u64 {
        self.packet_counter
    }

    /// Replace the statistics sink. The previous sink is returned.
    pub fn set_sink(&mut self, sink: Box<dyn StatsSink>) -> Box<dyn StatsSink> {
        std::mem::replace(&mut self.sink, sink)
    }

    /// Flush the statistics sink.
    pub fn flush_sink(&mut self) -> NocResult<()> {
        self.sink.flush()
    }

    #[must_use]
    pub fn node_id(&self, coord: Coord) -> NodeId {
        self.config.node_id(coord)
    }

    pub fn coord_of(&self, id: NodeId) -> NocResult<Coord> {
        self.config.coord_of(id)
    }

    pub fn node(&self, coord: Coord) -> NocResult<&Node> {
        self.check_built()?;
        self.config.check_coord(coord)?;
        Ok(&self.nodes[self.config.node_id(coord)])
    }

    pub fn node_by_id(&self, id: NodeId) -> NocResult<&Node> {
        self.check_built()?;
        self.nodes.get(id).ok_or(NocError::UnknownNode(id))
    }

    /// All nodes in row-major order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Inject a data packet of the default size.
    pub fn send_message(&mut self, src: Coord, dst: Coord, payload: &str) -> NocResult<u64> {
        self.send_message_with(src, dst, payload, false, DEFAULT_PACKET_SIZE_BYTES)
    }

    /// Inject a packet at `src` for `dst`.
    ///
    /// Returns the ID allocated to the packet. On failure nothing is changed.
    pub fn send_message_with(
        &mut self,
        src: Coord,
        dst: Coord,
        payload: &str,
        is_priority_class: bool,
        size_bytes: usize,
    ) -> NocResult<u64> {
        self.check_built()?;
        self.config.check_coord(src)?;
        self.config.check_coord(dst)?;
        if size_bytes == 0 {
            return Err(NocError::InvalidPacketSize);
        }

        self.packet_counter += 1;
        let packet_id = self.packet_counter;
        let src_id = self.config.node_id(src);
        self.nodes[src_id].enqueue_send(
            dst,
            payload,
            packet_id,
            TrafficClass::from_priority(is_priority_class),
            size_bytes,
            self.step,
            self.sink.as_mut(),
        );
        Ok(packet_id)
    }

    /// As [`Network::send_message_with`] but addressing nodes by ID.
    pub fn send_message_by_id(
        &mut self,
        src: NodeId,
        dst: NodeId,
        payload: &str,
        is_priority_class: bool,
        size_bytes: usize,
    ) -> NocResult<u64> {
        self.check_built()?;
        let src = self.config.coord_of(src)?;
        let dst = self.config.coord_of(dst)?;
        self.send_message_with(src, dst, payload, is_priority_class, size_bytes)
    }

    pub fn inject(&mut self, injection: &Injection) -> NocResult<u64> {
        self.send_message_with(
            injection.src,
            injection.dst,
            &injection.payload,
            injection.is_priority_class,
            injection.size_bytes,
        )
    }

    /// Advance the simulation by one step.
    ///
    /// If a packet is routed towards a missing neighbour the rest of the step
    /// still completes, the packet stays in its output queue and
    /// [`NocError::UnreachableNeighbor`] is returned.
    pub fn simulate_step(&mut self) -> NocResult<()> {
        self.check_built()?;
        let now = self.step + 1;
        set_time!(self.entity ; now);

        for node in &mut self.nodes {
            node.process_input_queue(now, self.sink.as_mut());
        }

        let mut first_error = None;
        for id in 0..self.nodes.len() {
            if let Err(e) = self.advance_output_queues(id) {
                first_error.get_or_insert(e);
            }
        }

        self.step = now;
        self.sink.step_completed(now);

        match first_error {
            None => Ok(()),
            Some(e) => {
                warn!(self.entity ; "step {}: {}", now, e);
                Err(e)
            }
        }
    }

    /// Move at most one packet from each output queue of node `id` across its
    /// link.
    fn advance_output_queues(&mut self, id: NodeId) -> NocResult<()> {
        let mut result = Ok(());
        for direction in Direction::LINKS {
            if self.nodes[id].output_queue_len(direction) == 0 {
                continue;
            }
            let Some(neighbour) = self.nodes[id].neighbour(direction) else {
                if result.is_ok() {
                    result = Err(NocError::UnreachableNeighbor {
                        at: self.nodes[id].coord(),
                        direction,
                    });
                }
                continue;
            };
            if let Some(mut packet) = self.nodes[id].take_for_transfer(direction) {
                packet.hop_count += 1;
                self.nodes[neighbour].accept(packet);
            }
        }
        result
    }

    /// Run exactly `steps` steps.
    pub fn simulate(&mut self, steps: u64) -> NocResult<()> {
        for _ in 0..steps {
            self.simulate_step()?;
        }
        Ok(())
    }

    /// Number of packets still queued anywhere in the network.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.nodes.iter().map(Node::in_flight).sum()
    }

    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.in_flight() == 0
    }

    /// Step until no packets remain or `max_steps` steps have been run.
    ///
    /// Returns the number of steps run.
    pub fn run_until_drained(&mut self, max_steps: u64) -> NocResult<u64> {
        self.check_built()?;
        let mut steps = 0;
        while !self.is_drained() && steps < max_steps {
            self.simulate_step()?;
            steps += 1;
        }
        if !self.is_drained() {
            warn!(self.entity ; "{} packets still in flight after {} steps", self.in_flight(), steps);
        }
        Ok(steps)
    }
}

impl GetEntity for Network {
    fn entity(&self) -> &Rc<Entity> {
        &self.entity
    }
}
