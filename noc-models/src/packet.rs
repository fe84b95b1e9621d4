// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! The unit of traffic moved through a network.

use std::fmt;

use noc_track::Id;
use serde::{Deserialize, Serialize};

use crate::topology::Coord;
use crate::types::Tick;

/// Default size of an injected packet.
pub const DEFAULT_PACKET_SIZE_BYTES: usize = 64;

/// Classification used only to bucket statistics. It never affects routing.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TrafficClass {
    #[default]
    Data,
    MemoryRequest,
}

impl TrafficClass {
    pub const ALL: [TrafficClass; 2] = [TrafficClass::Data, TrafficClass::MemoryRequest];

    #[must_use]
    pub fn from_priority(is_priority_class: bool) -> Self {
        if is_priority_class {
            TrafficClass::MemoryRequest
        } else {
            TrafficClass::Data
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TrafficClass::Data => "data",
            TrafficClass::MemoryRequest => "memory_request",
        }
    }

    /// Value used as the request type of packet creation track events.
    #[must_use]
    pub fn req_type(self) -> i8 {
        match self {
            TrafficClass::Data => 0,
            TrafficClass::MemoryRequest => 1,
        }
    }
}

impl fmt::Display for TrafficClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One injected message.
///
/// A packet only ever lives in one queue at a time. The only field that
/// changes after injection is `hop_count`.
///
/// `packet_id` numbers packets within their network and is what statistics
/// refer to. `track_id` is allocated by the tracker so that track events for
/// the packet never share an ID with an entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    pub packet_id: u64,

    #[serde(skip)]
    pub track_id: Id,

    pub source: Coord,
    pub destination: Coord,

    /// Opaque payload, carried but never interpreted.
    pub payload: String,

    pub hop_count: usize,
    pub size_bytes: usize,
    pub traffic_class: TrafficClass,

    /// Network step at which the packet was injected.
    pub created_at: Tick,
}

impl Packet {
    #[must_use]
    pub fn new(
        packet_id: u64,
        source: Coord,
        destination: Coord,
        payload: &str,
        traffic_class: TrafficClass,
        size_bytes: usize,
        created_at: Tick,
    ) -> Self {
        Self {
            packet_id,
            track_id: noc_track::NO_ID,
            source,
            destination,
            payload: payload.to_string(),
            hop_count: 0,
            size_bytes,
            traffic_class,
            created_at,
        }
    }

    /// Set the ID used for track events of this packet.
    #[must_use]
    pub fn with_track_id(mut self, track_id: Id) -> Self {
        self.track_id = track_id;
        self
    }

    #[must_use]
    pub fn is_priority_class(&self) -> bool {
        self.traffic_class == TrafficClass::MemoryRequest
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "packet {} {}->{} ({} bytes, {})",
            self.packet_id, self.source, self.destination, self.size_bytes, self.traffic_class
        )
    }
}
