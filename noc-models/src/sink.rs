// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Statistics sinks.
//!
//! The network reports every counter update to a [`StatsSink`] as well as
//! keeping its own counters. This allows the updates to be streamed to a file
//! or inspected in tests without the network needing to know which backend is
//! in use.

use std::cell::RefCell;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

use crate::packet::{Packet, TrafficClass};
use crate::topology::{Coord, Direction};
use crate::types::{NocError, NocResult, Tick};

/// Receiver of statistics updates. One method per counter update.
pub trait StatsSink {
    /// A packet was injected at `node`.
    fn packet_sent(&mut self, node: Coord, packet: &Packet);

    /// `node` routed a packet towards `direction`.
    fn packet_forwarded(&mut self, node: Coord, direction: Direction, packet: &Packet);

    /// A packet was delivered at `node`.
    fn packet_received(&mut self, node: Coord, packet: &Packet, latency: Tick);

    /// The network completed step `step`.
    fn step_completed(&mut self, step: Tick);

    /// Push out anything buffered and report any earlier failure.
    fn flush(&mut self) -> NocResult<()>;
}

/// A sink that discards all updates.
#[derive(Default)]
pub struct NullSink;

impl StatsSink for NullSink {
    fn packet_sent(&mut self, _node: Coord, _packet: &Packet) {}
    fn packet_forwarded(&mut self, _node: Coord, _direction: Direction, _packet: &Packet) {}
    fn packet_received(&mut self, _node: Coord, _packet: &Packet, _latency: Tick) {}
    fn step_completed(&mut self, _step: Tick) {}
    fn flush(&mut self) -> NocResult<()> {
        Ok(())
    }
}

/// An update seen by a [`RecordingSink`].
#[derive(Clone, Debug, PartialEq)]
pub enum SinkEvent {
    Sent {
        node: Coord,
        packet_id: u64,
        size_bytes: usize,
        traffic_class: TrafficClass,
    },
    Forwarded {
        node: Coord,
        direction: Direction,
        packet_id: u64,
        size_bytes: usize,
    },
    Received {
        node: Coord,
        packet_id: u64,
        hop_count: usize,
        latency: Tick,
    },
    Step(Tick),
}

/// A sink that keeps every update in memory.
///
/// Clones share the same event log, so a clone can be handed to the network
/// while this one is kept for inspection.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<SinkEvent>>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.borrow().clone()
    }

    /// IDs of delivered packets in delivery order.
    #[must_use]
    pub fn delivered_ids(&self) -> Vec<u64> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Received { packet_id, .. } => Some(*packet_id),
                _ => None,
            })
            .collect()
    }

    /// Number of packets injected with the given class.
    #[must_use]
    pub fn sent_of_class(&self, class: TrafficClass) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|event| {
                matches!(event, SinkEvent::Sent { traffic_class, .. } if *traffic_class == class)
            })
            .count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl StatsSink for RecordingSink {
    fn packet_sent(&mut self, node: Coord, packet: &Packet) {
        self.events.borrow_mut().push(SinkEvent::Sent {
            node,
            packet_id: packet.packet_id,
            size_bytes: packet.size_bytes,
            traffic_class: packet.traffic_class,
        });
    }

    fn packet_forwarded(&mut self, node: Coord, direction: Direction, packet: &Packet) {
        self.events.borrow_mut().push(SinkEvent::Forwarded {
            node,
            direction,
            packet_id: packet.packet_id,
            size_bytes: packet.size_bytes,
        });
    }

    fn packet_received(&mut self, node: Coord, packet: &Packet, latency: Tick) {
        self.events.borrow_mut().push(SinkEvent::Received {
            node,
            packet_id: packet.packet_id,
            hop_count: packet.hop_count,
            latency,
        });
    }

    fn step_completed(&mut self, step: Tick) {
        self.events.borrow_mut().push(SinkEvent::Step(step));
    }

    fn flush(&mut self) -> NocResult<()> {
        Ok(())
    }
}

const CSV_EVENT_HEADER: &str = "step,event,x,y,direction,packet_id,size_bytes,class,hop_count,latency";

/// A sink that writes one CSV line per update.
///
/// The `step` column holds the number of steps completed when the update was
/// seen. Write failures are remembered and reported by the next call to
/// [`StatsSink::flush`].
pub struct CsvEventSink<W: Write> {
    writer: W,
    step: Tick,
    header_written: bool,
    error: Option<NocError>,
}

impl<W: Write> CsvEventSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            step: 0,
            header_written: false,
            error: None,
        }
    }

    /// Return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_row(&mut self, row: std::fmt::Arguments) {
        if self.error.is_some() {
            return;
        }
        let mut result = Ok(());
        if !self.header_written {
            result = writeln!(self.writer, "{CSV_EVENT_HEADER}");
            self.header_written = true;
        }
        if result.is_ok() {
            result = writeln!(self.writer, "{},{row}", self.step);
        }
        if let Err(e) = result {
            self.error = Some(e.into());
        }
    }
}

impl CsvEventSink<BufWriter<fs::File>> {
    /// Create a sink writing to a new file at `path`.
    pub fn create(path: &Path) -> NocResult<Self> {
        let file = fs::File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> StatsSink for CsvEventSink<W> {
    fn packet_sent(&mut self, node: Coord, packet: &Packet) {
        self.write_row(format_args!(
            "sent,{},{},,{},{},{},{},",
            node.x, node.y, packet.packet_id, packet.size_bytes, packet.traffic_class, packet.hop_count
        ));
    }

    fn packet_forwarded(&mut self, node: Coord, direction: Direction, packet: &Packet) {
        self.write_row(format_args!(
            "forwarded,{},{},{direction},{},{},{},{},",
            node.x, node.y, packet.packet_id, packet.size_bytes, packet.traffic_class, packet.hop_count
        ));
    }

    fn packet_received(&mut self, node: Coord, packet: &Packet, latency: Tick) {
        self.write_row(format_args!(
            "received,{},{},local,{},{},{},{},{latency}",
            node.x, node.y, packet.packet_id, packet.size_bytes, packet.traffic_class, packet.hop_count
        ));
    }

    fn step_completed(&mut self, step: Tick) {
        self.step = step;
    }

    fn flush(&mut self) -> NocResult<()> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet() -> Packet {
        Packet::new(
            7,
            Coord::new(0, 0),
            Coord::new(1, 0),
            "p",
            TrafficClass::MemoryRequest,
            16,
            0,
        )
    }

    #[test]
    fn recording_clones_share_events() {
        let recorder = RecordingSink::new();
        let mut handle = recorder.clone();
        handle.packet_sent(Coord::new(0, 0), &packet());
        handle.step_completed(1);
        handle.packet_received(Coord::new(1, 0), &packet(), 2);

        assert_eq!(recorder.events().len(), 3);
        assert_eq!(recorder.delivered_ids(), vec![7]);
        assert_eq!(recorder.sent_of_class(TrafficClass::MemoryRequest), 1);
        assert_eq!(recorder.sent_of_class(TrafficClass::Data), 0);

        recorder.clear();
        assert!(handle.events().is_empty());
    }

    #[test]
    fn csv_rows() {
        let mut sink = CsvEventSink::new(Vec::new());
        sink.packet_sent(Coord::new(0, 0), &packet());
        sink.step_completed(1);
        sink.packet_forwarded(Coord::new(0, 0), Direction::East, &packet());
        sink.flush().unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], CSV_EVENT_HEADER);
        assert_eq!(lines[1], "0,sent,0,0,,7,16,memory_request,0,");
        assert_eq!(lines[2], "1,forwarded,0,0,east,7,16,memory_request,0,");
        assert_eq!(lines.len(), 3);
    }
}
