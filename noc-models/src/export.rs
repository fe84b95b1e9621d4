// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Export of network statistics.
//!
//! Statistics can be collected as a [`StatisticsExport`] value, written as
//! JSON, CSV or a text report into a directory, or rendered as text. File
//! names are fixed so that repeated exports of the same run are identical.

use std::fmt;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::{HotspotReport, LinkUtilization, SystemSummary};
use crate::network::Network;
use crate::packet::TrafficClass;
use crate::role::NodeRole;
use crate::stats::{ClassTraffic, Traffic};
use crate::topology::{Coord, Direction, TopologyKind};
use crate::types::{NocResult, NodeId};

pub const JSON_FILE: &str = "noc_statistics.json";
pub const CSV_FILE: &str = "noc_nodes.csv";
pub const REPORT_FILE: &str = "noc_report.txt";

/// Number of nodes listed in the hotspot section of reports.
pub const REPORT_HOTSPOTS: usize = 8;

/// Counters of a single node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub node_id: NodeId,
    pub coord: Coord,
    pub role: NodeRole,
    pub sent: Traffic,
    pub received: Traffic,
    pub forwarded: Traffic,
    pub avg_latency: f64,
    pub avg_hop_count: f64,
    pub by_direction: std::collections::BTreeMap<Direction, Traffic>,
    pub by_class: std::collections::BTreeMap<TrafficClass, ClassTraffic>,
}

/// One non-empty entry of the traffic matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatrixEntry {
    pub from: Coord,
    pub to: Coord,
    pub traffic: Traffic,
}

/// Everything known about a network run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatisticsExport {
    pub summary: SystemSummary,
    pub nodes: Vec<NodeRecord>,
    pub traffic_matrix: Vec<MatrixEntry>,
    pub links: Vec<LinkUtilization>,
    pub hotspots: HotspotReport,
}

impl StatisticsExport {
    pub fn to_json(&self) -> NocResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn create_in(dir: &Path, filename: &str) -> NocResult<(PathBuf, BufWriter<fs::File>)> {
    fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    let file = fs::File::create(&path)?;
    Ok((path, BufWriter::new(file)))
}

fn kib(bytes: u64) -> f64 {
    bytes as f64 / 1024.0
}

impl Network {
    #[must_use]
    pub fn export_statistics(&self) -> StatisticsExport {
        let nodes = self
            .nodes()
            .map(|node| {
                let stats = node.stats();
                NodeRecord {
                    node_id: node.id(),
                    coord: node.coord(),
                    role: node.role(),
                    sent: stats.sent,
                    received: stats.received,
                    forwarded: stats.forwarded,
                    avg_latency: stats.avg_latency(),
                    avg_hop_count: stats.avg_hop_count(),
                    by_direction: stats.by_direction.clone(),
                    by_class: stats.by_class.clone(),
                }
            })
            .collect();

        let traffic_matrix = self
            .traffic_matrix()
            .into_iter()
            .map(|((from, to), traffic)| MatrixEntry { from, to, traffic })
            .collect();

        StatisticsExport {
            summary: self.system_summary(),
            nodes,
            traffic_matrix,
            links: self.link_utilization(),
            hotspots: self.hotspot_report(),
        }
    }

    /// Write the full statistics as JSON into `dir`.
    pub fn write_json(&self, dir: &Path) -> NocResult<PathBuf> {
        let (path, mut writer) = create_in(dir, JSON_FILE)?;
        serde_json::to_writer_pretty(&mut writer, &self.export_statistics())?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(path)
    }

    /// Write one CSV row per node into `dir`.
    pub fn write_csv(&self, dir: &Path) -> NocResult<PathBuf> {
        let (path, mut writer) = create_in(dir, CSV_FILE)?;

        write!(
            writer,
            "node_id,x,y,role,packets_sent,packets_received,packets_forwarded,\
             bytes_sent,bytes_received,bytes_forwarded,avg_latency,avg_hop_count"
        )?;
        for direction in Direction::ALL {
            write!(writer, ",{direction}_packets,{direction}_bytes")?;
        }
        writeln!(writer)?;

        for node in self.nodes() {
            let stats = node.stats();
            let coord = node.coord();
            write!(
                writer,
                "{},{},{},{},{},{},{},{},{},{},{:.3},{:.3}",
                node.id(),
                coord.x,
                coord.y,
                node.role(),
                stats.sent.packets,
                stats.received.packets,
                stats.forwarded.packets,
                stats.sent.bytes,
                stats.received.bytes,
                stats.forwarded.bytes,
                stats.avg_latency(),
                stats.avg_hop_count(),
            )?;
            for direction in Direction::ALL {
                let traffic = stats.direction(direction);
                write!(writer, ",{},{}", traffic.packets, traffic.bytes)?;
            }
            writeln!(writer)?;
        }
        writer.flush()?;
        Ok(path)
    }

    /// Write the topology diagram and traffic report into `dir`.
    pub fn write_text_report(&self, dir: &Path) -> NocResult<PathBuf> {
        let (path, mut writer) = create_in(dir, REPORT_FILE)?;
        write!(writer, "{}", TopologyDiagram(self))?;
        writeln!(writer)?;
        write!(writer, "{}", TrafficReport(self))?;
        writer.flush()?;
        Ok(path)
    }

    #[must_use]
    pub fn render_topology(&self) -> String {
        TopologyDiagram(self).to_string()
    }

    #[must_use]
    pub fn render_traffic_report(&self) -> String {
        TrafficReport(self).to_string()
    }
}

/// ASCII drawing of the grid.
///
/// ```txt
/// [ 0] -- [ 1] --o
///   |       |
/// [ 2] -- [ 3] --o
///   o       o
/// ```
pub struct TopologyDiagram<'a>(pub &'a Network);

impl fmt::Display for TopologyDiagram<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let network = self.0;
        let width = network.width();
        let height = network.height();
        let torus = network.topology() == TopologyKind::Torus;

        writeln!(f, "=== {} topology ===", network.topology())?;
        for y in 0..height {
            let cells: Vec<String> = (0..width)
                .map(|x| format!("[{:2}]", network.node_id(Coord::new(x, y))))
                .collect();
            let mut row = cells.join(" -- ");
            if torus {
                row.push_str(" --o");
            }
            writeln!(f, "{row}")?;

            let marker = if y + 1 < height {
                "|"
            } else if torus {
                "o"
            } else {
                continue;
            };
            let links: Vec<String> = (0..width).map(|_| format!("  {marker}  ")).collect();
            writeln!(f, "{}", links.join("   ").trim_end())?;
        }
        writeln!(f, "nodes: {}", width * height)?;
        writeln!(f, "topology: {}", network.topology())?;
        writeln!(f, "size: {width}x{height}")
    }
}

/// Human readable report of all statistics.
pub struct TrafficReport<'a>(pub &'a Network);

impl TrafficReport<'_> {
    fn write_nodes(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "=== node traffic ===")?;
        writeln!(
            f,
            "{:>4} {:>7} {:>17} {:>6} {:>6} {:>6} {:>9} {:>9} {:>9} {:>8} {:>6}",
            "node", "coord", "role", "sent", "recv", "fwd", "sent KiB", "recv KiB", "fwd KiB", "latency", "hops"
        )?;
        for node in self.0.nodes() {
            let stats = node.stats();
            writeln!(
                f,
                "{:>4} {:>7} {:>17} {:>6} {:>6} {:>6} {:>9.1} {:>9.1} {:>9.1} {:>8.2} {:>6.2}",
                node.id(),
                node.coord().to_string(),
                node.role().to_string(),
                stats.sent.packets,
                stats.received.packets,
                stats.forwarded.packets,
                kib(stats.sent.bytes),
                kib(stats.received.bytes),
                kib(stats.forwarded.bytes),
                stats.avg_latency(),
                stats.avg_hop_count(),
            )?;
        }
        Ok(())
    }

    fn write_summary(&self, f: &mut fmt::Formatter, summary: &SystemSummary) -> fmt::Result {
        writeln!(f, "=== system summary ===")?;
        writeln!(f, "steps: {}", summary.steps)?;
        writeln!(f, "packets sent: {}", summary.sent.packets)?;
        writeln!(f, "packets received: {}", summary.received.packets)?;
        writeln!(f, "packets forwarded: {}", summary.forwarded.packets)?;
        writeln!(
            f,
            "data: sent {:.1} KiB, received {:.1} KiB, forwarded {:.1} KiB",
            kib(summary.sent.bytes),
            kib(summary.received.bytes),
            kib(summary.forwarded.bytes)
        )?;
        writeln!(f, "success rate: {:.2}%", summary.success_rate)?;
        writeln!(f, "average latency: {:.2} steps", summary.avg_latency)?;
        writeln!(f, "average hop count: {:.2}", summary.avg_hop_count)?;
        writeln!(f, "in flight: {}", summary.in_flight)?;

        writeln!(f, "=== traffic by direction ===")?;
        for (direction, traffic) in &summary.by_direction {
            if !traffic.is_empty() {
                writeln!(
                    f,
                    "{direction:>6}: {} packets, {:.1} KiB",
                    traffic.packets,
                    kib(traffic.bytes)
                )?;
            }
        }

        writeln!(f, "=== traffic by class ===")?;
        for (class, traffic) in &summary.by_class {
            if !traffic.sent.is_empty() || !traffic.received.is_empty() {
                writeln!(
                    f,
                    "{class:>14}: sent {} ({:.1} KiB), received {}, forwarded {}",
                    traffic.sent.packets,
                    kib(traffic.sent.bytes),
                    traffic.received.packets,
                    traffic.forwarded.packets
                )?;
            }
        }

        let config = self.0.config();
        writeln!(f, "=== network utilization ===")?;
        writeln!(f, "total bandwidth: {:.1} GiB/s", config.total_bandwidth_gib())?;
        let total_bytes = summary.sent.bytes + summary.received.bytes + summary.forwarded.bytes;
        writeln!(f, "data moved: {:.3} MiB", kib(total_bytes) / 1024.0)?;
        writeln!(f, "utilization: {:.4}%", summary.network_utilization)
    }

    fn write_matrix(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "=== traffic matrix (packets/bytes) ===")?;
        let matrix = self.0.traffic_matrix();
        if matrix.is_empty() {
            return writeln!(f, "no traffic");
        }
        for ((from, to), traffic) in &matrix {
            writeln!(f, "{from} -> {to}: {}/{}", traffic.packets, traffic.bytes)?;
        }
        Ok(())
    }

    fn write_links(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "=== link utilization ===")?;
        let links = self.0.link_utilization();
        if links.is_empty() {
            return writeln!(f, "no link traffic");
        }
        writeln!(f, "{:>16} {:>8} {:>10} {:>10}", "link", "packets", "bytes", "util %")?;
        for link in &links {
            writeln!(
                f,
                "{:>16} {:>8} {:>10} {:>10.6}",
                format!("{} <-> {}", link.a, link.b),
                link.traffic.packets,
                link.traffic.bytes,
                link.utilization
            )?;
        }
        Ok(())
    }

    fn write_hotspots(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "=== hotspots ===")?;
        let report = self.0.hotspot_report();
        writeln!(f, "{:>7} {:>10} {:>10} {:>7}  role", "node", "KiB", "forwarded", "ratio")?;
        for entry in report.top(REPORT_HOTSPOTS) {
            writeln!(
                f,
                "{:>7} {:>10.1} {:>10} {:>7.2}  {}",
                entry.coord.to_string(),
                kib(entry.total_bytes),
                entry.forwarded_packets,
                entry.forwarding_ratio,
                entry.role.description()
            )?;
        }
        if report.congested.is_empty() {
            writeln!(f, "no congested nodes")
        } else {
            writeln!(f, "potentially congested (forwarding ratio > 50%):")?;
            for entry in &report.congested {
                writeln!(
                    f,
                    "  {}: {:.1}%",
                    entry.coord,
                    entry.forwarding_ratio * 100.0
                )?;
            }
            Ok(())
        }
    }
}

impl fmt::Display for TrafficReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let summary = self.0.system_summary();
        self.write_nodes(f)?;
        self.write_summary(f, &summary)?;
        self.write_matrix(f)?;
        self.write_links(f)?;
        self.write_hotspots(f)
    }
}
