// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Drive a network-on-chip with a generated traffic pattern.
//!
//! The [`Config`] decides the network shape, the traffic, how long to run
//! and what to do with the statistics afterwards.

pub mod config;

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use noc_models::export::TrafficReport;
use noc_models::network::Network;
use noc_models::sink::CsvEventSink;
use noc_models::traffic::generate;
use noc_track::Tracker;
use noc_track::builder::{TrackerConfig, TrackersConfig, setup_trackers};
use noc_track::entity::toplevel;
use noc_track::tracker::TrackConfigError;
use noc_track::{info, warn};

pub use crate::config::{Config, ExportFormat};

/// File the event sink writes to.
pub const EVENTS_FILE: &str = "noc_events.csv";

/// Build the stdout and log file trackers requested by the configuration.
pub fn setup_all_trackers(config: &Config) -> Result<Tracker, TrackConfigError> {
    let defaults = Config::default();
    let file_level = config.log_level.or(defaults.log_level).unwrap_or(log::Level::Debug);
    let trackers = TrackersConfig {
        stdout: TrackerConfig {
            enable: config.stdout.unwrap_or(false),
            level: config.stdout_level.or(defaults.stdout_level).unwrap_or(log::Level::Info),
            filter_regex: config.stdout_filter_regex.as_deref().unwrap_or(""),
            file: None,
        },
        file: TrackerConfig {
            enable: config.log_file.is_some(),
            level: file_level,
            filter_regex: "",
            file: config.log_file.as_deref(),
        },
    };
    setup_trackers(&trackers)
}

/// Build the network, inject the traffic pattern and run it.
pub fn run(config: &Config, tracker: &Tracker) -> Result<Network> {
    let top = toplevel(tracker, "top");
    let mut network = Network::new(&top, "noc", config.network_config())?;

    if let Some(dir) = config.stats_dir.as_ref().filter(|_| config.events_enabled()) {
        fs::create_dir_all(dir)?;
        network.set_sink(Box::new(CsvEventSink::create(&dir.join(EVENTS_FILE))?));
    }

    let traffic = config.traffic_config();
    let injections = generate(network.config(), &traffic);
    for injection in &injections {
        network.inject(injection)?;
    }
    info!(top ; "injected {} packets with the {} pattern", injections.len(), traffic.pattern);

    match config.fixed_steps() {
        Some(steps) => network.simulate(steps)?,
        None => {
            let steps = network.run_until_drained(config.max_steps())?;
            info!(top ; "drained after {} steps", steps);
        }
    }
    network.flush_sink()?;

    let summary = network.system_summary();
    info!(top ; "{} of {} packets delivered ({:.2}%), average latency {:.2} steps",
        summary.received.packets, summary.sent.packets, summary.success_rate, summary.avg_latency);
    if summary.in_flight > 0 {
        warn!(top ; "{} packets still in flight", summary.in_flight);
    }
    Ok(network)
}

/// Write the requested statistics files, returning their paths.
pub fn write_outputs(config: &Config, network: &Network) -> Result<Vec<PathBuf>> {
    let Some(dir) = &config.stats_dir else {
        return Ok(Vec::new());
    };

    let mut paths = Vec::new();
    match config.export_format() {
        ExportFormat::Json => paths.push(network.write_json(dir)?),
        ExportFormat::Csv => paths.push(network.write_csv(dir)?),
        ExportFormat::Both => {
            paths.push(network.write_json(dir)?);
            paths.push(network.write_csv(dir)?);
        }
    }
    paths.push(network.write_text_report(dir)?);
    Ok(paths)
}

/// Print the topology diagram and traffic report.
pub fn print_report(network: &Network) {
    println!("{}", network.render_topology());
    println!("{}", TrafficReport(network));
}
