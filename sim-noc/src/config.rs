// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Multi-source configuration of the simulator.
//!
//! Every setting can come from (later sources win):
//!  1. the built-in defaults,
//!  2. a TOML file (`sim-noc.toml` in the working directory, or the file
//!     given with `--conf-file`),
//!  3. environment variables prefixed with `NOC_` (e.g. `NOC_WIDTH=8`),
//!  4. command-line flags.
//!
//! All fields are optional so that command-line flags which were not given
//! leave the values from the other sources in place.

use std::path::{Path, PathBuf};

use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use noc_models::config::{DEFAULT_LINK_BANDWIDTH_GIB, NetworkConfig};
use noc_models::packet::DEFAULT_PACKET_SIZE_BYTES;
use noc_models::topology::TopologyKind;
use noc_models::traffic::{TrafficConfig, TrafficPattern};
use serde::{Deserialize, Serialize};

/// Configuration file read when `--conf-file` is not given.
pub const DEFAULT_CONF_FILE: &str = "sim-noc.toml";

/// Prefix of the environment variables that override settings.
pub const ENV_PREFIX: &str = "NOC_";

const DEFAULT_WIDTH: usize = 4;
const DEFAULT_HEIGHT: usize = 4;
const DEFAULT_MAX_STEPS: u64 = 10_000;

/// Which statistics files to write.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    Json,
    Csv,
    #[default]
    Both,
}

/// Run a traffic pattern on a mesh or torus network-on-chip.
#[derive(Parser, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[command(version, about)]
pub struct Config {
    /// Read settings from this TOML file instead of `sim-noc.toml`.
    #[arg(long)]
    #[serde(skip)]
    pub conf_file: Option<PathBuf>,

    /// Number of columns of nodes.
    #[arg(long)]
    pub width: Option<usize>,

    /// Number of rows of nodes.
    #[arg(long)]
    pub height: Option<usize>,

    /// Whether the edges wrap around.
    #[arg(long, value_enum)]
    pub topology: Option<TopologyKind>,

    /// Bandwidth of each link in GiB/s, used for utilization figures.
    #[arg(long)]
    pub link_bandwidth_gib: Option<f64>,

    /// Traffic pattern to inject.
    #[arg(long, value_enum)]
    pub pattern: Option<TrafficPattern>,

    /// Messages sent by each source of the pattern.
    #[arg(long)]
    pub packets_per_source: Option<usize>,

    /// Size of each message in bytes.
    #[arg(long)]
    pub packet_size: Option<usize>,

    /// Fraction of messages sent as memory requests.
    #[arg(long)]
    pub priority_fraction: Option<f64>,

    /// Seed for the random patterns.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of steps to simulate. 0 runs until no packets remain.
    #[arg(long)]
    pub steps: Option<u64>,

    /// Upper bound on the steps run when `steps` is 0.
    #[arg(long)]
    pub max_steps: Option<u64>,

    /// Enable logging to the console.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub stdout: Option<bool>,

    /// Level of log message to display.
    #[arg(long)]
    pub stdout_level: Option<log::Level>,

    /// Only entities matching this regular expression log at
    /// `stdout_level`, all others only report errors.
    #[arg(long)]
    pub stdout_filter_regex: Option<String>,

    /// Also write log messages to this file.
    #[arg(long)]
    pub log_file: Option<String>,

    /// Level of log message written to `log_file`.
    #[arg(long)]
    pub log_level: Option<log::Level>,

    /// Directory statistics are written to. Nothing is written if not set.
    #[arg(long)]
    pub stats_dir: Option<PathBuf>,

    /// Which statistics files to write into `stats_dir`.
    #[arg(long, value_enum)]
    pub export_format: Option<ExportFormat>,

    /// Write every counter update to `noc_events.csv` in `stats_dir`.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub events: Option<bool>,

    /// Print the topology diagram and traffic report when done.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub report: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            conf_file: None,
            width: Some(DEFAULT_WIDTH),
            height: Some(DEFAULT_HEIGHT),
            topology: Some(TopologyKind::Mesh),
            link_bandwidth_gib: Some(DEFAULT_LINK_BANDWIDTH_GIB),
            pattern: Some(TrafficPattern::default()),
            packets_per_source: Some(1),
            packet_size: Some(DEFAULT_PACKET_SIZE_BYTES),
            priority_fraction: Some(0.0),
            seed: Some(1),
            steps: Some(0),
            max_steps: Some(DEFAULT_MAX_STEPS),
            stdout: Some(false),
            stdout_level: Some(log::Level::Info),
            stdout_filter_regex: Some(String::new()),
            log_file: None,
            log_level: Some(log::Level::Debug),
            stats_dir: None,
            export_format: Some(ExportFormat::default()),
            events: Some(false),
            report: Some(true),
        }
    }
}

impl Config {
    /// Combine the defaults, configuration file and environment with the
    /// flags given on the command line.
    pub fn load(cli: Config) -> Result<Config, figment::Error> {
        let conf_file = cli
            .conf_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONF_FILE));
        let mut config: Config = Self::figment(&conf_file).extract()?;
        config.conf_file = Some(conf_file);
        Ok(Self::clap_merge(config, cli))
    }

    fn figment(conf_file: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(conf_file))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Overwrite every setting given on the command line.
    #[must_use]
    pub fn clap_merge(mut config: Config, cli: Config) -> Config {
        macro_rules! merge {
            ($($field:ident),+) => {
                $(
                    if cli.$field.is_some() {
                        config.$field = cli.$field;
                    }
                )+
            };
        }
        merge!(
            conf_file,
            width,
            height,
            topology,
            link_bandwidth_gib,
            pattern,
            packets_per_source,
            packet_size,
            priority_fraction,
            seed,
            steps,
            max_steps,
            stdout,
            stdout_level,
            stdout_filter_regex,
            log_file,
            log_level,
            stats_dir,
            export_format,
            events,
            report
        );
        config
    }

    #[must_use]
    pub fn network_config(&self) -> NetworkConfig {
        NetworkConfig::new(
            self.width.unwrap_or(DEFAULT_WIDTH),
            self.height.unwrap_or(DEFAULT_HEIGHT),
            self.topology.unwrap_or_default(),
        )
        .with_link_bandwidth_gib(self.link_bandwidth_gib.unwrap_or(DEFAULT_LINK_BANDWIDTH_GIB))
    }

    #[must_use]
    pub fn traffic_config(&self) -> TrafficConfig {
        let defaults = TrafficConfig::default();
        TrafficConfig {
            pattern: self.pattern.unwrap_or(defaults.pattern),
            packets_per_source: self.packets_per_source.unwrap_or(defaults.packets_per_source),
            size_bytes: self.packet_size.unwrap_or(defaults.size_bytes),
            priority_fraction: self.priority_fraction.unwrap_or(defaults.priority_fraction),
            seed: self.seed.unwrap_or(defaults.seed),
        }
    }

    /// Steps to run, `None` meaning until drained.
    #[must_use]
    pub fn fixed_steps(&self) -> Option<u64> {
        self.steps.filter(|steps| *steps > 0)
    }

    #[must_use]
    pub fn max_steps(&self) -> u64 {
        self.max_steps.unwrap_or(DEFAULT_MAX_STEPS)
    }

    #[must_use]
    pub fn export_format(&self) -> ExportFormat {
        self.export_format.unwrap_or_default()
    }

    #[must_use]
    pub fn events_enabled(&self) -> bool {
        self.events.unwrap_or(false) && self.stats_dir.is_some()
    }

    #[must_use]
    pub fn report_enabled(&self) -> bool {
        self.report.unwrap_or(true)
    }
}
