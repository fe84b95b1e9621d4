// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Command-line network-on-chip simulator.
//!
//! For example, run using:
//!   cargo run --bin sim-noc -- --width 8 --height 8 --topology torus
//! --pattern uniform-random --stats-dir stats --stdout --stdout-level debug

use anyhow::Result;
use clap::Parser;
use noc_track::Track;
use sim_noc::{Config, print_report, run, setup_all_trackers, write_outputs};

fn main() -> Result<()> {
    let config = Config::load(Config::parse())?;
    let tracker = setup_all_trackers(&config)?;

    let result = run(&config, &tracker);
    tracker.shutdown();
    let network = result?;

    if config.report_enabled() {
        print_report(&network);
    }
    for path in write_outputs(&config, &network)? {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
