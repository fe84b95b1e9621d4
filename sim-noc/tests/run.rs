// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use std::fs;

use clap::Parser;
use noc_models::topology::TopologyKind;
use noc_models::traffic::TrafficPattern;
use noc_track::Track;
use noc_track::tracker::dev_null_tracker;
use sim_noc::{Config, EVENTS_FILE, ExportFormat, run, setup_all_trackers, write_outputs};

#[test]
fn conf_file_then_command_line() {
    let dir = tempfile::tempdir().unwrap();
    let conf_file = dir.path().join("noc.toml");
    fs::write(
        &conf_file,
        "width = 3\nheight = 2\ntopology = \"torus\"\npattern = \"all-to-all\"\n",
    )
    .unwrap();

    let cli = Config::try_parse_from([
        "sim-noc",
        "--conf-file",
        conf_file.to_str().unwrap(),
        "--height",
        "5",
    ])
    .unwrap();
    let config = Config::load(cli).unwrap();

    assert_eq!(config.width, Some(3));
    assert_eq!(config.height, Some(5));
    assert_eq!(config.topology, Some(TopologyKind::Torus));
    assert_eq!(config.pattern, Some(TrafficPattern::AllToAll));
    assert_eq!(config.seed, Config::default().seed);
}

#[test]
fn missing_conf_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let conf_file = dir.path().join("absent.toml");
    let cli = Config::try_parse_from(["sim-noc", "--conf-file", conf_file.to_str().unwrap()])
        .unwrap();
    let config = Config::load(cli).unwrap();
    assert_eq!(config.network_config(), Config::default().network_config());
    assert_eq!(config.traffic_config(), Config::default().traffic_config());
}

#[test]
fn run_until_drained_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let stats_dir = dir.path().join("stats");
    let config = Config {
        width: Some(3),
        height: Some(3),
        pattern: Some(TrafficPattern::AllToAll),
        stats_dir: Some(stats_dir.clone()),
        events: Some(true),
        ..Config::default()
    };

    let network = run(&config, &dev_null_tracker()).unwrap();
    assert!(network.is_drained());
    let summary = network.system_summary();
    assert_eq!(summary.sent.packets, 9 * 8);
    assert_eq!(summary.received, summary.sent);

    let paths = write_outputs(&config, &network).unwrap();
    assert_eq!(paths.len(), 3);
    for path in &paths {
        assert!(path.exists());
    }

    let json = fs::read_to_string(stats_dir.join("noc_statistics.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["summary"]["received"]["packets"], 72);

    let events = fs::read_to_string(stats_dir.join(EVENTS_FILE)).unwrap();
    let mut lines = events.lines();
    assert!(lines.next().unwrap().starts_with("step,event"));
    let sent = events.lines().filter(|l| l.contains(",sent,")).count();
    let received = events.lines().filter(|l| l.contains(",received,")).count();
    assert_eq!(sent, 72);
    assert_eq!(received, 72);
}

#[test]
fn fixed_steps_can_leave_packets_in_flight() {
    let config = Config {
        steps: Some(1),
        ..Config::default()
    };
    let network = run(&config, &dev_null_tracker()).unwrap();
    assert_eq!(network.current_step(), 1);
    assert!(network.in_flight() > 0);
    assert!(write_outputs(&config, &network).unwrap().is_empty());
}

#[test]
fn single_export_format() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        stats_dir: Some(dir.path().to_path_buf()),
        export_format: Some(ExportFormat::Csv),
        ..Config::default()
    };
    let network = run(&config, &dev_null_tracker()).unwrap();
    let paths = write_outputs(&config, &network).unwrap();
    assert_eq!(paths.len(), 2);
    assert!(dir.path().join("noc_nodes.csv").exists());
    assert!(!dir.path().join("noc_statistics.json").exists());
    assert!(!dir.path().join(EVENTS_FILE).exists());
}

#[test]
fn log_file_tracker() {
    let dir = tempfile::tempdir().unwrap();
    let log_file = dir.path().join("noc.log");
    let config = Config {
        width: Some(2),
        height: Some(2),
        log_file: Some(log_file.to_str().unwrap().to_string()),
        log_level: Some(log::Level::Info),
        ..Config::default()
    };
    let tracker = setup_all_trackers(&config).unwrap();
    run(&config, &tracker).unwrap();
    tracker.shutdown();

    let log = fs::read_to_string(&log_file).unwrap();
    assert!(log.contains("injected 3 packets with the Hotspot pattern"));
    assert!(log.contains("drained after"));
}

#[test]
fn bad_filter_regex_is_reported() {
    let config = Config {
        stdout: Some(true),
        stdout_filter_regex: Some("node(".to_string()),
        ..Config::default()
    };
    assert!(setup_all_trackers(&config).is_err());
}
