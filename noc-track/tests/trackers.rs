// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use std::fs;

use noc_track::builder::{TrackerConfig, TrackersConfig, setup_trackers};
use noc_track::entity::{Entity, toplevel};
use noc_track::tracker::dev_null_tracker;
use noc_track::{Track, info, set_time, trace, warn};

#[test]
fn file_tracker_filters_by_level() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noc.log");
    let path_str = path.to_str().unwrap();

    let config = TrackersConfig {
        stdout: TrackerConfig {
            enable: false,
            ..TrackerConfig::default()
        },
        file: TrackerConfig {
            enable: true,
            level: log::Level::Info,
            filter_regex: "",
            file: Some(path_str),
        },
    };
    let tracker = setup_trackers(&config).unwrap();
    let top = toplevel(&tracker, "top");

    set_time!(top ; 4);
    info!(top ; "hello {}", 1);
    trace!(top ; "hidden");
    tracker.shutdown();

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("[4] 2:INFO: hello 1"));
    assert!(!contents.contains("hidden"));
    assert!(!contents.contains("step 4"));
}

#[test]
fn file_tracker_regex_filter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("filtered.log");
    let path_str = path.to_str().unwrap();

    let config = TrackersConfig {
        stdout: TrackerConfig {
            enable: false,
            ..TrackerConfig::default()
        },
        file: TrackerConfig {
            enable: true,
            level: log::Level::Trace,
            filter_regex: ".*node_1_1",
            file: Some(path_str),
        },
    };
    let tracker = setup_trackers(&config).unwrap();
    let top = toplevel(&tracker, "top");
    let quiet = Entity::new(&top, "node_0_0");
    let loud = Entity::new(&top, "node_1_1");

    info!(quiet ; "quiet node");
    info!(loud ; "loud node");
    warn!(top ; "top warning");
    tracker.shutdown();

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("loud node"));
    assert!(!contents.contains("quiet node"));
    assert!(!contents.contains("top warning"));
}

#[test]
fn file_tracker_without_filename() {
    let config = TrackersConfig {
        stdout: TrackerConfig {
            enable: false,
            ..TrackerConfig::default()
        },
        file: TrackerConfig::default(),
    };
    assert!(setup_trackers(&config).is_err());
}

#[test]
fn bad_filter_is_reported() {
    let config = TrackersConfig {
        stdout: TrackerConfig {
            filter_regex: "node(",
            ..TrackerConfig::default()
        },
        file: TrackerConfig {
            enable: false,
            ..TrackerConfig::default()
        },
    };
    assert!(setup_trackers(&config).is_err());
}

#[test]
fn dev_null_disables_everything() {
    let tracker = dev_null_tracker();
    assert!(!tracker.is_entity_enabled(noc_track::ROOT, log::Level::Error));
}
