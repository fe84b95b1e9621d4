// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use noc_models::config::NetworkConfig;
use noc_models::router::{NodeRouter, Route, route_mesh, route_torus};
use noc_models::topology::{Coord, Direction};

fn coords(config: &NetworkConfig) -> Vec<Coord> {
    (0..config.num_nodes())
        .map(|id| config.coord_of(id).unwrap())
        .collect()
}

/// Follow routing decisions hop by hop, returning the directions taken.
fn walk(config: &NetworkConfig, src: Coord, dst: Coord) -> Vec<Direction> {
    let mut path = Vec::new();
    let mut here = src;
    loop {
        let direction = NodeRouter::new(here, config).route(dst);
        if direction == Direction::Local {
            assert_eq!(here, dst);
            return path;
        }
        path.push(direction);
        here = config
            .neighbour_of(here, direction)
            .unwrap_or_else(|| panic!("{src} -> {dst}: no link {direction} at {here}"));
        assert!(
            path.len() <= config.num_nodes(),
            "{src} -> {dst} does not terminate"
        );
    }
}

fn is_x(direction: Direction) -> bool {
    matches!(direction, Direction::East | Direction::West)
}

fn check_all_pairs(config: &NetworkConfig) {
    let all = coords(config);
    for &src in &all {
        for &dst in &all {
            let path = walk(config, src, dst);
            assert_eq!(
                path.len(),
                config.distance(src, dst),
                "{src} -> {dst} is not minimal"
            );

            // Once a Y move is made no X move follows
            if let Some(first_y) = path.iter().position(|d| !is_x(*d)) {
                assert!(path[first_y..].iter().all(|d| !is_x(*d)), "{src} -> {dst}: {path:?}");
            }
        }
    }
}

#[test]
fn mesh_routes_are_minimal_and_x_first() {
    check_all_pairs(&NetworkConfig::mesh(4, 4));
    check_all_pairs(&NetworkConfig::mesh(5, 3));
    check_all_pairs(&NetworkConfig::mesh(1, 6));
}

#[test]
fn torus_routes_are_minimal_and_x_first() {
    check_all_pairs(&NetworkConfig::torus(4, 4));
    check_all_pairs(&NetworkConfig::torus(5, 3));
    check_all_pairs(&NetworkConfig::torus(2, 7));
}

#[test]
fn local_only_for_own_position() {
    let config = NetworkConfig::torus(3, 3);
    for here in coords(&config) {
        let router = NodeRouter::new(here, &config);
        for dst in coords(&config) {
            assert_eq!(router.route(dst) == Direction::Local, dst == here);
        }
    }
}

#[test]
fn mesh_examples() {
    assert_eq!(route_mesh(Coord::new(0, 0), Coord::new(3, 3)), Direction::East);
    assert_eq!(route_mesh(Coord::new(3, 0), Coord::new(3, 3)), Direction::South);
    assert_eq!(route_mesh(Coord::new(3, 3), Coord::new(3, 0)), Direction::North);
    assert_eq!(route_mesh(Coord::new(2, 2), Coord::new(0, 0)), Direction::West);
}

#[test]
fn torus_takes_shorter_way_round() {
    assert_eq!(route_torus(Coord::new(0, 0), Coord::new(3, 0), 4, 4), Direction::West);
    assert_eq!(route_torus(Coord::new(0, 0), Coord::new(0, 3), 4, 4), Direction::North);
    assert_eq!(route_torus(Coord::new(3, 3), Coord::new(0, 3), 4, 4), Direction::East);
}

#[test]
fn torus_tie_goes_direct() {
    // Distance 2 each way round a ring of 4
    assert_eq!(route_torus(Coord::new(0, 0), Coord::new(2, 0), 4, 4), Direction::East);
    assert_eq!(route_torus(Coord::new(2, 0), Coord::new(0, 0), 4, 4), Direction::West);
    assert_eq!(route_torus(Coord::new(1, 0), Coord::new(1, 2), 4, 4), Direction::South);
}

#[test]
fn neighbours_are_symmetric() {
    for config in [NetworkConfig::mesh(4, 3), NetworkConfig::torus(4, 3)] {
        for here in coords(&config) {
            for direction in Direction::LINKS {
                if let Some(there) = config.neighbour_of(here, direction) {
                    assert_eq!(config.neighbour_of(there, direction.opposite()), Some(here));
                }
            }
        }
    }
}

#[test]
fn mesh_edges_have_no_neighbours() {
    let config = NetworkConfig::mesh(4, 4);
    assert_eq!(config.neighbour_of(Coord::new(0, 0), Direction::North), None);
    assert_eq!(config.neighbour_of(Coord::new(0, 0), Direction::West), None);
    assert_eq!(config.neighbour_of(Coord::new(3, 3), Direction::South), None);
    assert_eq!(config.neighbour_of(Coord::new(3, 3), Direction::East), None);
    assert_eq!(config.neighbour_of(Coord::new(1, 1), Direction::Local), None);
}
