#![allow(dead_code)]
use coolpath_core::polyline;
use coolpath_core::route_data::{self, RouteCandidate};
use coolpath_core::route_step::{Coordinate, RouteStep, TravelMode};
use std::fs;
use tempdir::TempDir;

pub fn load_routes_json_for_test() -> String {
    fs::read_to_string("./tests/data/routes.json").unwrap()
}

pub fn load_routes_for_test() -> Vec<RouteCandidate> {
    route_data::parse_routes(&load_routes_json_for_test()).unwrap()
}

pub fn route_by_summary<'a>(routes: &'a [RouteCandidate], summary: &str) -> &'a RouteCandidate {
    routes
        .iter()
        .find(|r| r.summary == summary)
        .unwrap_or_else(|| panic!("no route named {}", summary))
}

pub fn step(travel_mode: TravelMode, distance_meters: u32, duration: u32, points: &[(f64, f64)]) -> RouteStep {
    let path: Vec<_> = points
        .iter()
        .map(|(lat, lng)| Coordinate::new(*lat, *lng))
        .collect();
    RouteStep {
        travel_mode,
        distance_meters,
        static_duration_seconds: duration,
        polyline: polyline::encode(&path).unwrap(),
        instruction: None,
        maneuver: None,
        transit_line: None,
    }
}

pub fn support_dir(temp_dir: &TempDir) -> String {
    temp_dir.path().to_str().unwrap().to_string()
}
