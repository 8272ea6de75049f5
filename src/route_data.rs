/* Ingestion of the shade-scoring backend's `/routes` response.

The backend wraps each raw Routes API route (`data`) with its own shade
analysis. Everything is validated here, once, into `RouteCandidate`s; the rest
of the pipeline only ever sees typed steps.
*/
use std::cmp::Ordering;
use std::hash::{DefaultHasher, Hash, Hasher};

use anyhow::Result;
use serde::Deserialize;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::Error;
use crate::route_step::{Coordinate, RouteStep, StepKind, TransitLine, TravelMode};
use crate::utils;

#[derive(Deserialize)]
struct RawRouteCandidate {
    duration: String,
    #[serde(default)]
    distance: String,
    #[serde(default)]
    shadow_ratio: f64,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    shadow_length_m: f64,
    #[serde(default)]
    total_length_m: f64,
    #[serde(default)]
    steps_analysis: Vec<RawStepAnalysis>,
    data: RawRoute,
}

#[derive(Deserialize)]
struct RawStepAnalysis {
    #[serde(default)]
    instruction: String,
    #[serde(default)]
    distance_text: String,
    #[serde(default)]
    shadow_ratio: f64,
    #[serde(default)]
    length_m: f64,
    #[serde(default)]
    shadow_length_m: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRoute {
    #[serde(default)]
    legs: Vec<RawLeg>,
    distance_meters: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLeg {
    #[serde(default)]
    steps: Vec<RawStep>,
    start_location: Option<RawLocation>,
    end_location: Option<RawLocation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLocation {
    lat_lng: Option<RawLatLng>,
}

#[derive(Deserialize)]
struct RawLatLng {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStep {
    travel_mode: Option<String>,
    #[serde(default)]
    distance_meters: u32,
    static_duration: Option<String>,
    polyline: Option<RawPolyline>,
    navigation_instruction: Option<RawNavigationInstruction>,
    transit_details: Option<RawTransitDetails>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPolyline {
    encoded_polyline: Option<String>,
}

#[derive(Deserialize)]
struct RawNavigationInstruction {
    maneuver: Option<String>,
    instructions: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransitDetails {
    transit_line: Option<RawTransitLine>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransitLine {
    name: Option<String>,
    name_short: Option<String>,
    vehicle: Option<RawVehicle>,
}

#[derive(Deserialize)]
struct RawVehicle {
    name: Option<RawLocalizedText>,
    #[serde(rename = "type")]
    type_: Option<String>,
}

#[derive(Deserialize)]
struct RawLocalizedText {
    text: String,
}

/// Per-step shade analysis computed by the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct StepShade {
    pub instruction: String,
    pub distance_text: String,
    pub shadow_ratio: f64,
    pub length_m: f64,
    pub shadow_length_m: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RouteCandidate {
    pub id: String,
    pub summary: String,
    pub duration_seconds: u32,
    pub distance_meters: u32,
    pub distance_text: String,
    pub shadow_ratio: f64,
    pub shadow_length_m: f64,
    pub total_length_m: f64,
    pub step_shade: Vec<StepShade>,
    pub steps: Vec<RouteStep>,
    pub start: Option<Coordinate>,
    pub end: Option<Coordinate>,
}

impl RouteCandidate {
    pub fn has_transit(&self) -> bool {
        self.steps.iter().any(|s| s.travel_mode.is_transit())
    }

    pub fn walking_distance_meters(&self) -> u32 {
        self.steps
            .iter()
            .filter(|s| s.kind() == StepKind::Walk)
            .map(|s| s.distance_meters)
            .sum()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum RouteSortKey {
    Time,
    Distance,
    Shade,
}

/// Stable sort. `Shade` puts the shadiest route first, the others the
/// shortest.
pub fn sort_routes(routes: &mut [RouteCandidate], key: RouteSortKey) {
    let compare = |a: &RouteCandidate, b: &RouteCandidate| -> Ordering {
        match key {
            RouteSortKey::Time => a.duration_seconds.cmp(&b.duration_seconds),
            RouteSortKey::Distance => a.distance_meters.cmp(&b.distance_meters),
            RouteSortKey::Shade => b.shadow_ratio.total_cmp(&a.shadow_ratio),
        }
    };
    routes.sort_by(compare);
}

fn missing(field: &'static str) {
    let error = Error::MissingField(field);
    warn!("[route_data] {}", error);
}

// Routes API tags every transit step as `TRANSIT`; the vehicle says which.
fn travel_mode_of_vehicle_type(vehicle_type: &str) -> TravelMode {
    match vehicle_type {
        "BUS" | "INTERCITY_BUS" | "TROLLEYBUS" | "SHARE_TAXI" => TravelMode::Bus,
        "SUBWAY" | "METRO_RAIL" => TravelMode::Subway,
        "TRAIN" | "RAIL" | "HEAVY_RAIL" | "COMMUTER_TRAIN" | "HIGH_SPEED_TRAIN"
        | "LONG_DISTANCE_TRAIN" => TravelMode::Train,
        "TRAM" => TravelMode::Tram,
        "LIGHT_RAIL" | "MONORAIL" => TravelMode::LightRail,
        _ => TravelMode::Unknown,
    }
}

fn ingest_step(raw: RawStep) -> RouteStep {
    let vehicle_type = raw
        .transit_details
        .as_ref()
        .and_then(|d| d.transit_line.as_ref())
        .and_then(|l| l.vehicle.as_ref())
        .and_then(|v| v.type_.as_deref());
    let travel_mode = match (raw.travel_mode.as_deref(), vehicle_type) {
        (Some("TRANSIT"), Some(vehicle_type)) => travel_mode_of_vehicle_type(vehicle_type),
        (Some(mode), _) => TravelMode::of_str(mode),
        (None, _) => {
            missing("travelMode");
            TravelMode::Unknown
        }
    };
    let polyline = match raw.polyline.and_then(|p| p.encoded_polyline) {
        Some(polyline) => polyline,
        None => {
            missing("polyline.encodedPolyline");
            String::new()
        }
    };
    let static_duration_seconds = match raw.static_duration {
        None => 0,
        Some(s) => utils::parse_duration_seconds(&s).unwrap_or_else(|error| {
            warn!("[route_data] bad staticDuration {:?}: {}", s, error);
            0
        }),
    };
    let (maneuver, instruction) = match raw.navigation_instruction {
        None => (None, None),
        Some(n) => (n.maneuver, n.instructions),
    };
    let transit_line = raw
        .transit_details
        .and_then(|d| d.transit_line)
        .map(|line| TransitLine {
            name: line.name.or(line.name_short).unwrap_or_default(),
            vehicle_name: line
                .vehicle
                .and_then(|v| v.name)
                .map(|n| n.text)
                .unwrap_or_default(),
        });
    let step = RouteStep {
        travel_mode,
        distance_meters: raw.distance_meters,
        static_duration_seconds,
        polyline,
        instruction,
        maneuver,
        transit_line,
    };
    if step.travel_mode.is_transit() && step.kind() == StepKind::Generic {
        missing("transitDetails.transitLine");
    }
    step
}

fn location(raw: Option<RawLocation>) -> Option<Coordinate> {
    raw.and_then(|l| l.lat_lng)
        .map(|ll| Coordinate::new(ll.latitude, ll.longitude))
}

// "1234 m" -> 1234
fn parse_distance_text(s: &str) -> Option<u32> {
    s.split_whitespace().next()?.parse().ok()
}

fn route_id(summary: &str, steps: &[RouteStep]) -> String {
    let mut hasher = DefaultHasher::new();
    summary.hash(&mut hasher);
    for step in steps {
        step.travel_mode.hash(&mut hasher);
        step.polyline.hash(&mut hasher);
    }
    format!("{:016x}", hasher.finish())
}

fn ingest_route(raw: RawRouteCandidate) -> Result<RouteCandidate> {
    let duration_seconds = utils::parse_duration_seconds(&raw.duration)?;
    let distance_meters = raw
        .data
        .distance_meters
        .or_else(|| parse_distance_text(&raw.distance))
        .unwrap_or_default();
    if raw.data.legs.is_empty() {
        bail!("route has no legs");
    }
    let mut start = None;
    let mut end = None;
    let mut steps = Vec::new();
    for (i, leg) in raw.data.legs.into_iter().enumerate() {
        if i == 0 {
            start = location(leg.start_location);
        }
        end = location(leg.end_location).or(end);
        steps.extend(leg.steps.into_iter().map(ingest_step));
    }
    let step_shade = raw
        .steps_analysis
        .into_iter()
        .map(|a| StepShade {
            instruction: a.instruction,
            distance_text: a.distance_text,
            shadow_ratio: a.shadow_ratio.clamp(0.0, 1.0),
            length_m: a.length_m,
            shadow_length_m: a.shadow_length_m,
        })
        .collect();
    Ok(RouteCandidate {
        id: route_id(&raw.summary, &steps),
        summary: raw.summary,
        duration_seconds,
        distance_meters,
        distance_text: raw.distance,
        shadow_ratio: raw.shadow_ratio.clamp(0.0, 1.0),
        shadow_length_m: raw.shadow_length_m,
        total_length_m: raw.total_length_m,
        step_shade,
        steps,
        start,
        end,
    })
}

/// Parses the backend's route array. A candidate that does not make sense is
/// dropped on its own; only a response that is not a JSON array fails.
pub fn parse_routes(json: &str) -> Result<Vec<RouteCandidate>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let mut routes = Vec::with_capacity(values.len());
    for (i, value) in values.into_iter().enumerate() {
        let route = serde_json::from_value::<RawRouteCandidate>(value)
            .map_err(anyhow::Error::from)
            .and_then(ingest_route);
        match route {
            Ok(route) => routes.push(route),
            Err(error) => warn!("[route_data] skipping route candidate {}: {:#}", i, error),
        }
    }
    info!("[route_data] ingested {} route candidates", routes.len());
    Ok(routes)
}
