use std::str::FromStr;

use strum_macros::{Display, EnumIter, EnumString};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinate {
            latitude,
            longitude,
        }
    }
}

// `geo` uses x/y, i.e. lng/lat.
impl From<Coordinate> for geo_types::Coord<f64> {
    fn from(c: Coordinate) -> Self {
        geo_types::coord! { x: c.longitude, y: c.latitude }
    }
}

impl From<geo_types::Coord<f64>> for Coordinate {
    fn from(c: geo_types::Coord<f64>) -> Self {
        Coordinate {
            latitude: c.y,
            longitude: c.x,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelMode {
    Walk,
    Bus,
    Subway,
    Train,
    Tram,
    LightRail,
    Unknown,
}

impl TravelMode {
    /// Backend strings outside the known set map to `Unknown`.
    pub fn of_str(s: &str) -> Self {
        TravelMode::from_str(s).unwrap_or(TravelMode::Unknown)
    }

    pub fn is_transit(&self) -> bool {
        !matches!(self, TravelMode::Walk | TravelMode::Unknown)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitLine {
    pub name: String,
    pub vehicle_name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RouteStep {
    pub travel_mode: TravelMode,
    pub distance_meters: u32,
    pub static_duration_seconds: u32,
    pub polyline: String,
    pub instruction: Option<String>,
    pub maneuver: Option<String>,
    pub transit_line: Option<TransitLine>,
}

/// The shapes a step can take once it has been validated at ingestion.
#[derive(Debug, PartialEq)]
pub enum StepKind<'a> {
    Walk,
    Transit(&'a TransitLine),
    Generic,
}

impl RouteStep {
    pub fn kind(&self) -> StepKind<'_> {
        match (&self.travel_mode, &self.transit_line) {
            (TravelMode::Walk, _) => StepKind::Walk,
            (mode, Some(line)) if mode.is_transit() => StepKind::Transit(line),
            _ => StepKind::Generic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn step(travel_mode: TravelMode, transit_line: Option<TransitLine>) -> RouteStep {
        RouteStep {
            travel_mode,
            distance_meters: 0,
            static_duration_seconds: 0,
            polyline: String::new(),
            instruction: None,
            maneuver: None,
            transit_line,
        }
    }

    #[test]
    fn travel_mode_string_conversion() {
        for mode in TravelMode::iter() {
            assert_eq!(mode, TravelMode::of_str(&mode.to_string()));
        }
        assert_eq!(TravelMode::LightRail.to_string(), "LIGHT_RAIL");
        assert_eq!(TravelMode::of_str("FERRY"), TravelMode::Unknown);
        assert_eq!(TravelMode::of_str(""), TravelMode::Unknown);
    }

    #[test]
    fn step_kind() {
        let line = TransitLine {
            name: "M15".to_string(),
            vehicle_name: "Bus".to_string(),
        };
        assert_eq!(step(TravelMode::Walk, None).kind(), StepKind::Walk);
        assert_eq!(
            step(TravelMode::Bus, Some(line.clone())).kind(),
            StepKind::Transit(&line)
        );
        // transit mode without line info, or line info on an unknown mode
        assert_eq!(step(TravelMode::Subway, None).kind(), StepKind::Generic);
        assert_eq!(
            step(TravelMode::Unknown, Some(line)).kind(),
            StepKind::Generic
        );
    }

    #[test]
    fn geo_coord_is_lng_lat() {
        let c: geo_types::Coord<f64> = Coordinate::new(38.5, -120.2).into();
        assert_eq!(c.x, -120.2);
        assert_eq!(c.y, 38.5);
        assert_eq!(Coordinate::from(c), Coordinate::new(38.5, -120.2));
    }
}
