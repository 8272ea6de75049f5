use geo_types::LineString;
use itertools::Itertools;

use crate::polyline;
use crate::route_step::{Coordinate, RouteStep, TravelMode};

/// A maximal run of consecutive steps sharing one travel mode.
#[derive(Debug, PartialEq)]
pub struct Segment {
    pub travel_mode: TravelMode,
    pub steps: Vec<RouteStep>,
    pub path: Vec<Coordinate>,
}

impl Segment {
    pub fn line_string(&self) -> LineString<f64> {
        self.path.iter().copied().map(geo_types::Coord::from).collect()
    }

    pub fn distance_meters(&self) -> u32 {
        self.steps.iter().map(|s| s.distance_meters).sum()
    }

    pub fn duration_seconds(&self) -> u32 {
        self.steps.iter().map(|s| s.static_duration_seconds).sum()
    }
}

#[derive(Debug, PartialEq)]
pub struct Transition {
    // index of the segment the traveller switches into
    pub index: usize,
    pub from: TravelMode,
    pub to: TravelMode,
    pub at: Coordinate,
}

// A step we cannot draw still counts towards its segment; it just adds no
// points to the path.
fn decode_step_path(step: &RouteStep) -> Vec<Coordinate> {
    if step.polyline.is_empty() {
        debug!(
            "[route_segmenter] {} step has no polyline, treated as zero-length",
            step.travel_mode
        );
        return Vec::new();
    }
    match polyline::decode(&step.polyline) {
        Ok(path) => path,
        Err(error) => {
            warn!(
                "[route_segmenter] skipping geometry of {} step: {}",
                step.travel_mode, error
            );
            Vec::new()
        }
    }
}

pub fn segment(steps: &[RouteStep]) -> Vec<Segment> {
    let mut segments = Vec::new();
    for (travel_mode, group) in &steps.iter().chunk_by(|step| step.travel_mode) {
        let mut steps = Vec::new();
        let mut path = Vec::new();
        for step in group {
            path.extend(decode_step_path(step));
            steps.push(step.clone());
        }
        segments.push(Segment {
            travel_mode,
            steps,
            path,
        });
    }
    segments
}

pub fn transitions(segments: &[Segment]) -> Vec<Transition> {
    let mut result = Vec::new();
    for (i, (prev, next)) in segments.iter().tuple_windows().enumerate() {
        if prev.travel_mode == next.travel_mode {
            continue;
        }
        match next.path.first() {
            None => warn!(
                "[route_segmenter] no geometry for {} -> {} transition at segment {}",
                prev.travel_mode,
                next.travel_mode,
                i + 1
            ),
            Some(at) => result.push(Transition {
                index: i + 1,
                from: prev.travel_mode,
                to: next.travel_mode,
                at: *at,
            }),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polyline;

    fn step(travel_mode: TravelMode, points: &[(f64, f64)]) -> RouteStep {
        let coordinates: Vec<_> = points
            .iter()
            .map(|(lat, lng)| Coordinate::new(*lat, *lng))
            .collect();
        RouteStep {
            travel_mode,
            distance_meters: 100,
            static_duration_seconds: 60,
            polyline: polyline::encode(&coordinates).unwrap(),
            instruction: None,
            maneuver: None,
            transit_line: None,
        }
    }

    #[test]
    fn empty_route() {
        let segments = segment(&[]);
        assert!(segments.is_empty());
        assert!(transitions(&segments).is_empty());
    }

    #[test]
    fn single_mode() {
        for n in 1..6 {
            let steps: Vec<_> = (0..n)
                .map(|i| step(TravelMode::Walk, &[(1.0, i as f64), (1.0, i as f64 + 0.5)]))
                .collect();
            let segments = segment(&steps);
            assert_eq!(segments.len(), 1);
            assert_eq!(segments[0].steps.len(), n);
            assert_eq!(segments[0].path.len(), n * 2);
            assert!(transitions(&segments).is_empty());
        }
    }

    #[test]
    fn mode_changes() {
        let steps = vec![
            step(TravelMode::Walk, &[(1.0, 1.0), (1.0, 2.0)]),
            step(TravelMode::Walk, &[(1.0, 2.0), (1.0, 3.0)]),
            step(TravelMode::Bus, &[(1.0, 3.0), (2.0, 3.0)]),
            step(TravelMode::Walk, &[(2.0, 3.0), (2.0, 4.0)]),
        ];
        let segments = segment(&steps);
        assert_eq!(
            segments.iter().map(|s| s.travel_mode).collect::<Vec<_>>(),
            vec![TravelMode::Walk, TravelMode::Bus, TravelMode::Walk]
        );
        // boundary points are kept as-is
        assert_eq!(segments[0].path.len(), 4);
        assert_eq!(segments[0].distance_meters(), 200);
        assert_eq!(segments[0].duration_seconds(), 120);
        assert_eq!(segments[1].line_string().0.len(), 2);

        assert_eq!(
            transitions(&segments),
            vec![
                Transition {
                    index: 1,
                    from: TravelMode::Walk,
                    to: TravelMode::Bus,
                    at: Coordinate::new(1.0, 3.0),
                },
                Transition {
                    index: 2,
                    from: TravelMode::Bus,
                    to: TravelMode::Walk,
                    at: Coordinate::new(2.0, 3.0),
                },
            ]
        );
    }

    #[test]
    fn malformed_step_only_loses_its_geometry() {
        let mut broken = step(TravelMode::Subway, &[]);
        broken.polyline = "_p~iF~ps|".to_string();
        let steps = vec![
            step(TravelMode::Walk, &[(1.0, 1.0), (1.0, 2.0)]),
            broken,
            step(TravelMode::Subway, &[(3.0, 3.0)]),
        ];
        let segments = segment(&steps);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].steps.len(), 2);
        assert_eq!(segments[1].path, vec![Coordinate::new(3.0, 3.0)]);
        assert_eq!(transitions(&segments)[0].at, Coordinate::new(3.0, 3.0));
    }

    #[test]
    fn transition_into_pathless_segment_is_skipped() {
        let steps = vec![
            step(TravelMode::Walk, &[(1.0, 1.0)]),
            step(TravelMode::Tram, &[]),
        ];
        let segments = segment(&steps);
        assert_eq!(segments.len(), 2);
        assert!(transitions(&segments).is_empty());
    }
}
