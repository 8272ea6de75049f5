use std::collections::HashMap;
use std::sync::Arc;

use geo_types::Rect;

use crate::route_data::RouteCandidate;
use crate::route_segmenter::{self, Segment, Transition};
use crate::route_step::Coordinate;
use crate::step_condenser::{self, DisplayStep};

/// Everything needed to draw one route candidate and list its steps.
#[derive(Debug, PartialEq)]
pub struct RouteView {
    pub route_id: String,
    pub condensed: bool,
    pub segments: Vec<Segment>,
    pub transitions: Vec<Transition>,
    pub steps: Vec<DisplayStep>,
    pub start: Option<Coordinate>,
    pub end: Option<Coordinate>,
}

impl RouteView {
    pub fn build(route: &RouteCandidate, condensed: bool) -> Self {
        let segments = route_segmenter::segment(&route.steps);
        let transitions = route_segmenter::transitions(&segments);
        let steps = if condensed {
            step_condenser::condense_route(&route.steps)
        } else {
            route.steps.iter().cloned().map(DisplayStep::Step).collect()
        };
        RouteView {
            route_id: route.id.clone(),
            condensed,
            segments,
            transitions,
            steps,
            start: route.start,
            end: route.end,
        }
    }

    pub fn path(&self) -> impl Iterator<Item = &Coordinate> {
        self.segments.iter().flat_map(|s| s.path.iter())
    }

    /// The area the map should fit to show the whole route.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        let mut points = self.path().chain(self.start.iter()).chain(self.end.iter());
        let first = points.next()?;
        let (mut min, mut max) = (*first, *first);
        for p in points {
            min.latitude = min.latitude.min(p.latitude);
            min.longitude = min.longitude.min(p.longitude);
            max.latitude = max.latitude.max(p.latitude);
            max.longitude = max.longitude.max(p.longitude);
        }
        Some(Rect::new(min, max))
    }
}

// Segments and steps are pure functions of (route, condensed), so caching is
// only about not decoding the same polylines on every redraw.
#[derive(Default)]
pub struct RouteViewCache {
    views: HashMap<(String, bool), Arc<RouteView>>,
}

impl RouteViewCache {
    pub fn new() -> Self {
        RouteViewCache::default()
    }

    pub fn get_or_build(&mut self, route: &RouteCandidate, condensed: bool) -> Arc<RouteView> {
        self.views
            .entry((route.id.clone(), condensed))
            .or_insert_with(|| Arc::new(RouteView::build(route, condensed)))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn clear(&mut self) {
        self.views.clear();
    }
}
