use criterion::{criterion_group, criterion_main, Criterion};

use coolpath_core::polyline;
use coolpath_core::route_data;
use coolpath_core::route_step::{Coordinate, RouteStep, TravelMode};
use coolpath_core::route_view::RouteView;
use coolpath_core::{route_segmenter, step_condenser};

// a wiggly line around Singapore, long enough to look like a real bus leg
fn long_path(n: usize) -> Vec<Coordinate> {
    (0..n)
        .map(|i| {
            let t = i as f64 * 0.0007;
            Coordinate::new(1.29 + t, 103.85 + (t * 40.0).sin() * 0.002)
        })
        .collect()
}

fn steps_for_bench() -> Vec<RouteStep> {
    let modes = [
        TravelMode::Walk,
        TravelMode::Walk,
        TravelMode::Bus,
        TravelMode::Walk,
        TravelMode::Subway,
        TravelMode::Subway,
        TravelMode::Walk,
        TravelMode::Walk,
        TravelMode::Walk,
    ];
    modes
        .iter()
        .map(|mode| RouteStep {
            travel_mode: *mode,
            distance_meters: 250,
            static_duration_seconds: 180,
            polyline: polyline::encode(&long_path(200)).unwrap(),
            instruction: Some(format!("{}", mode)),
            maneuver: None,
            transit_line: None,
        })
        .collect()
}

fn polyline_decode(c: &mut Criterion) {
    let encoded = polyline::encode(&long_path(2000)).unwrap();
    c.bench_function("polyline_decode", |b| {
        b.iter(|| {
            std::hint::black_box(polyline::decode(&encoded).unwrap());
        });
    });
}

fn segment_and_condense(c: &mut Criterion) {
    let steps = steps_for_bench();
    c.bench_function("segment_and_condense", |b| {
        b.iter(|| {
            let segments = route_segmenter::segment(&steps);
            std::hint::black_box(route_segmenter::transitions(&segments));
            std::hint::black_box(step_condenser::condense_route(&steps));
        });
    });
}

fn route_view(c: &mut Criterion) {
    let json = std::fs::read_to_string("./tests/data/routes.json").unwrap();
    let routes = route_data::parse_routes(&json).unwrap();
    c.bench_function("route_view", |b| {
        b.iter(|| {
            for route in &routes {
                std::hint::black_box(RouteView::build(route, true));
            }
        });
    });
}

criterion_group!(benches, polyline_decode, segment_and_condense, route_view);
criterion_main!(benches);
