use crate::route_step::{RouteStep, StepKind, TravelMode};
use crate::utils::{format_distance, format_duration};

#[derive(Clone, Debug, PartialEq)]
pub struct CondensedStep {
    pub distance_meters: u32,
    pub static_duration_seconds: u32,
    pub instruction: String,
    pub detail: String,
    // number of raw walking steps merged into this one
    pub merged_steps: usize,
}

impl CondensedStep {
    fn new(distance_meters: u32, static_duration_seconds: u32, merged_steps: usize) -> Self {
        CondensedStep {
            distance_meters,
            static_duration_seconds,
            instruction: format!("Walk for {}", format_duration(static_duration_seconds)),
            detail: format!(
                "Total walking distance: {}",
                format_distance(distance_meters)
            ),
            merged_steps,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DisplayStep {
    Step(RouteStep),
    Condensed(CondensedStep),
}

impl DisplayStep {
    pub fn travel_mode(&self) -> TravelMode {
        match self {
            DisplayStep::Step(step) => step.travel_mode,
            DisplayStep::Condensed(_) => TravelMode::Walk,
        }
    }

    pub fn distance_meters(&self) -> u32 {
        match self {
            DisplayStep::Step(step) => step.distance_meters,
            DisplayStep::Condensed(step) => step.distance_meters,
        }
    }

    pub fn static_duration_seconds(&self) -> u32 {
        match self {
            DisplayStep::Step(step) => step.static_duration_seconds,
            DisplayStep::Condensed(step) => step.static_duration_seconds,
        }
    }

    pub fn instruction(&self) -> Option<&str> {
        match self {
            DisplayStep::Step(step) => step.instruction.as_deref(),
            DisplayStep::Condensed(step) => Some(&step.instruction),
        }
    }
}

#[derive(Default)]
struct WalkAccumulator {
    distance_meters: u32,
    duration_seconds: u32,
    count: usize,
}

impl WalkAccumulator {
    fn add(&mut self, step: &RouteStep) {
        self.distance_meters = self.distance_meters.saturating_add(step.distance_meters);
        self.duration_seconds = self
            .duration_seconds
            .saturating_add(step.static_duration_seconds);
        self.count += 1;
    }

    fn flush_into(&mut self, output: &mut Vec<DisplayStep>) {
        if self.count > 0 {
            output.push(DisplayStep::Condensed(CondensedStep::new(
                self.distance_meters,
                self.duration_seconds,
                self.count,
            )));
            *self = WalkAccumulator::default();
        }
    }
}

/// Merges every run of raw walking steps into a single summary step.
/// Condensed items already in the input are passed through untouched, so
/// running this on its own output is a no-op.
pub fn condense(steps: &[DisplayStep]) -> Vec<DisplayStep> {
    let mut output = Vec::with_capacity(steps.len());
    let mut pending = WalkAccumulator::default();
    for item in steps {
        match item {
            DisplayStep::Step(step) if step.kind() == StepKind::Walk => pending.add(step),
            _ => {
                pending.flush_into(&mut output);
                output.push(item.clone());
            }
        }
    }
    pending.flush_into(&mut output);
    output
}

pub fn condense_route(steps: &[RouteStep]) -> Vec<DisplayStep> {
    let items: Vec<_> = steps.iter().cloned().map(DisplayStep::Step).collect();
    condense(&items)
}
