//! Simple-Span Line-Girder Analysis
//!
//! A [`StructuralSolver`] for bridges made of simple spans. Each girder is a
//! simply supported beam; dead-load moments come from superposition of the
//! loads applied in each interval and the live-load envelope from a lane load
//! plus a design truck positioned on the moment influence line.
//!
//! A simple span is statically determinate, so imposed deformations from
//! creep, shrinkage and relaxation produce no secondary forces, and neither
//! does post-tensioning. The imposed deformations are still recorded per load
//! case so they can be inspected.
//!
//! ## Sign Convention
//! - Positive moment: tension on bottom fiber (sagging)
//!
//! ## Example
//! ```rust
//! use loss_core::reference::beam_analysis::SpanLoad;
//!
//! // 30 m span, 20 N/mm uniform load: wL²/8 at midspan
//! let load = SpanLoad::uniform(20.0);
//! assert_eq!(load.moment_at(15_000.0, 30_000.0), 20.0 * 30_000.0_f64.powi(2) / 8.0);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bridge::BridgeTopology;
use crate::intervals::IntervalSchedule;
use crate::loads::ProductForce;
use crate::poi::{GirderKey, IntervalIndex, PointOfInterest};
use crate::solver::{InitialStrainLoad, MomentEnvelope, SectionForce, StructuralSolver};

use super::description::LiveLoad;
use super::model::ReferenceBridge;

/// A single load applied to a span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpanLoad {
    /// Point load at a distance from the left support
    Point { magnitude: f64, position: f64 },

    /// Uniform load over the entire span
    Uniform { magnitude: f64 },

    /// Uniform load over part of the span
    UniformPartial { magnitude: f64, start: f64, end: f64 },
}

impl SpanLoad {
    pub fn point(magnitude: f64, position: f64) -> Self {
        SpanLoad::Point { magnitude, position }
    }

    pub fn uniform(magnitude: f64) -> Self {
        SpanLoad::Uniform { magnitude }
    }

    pub fn uniform_partial(magnitude: f64, start: f64, end: f64) -> Self {
        SpanLoad::UniformPartial { magnitude, start, end }
    }

    /// True when the whole load sits between the supports
    pub fn lies_within(&self, span: f64) -> bool {
        match *self {
            SpanLoad::Point { position, .. } => (0.0..=span).contains(&position),
            SpanLoad::Uniform { .. } => true,
            SpanLoad::UniformPartial { start, end, .. } => {
                0.0 <= start && start < end && end <= span
            }
        }
    }

    /// Left reaction (R1)
    pub fn reaction_left(&self, span: f64) -> f64 {
        match self {
            // R1 = P(L-a)/L
            SpanLoad::Point { magnitude, position } => magnitude * (span - position) / span,
            // R1 = wL/2
            SpanLoad::Uniform { magnitude } => magnitude * span / 2.0,
            SpanLoad::UniformPartial { magnitude, start, end } => {
                // W = w(b-a) acting at c = (a+b)/2
                let total = magnitude * (end - start);
                let centroid = (start + end) / 2.0;
                total * (span - centroid) / span
            }
        }
    }

    /// Moment at `x` from the left support
    pub fn moment_at(&self, x: f64, span: f64) -> f64 {
        if span <= 0.0 {
            return 0.0;
        }
        let r1 = self.reaction_left(span);
        match self {
            SpanLoad::Point { magnitude, position } => {
                if x < *position {
                    r1 * x
                } else {
                    r1 * x - magnitude * (x - position)
                }
            }
            // wx(L-x)/2
            SpanLoad::Uniform { magnitude } => magnitude * x * (span - x) / 2.0,
            SpanLoad::UniformPartial { magnitude, start, end } => {
                if x <= *start {
                    r1 * x
                } else if x >= *end {
                    let total = magnitude * (end - start);
                    r1 * x - total * (x - (start + end) / 2.0)
                } else {
                    r1 * x - magnitude * (x - start).powi(2) / 2.0
                }
            }
        }
    }
}

/// A product load applied to a girder in an interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppliedLoad {
    pub load: ProductForce,
    pub interval: IntervalIndex,
    pub span_load: SpanLoad,
}

#[derive(Debug, Clone, Default)]
struct SpanModel {
    span: f64,
    loads: Vec<AppliedLoad>,
}

/// Moment influence ordinate at `x` for a unit load at `s`
fn influence(x: f64, s: f64, span: f64) -> f64 {
    if s < 0.0 || span < s {
        0.0
    } else if s <= x {
        s * (span - x) / span
    } else {
        x * (span - s) / span
    }
}

/// Largest design truck moment at `x`, trying each axle over `x` in both
/// driving directions
fn truck_moment(live_load: &LiveLoad, x: f64, span: f64) -> f64 {
    let mut offsets = vec![0.0];
    for spacing in &live_load.axle_spacing {
        let last = offsets.last().copied().unwrap_or(0.0);
        offsets.push(last + spacing);
    }
    let axles: Vec<(f64, f64)> = live_load
        .axle_weights
        .iter()
        .copied()
        .zip(offsets.iter().copied())
        .collect();

    let mut max: f64 = 0.0;
    for (_, on_section) in &axles {
        for direction in [1.0, -1.0] {
            let moment: f64 = axles
                .iter()
                .map(|(weight, offset)| {
                    weight * influence(x, x + direction * (offset - on_section), span)
                })
                .sum();
            max = max.max(moment);
        }
    }
    max
}

/// Line-girder solver for simple spans
#[derive(Debug, Clone, Default)]
pub struct SimpleSpanSolver {
    spans: BTreeMap<GirderKey, SpanModel>,
    live_load: Option<(IntervalIndex, LiveLoad)>,
    load_cases: BTreeMap<String, Vec<InitialStrainLoad>>,
}

impl SimpleSpanSolver {
    pub fn new() -> Self {
        SimpleSpanSolver::default()
    }

    /// Solver loaded with the dead and live loads of a reference bridge
    pub fn for_bridge(bridge: &ReferenceBridge) -> Self {
        let input = bridge.input();
        let mut solver = SimpleSpanSolver::new();
        let uniform_loads = [
            (ProductForce::GirderSelfWeight, bridge.girder_weight()),
            (ProductForce::Diaphragm, input.loads.diaphragm),
            (ProductForce::Deck, bridge.deck_weight()),
            (ProductForce::TrafficBarrier, input.loads.barrier),
            (ProductForce::Sidewalk, input.loads.sidewalk),
            (ProductForce::Overlay, input.loads.overlay),
        ];
        for group in 0..bridge.group_count() {
            for index in 0..bridge.girder_count(group) {
                let girder = GirderKey::new(group, index);
                solver.add_span(girder, bridge.girder_length(girder));
                for (load, magnitude) in uniform_loads {
                    if magnitude == 0.0 {
                        continue;
                    }
                    if let Some(interval) = bridge.load_interval(load) {
                        solver.add_load(
                            girder,
                            AppliedLoad {
                                load,
                                interval,
                                span_load: SpanLoad::uniform(magnitude),
                            },
                        );
                    }
                }
                for (interval, user) in bridge.user_loads(girder) {
                    solver.add_load(
                        girder,
                        AppliedLoad {
                            load: user.kind.product_force(),
                            interval,
                            span_load: user.load,
                        },
                    );
                }
            }
        }
        solver.set_live_load(bridge.live_load_interval(), input.live_load.clone());
        solver
    }

    pub fn add_span(&mut self, girder: GirderKey, span: f64) {
        self.spans.entry(girder).or_default().span = span;
    }

    pub fn add_load(&mut self, girder: GirderKey, load: AppliedLoad) {
        self.spans.entry(girder).or_default().loads.push(load);
    }

    pub fn set_live_load(&mut self, interval: IntervalIndex, live_load: LiveLoad) {
        self.live_load = Some((interval, live_load));
    }

    /// Names of the registered load cases
    pub fn load_cases(&self) -> impl Iterator<Item = &str> {
        self.load_cases.keys().map(String::as_str)
    }

    /// Imposed deformations recorded for a load case
    pub fn initial_strains(&self, load_case: &str) -> &[InitialStrainLoad] {
        self.load_cases.get(load_case).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl StructuralSolver for SimpleSpanSolver {
    fn register_load_case(&mut self, name: &str) {
        self.load_cases.entry(name.to_string()).or_default();
    }

    fn product_response(
        &self,
        interval: IntervalIndex,
        load: ProductForce,
        poi: &PointOfInterest,
    ) -> SectionForce {
        let Some(model) = self.spans.get(&poi.girder) else {
            return SectionForce::default();
        };
        let x = poi.dist_from_start.clamp(0.0, model.span);
        let moment = model
            .loads
            .iter()
            .filter(|applied| applied.load == load && applied.interval == interval)
            .map(|applied| applied.span_load.moment_at(x, model.span))
            .sum();
        SectionForce::new(0.0, moment)
    }

    fn live_load_moment(&self, interval: IntervalIndex, poi: &PointOfInterest) -> MomentEnvelope {
        let (Some(model), Some((opens, live_load))) = (self.spans.get(&poi.girder), &self.live_load)
        else {
            return MomentEnvelope::default();
        };
        if interval < *opens {
            return MomentEnvelope::default();
        }
        let span = model.span;
        let x = poi.dist_from_start.clamp(0.0, span);
        let lane = SpanLoad::uniform(live_load.lane_load).moment_at(x, span);
        let truck = (1.0 + live_load.impact_factor) * truck_moment(live_load, x, span);
        MomentEnvelope {
            min: 0.0,
            max: live_load.distribution_factor * (lane + truck),
        }
    }

    fn add_initial_strain(&mut self, load: InitialStrainLoad) {
        let loads = self.load_cases.entry(load.load_case.clone()).or_default();
        match loads.iter_mut().find(|existing| existing.replaces(&load)) {
            Some(existing) => *existing = load,
            None => loads.push(load),
        }
    }

    fn load_case_response(
        &self,
        _interval: IntervalIndex,
        _load_case: &str,
        _poi: &PointOfInterest,
    ) -> SectionForce {
        SectionForce::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poi::PoiAttributes;
    use crate::reference::description::{UserLoad, UserLoadKind};
    use crate::reference::{Activity, BridgeDescription};
    use approx::assert_relative_eq;

    fn poi(x: f64) -> PointOfInterest {
        PointOfInterest::new(GirderKey::new(0, 0), 0, x, PoiAttributes::ON_SEGMENT)
    }

    #[test]
    fn test_point_load_moment() {
        // 1000 N at midspan of 10 m: PL/4
        let load = SpanLoad::point(1000.0, 5000.0);
        assert_relative_eq!(load.reaction_left(10_000.0), 500.0);
        assert_relative_eq!(load.moment_at(5000.0, 10_000.0), 2.5e6);
        assert_relative_eq!(load.moment_at(2500.0, 10_000.0), 1.25e6);
    }

    #[test]
    fn test_partial_uniform_matches_full_uniform() {
        let full = SpanLoad::uniform(10.0);
        let partial = SpanLoad::uniform_partial(10.0, 0.0, 10_000.0);
        for x in [0.0, 2500.0, 5000.0, 9000.0] {
            let expected = full.moment_at(x, 10_000.0);
            assert_relative_eq!(partial.moment_at(x, 10_000.0), expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_product_response_in_applied_interval_only() {
        let mut solver = SimpleSpanSolver::new();
        let girder = GirderKey::new(0, 0);
        solver.add_span(girder, 30_000.0);
        solver.add_load(
            girder,
            AppliedLoad {
                load: ProductForce::Deck,
                interval: 10,
                span_load: SpanLoad::uniform(12.0),
            },
        );
        let response = solver.product_response(10, ProductForce::Deck, &poi(15_000.0));
        // 12 x 30000² / 8
        assert_relative_eq!(response.moment, 1.35e9);
        assert_eq!(response.axial, 0.0);
        assert_eq!(solver.product_response(11, ProductForce::Deck, &poi(15_000.0)).moment, 0.0);
        assert_eq!(solver.product_response(10, ProductForce::Overlay, &poi(15_000.0)).moment, 0.0);
    }

    #[test]
    fn test_live_load_envelope_at_midspan() {
        let mut solver = SimpleSpanSolver::new();
        solver.add_span(GirderKey::new(0, 0), 30_000.0);
        solver.set_live_load(
            16,
            LiveLoad {
                distribution_factor: 1.0,
                ..LiveLoad::default()
            },
        );
        // lane: 9.3 x 30000² / 8 = 1.04625e9
        // truck, middle axle at midspan: 145k x 7500 + 145k x 5350 + 35k x 5350 = 2.0505e9
        let envelope = solver.live_load_moment(16, &poi(15_000.0));
        assert_relative_eq!(envelope.max, 1.04625e9 + 1.33 * 2.0505e9, max_relative = 1e-12);
        assert_eq!(envelope.min, 0.0);
        assert_eq!(solver.live_load_moment(15, &poi(15_000.0)), MomentEnvelope::default());
    }

    #[test]
    fn test_truck_off_the_span() {
        // axles beyond the supports carry nothing
        let live_load = LiveLoad::default();
        assert_eq!(truck_moment(&live_load, 0.0, 30_000.0), 0.0);
        assert!(truck_moment(&live_load, 3000.0, 30_000.0) > 0.0);
    }

    #[test]
    fn test_load_case_registration_is_idempotent() {
        let mut solver = SimpleSpanSolver::new();
        solver.register_load_case("Creep");
        solver.register_load_case("Creep");
        solver.register_load_case("Shrinkage");
        assert_eq!(solver.load_cases().count(), 2);
    }

    #[test]
    fn test_imposed_deformations_are_recorded() {
        let mut solver = SimpleSpanSolver::new();
        solver.register_load_case("Creep");
        solver.add_initial_strain(InitialStrainLoad {
            interval: 3,
            load_case: "Creep".to_string(),
            start: poi(0.0),
            end: poi(3000.0),
            strain: -1.0e-5,
            curvature: 2.0e-9,
        });
        assert_eq!(solver.initial_strains("Creep").len(), 1);
        assert!(solver.initial_strains("Relaxation").is_empty());

        // same span and interval again: replaced, not added
        solver.add_initial_strain(InitialStrainLoad {
            interval: 3,
            load_case: "Creep".to_string(),
            start: poi(0.0),
            end: poi(3000.0),
            strain: -2.0e-5,
            curvature: 2.0e-9,
        });
        assert_eq!(solver.initial_strains("Creep").len(), 1);
        assert_eq!(solver.initial_strains("Creep")[0].strain, -2.0e-5);
        solver.add_initial_strain(InitialStrainLoad {
            interval: 4,
            load_case: "Creep".to_string(),
            start: poi(0.0),
            end: poi(3000.0),
            strain: -1.0e-5,
            curvature: 0.0,
        });
        assert_eq!(solver.initial_strains("Creep").len(), 2);
        // statically determinate: no secondary forces
        assert_eq!(solver.load_case_response(3, "Creep", &poi(1500.0)), SectionForce::default());
    }

    #[test]
    fn test_solver_for_sample_bridge() {
        let bridge = ReferenceBridge::new(BridgeDescription::sample()).unwrap();
        let solver = SimpleSpanSolver::for_bridge(&bridge);
        let release = bridge.load_interval(ProductForce::GirderSelfWeight).unwrap();
        let moment = solver
            .product_response(release, ProductForce::GirderSelfWeight, &poi(15_000.0))
            .moment;
        // 24e-6 x 509000 = 12.216 N/mm, x 30000² / 8
        assert_relative_eq!(moment, 12.216 * 1.125e8, max_relative = 1e-12);
    }

    #[test]
    fn test_user_loads_reach_the_solver() {
        let mut description = BridgeDescription::sample();
        description.user_loads = vec![
            UserLoad {
                kind: UserLoadKind::Dc,
                group: 0,
                activity: Activity::CastDeck,
                load: SpanLoad::point(100_000.0, 10_000.0),
            },
            UserLoad {
                kind: UserLoadKind::Dw,
                group: 1,
                activity: Activity::InstallRailing,
                load: SpanLoad::uniform_partial(2.0, 0.0, 16_000.0),
            },
        ];
        let bridge = ReferenceBridge::new(description).unwrap();
        let solver = SimpleSpanSolver::for_bridge(&bridge);
        let (cast_deck, railing) = (10, 14);

        // R1 = 100 kN x 20/30, M = R1 x 15 m - 100 kN x 5 m
        let dc = solver.product_response(cast_deck, ProductForce::UserDc, &poi(15_000.0));
        assert_relative_eq!(dc.moment, 5.0e8, max_relative = 1e-12);
        let dc_later = solver.product_response(railing, ProductForce::UserDc, &poi(15_000.0));
        assert_eq!(dc_later.moment, 0.0);

        // R1 = 32 kN x 3/4, M = R1 x 16 m - 32 kN x 8 m
        let second_span =
            PointOfInterest::new(GirderKey::new(1, 2), 0, 16_000.0, PoiAttributes::ON_SEGMENT);
        let dw = solver.product_response(railing, ProductForce::UserDw, &second_span);
        assert_relative_eq!(dw.moment, 1.28e8, max_relative = 1e-12);
        let first_span = solver.product_response(railing, ProductForce::UserDw, &poi(15_000.0));
        assert_eq!(first_span.moment, 0.0);
    }
}
