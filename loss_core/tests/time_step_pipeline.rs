//! Full pipeline runs on the sample bridge.

use approx::assert_relative_eq;
use std::cell::RefCell;

use loss_core::bridge::{BridgeTopology, StrandType};
use loss_core::intervals::IntervalSchedule;
use loss_core::losses::engine::line_girders;
use loss_core::losses::{EquilibriumPolicy, LineStage, LossConfig, TimeStepLossEngine};
use loss_core::poi::{GirderKey, MemberEnd, PointOfInterest};
use loss_core::progress::ProgressSink;
use loss_core::reference::{
    Activity, BridgeDescription, ReferenceBridge, SimpleSpanSolver, SpanLoad, UserLoad,
    UserLoadKind,
};
use loss_core::AnalysisServices;

fn sample() -> (ReferenceBridge, SimpleSpanSolver) {
    let bridge = ReferenceBridge::new(BridgeDescription::sample()).unwrap();
    let solver = SimpleSpanSolver::for_bridge(&bridge);
    (bridge, solver)
}

fn midspan(bridge: &ReferenceBridge, girder: GirderKey) -> PointOfInterest {
    let length = bridge.girder_length(girder);
    bridge
        .points_of_interest(girder)
        .into_iter()
        .find(|poi| (poi.dist_from_start - length / 2.0).abs() < 1.0)
        .unwrap()
}

#[test]
fn test_lazy_computation_extends_monotonically() {
    let (bridge, mut solver) = sample();
    let mut engine = TimeStepLossEngine::new(LossConfig::default()).unwrap();
    let mut services = AnalysisServices::new(&bridge, &mut solver);
    let girder = GirderKey::new(0, 0);

    let line = engine.compute(&mut services, girder, 5).unwrap();
    assert_eq!(line.stage, LineStage::ComputedThrough(5));
    assert!(line.records().all(|record| record.history.len() == 6));

    // earlier intervals are already there
    let line = engine.compute(&mut services, girder, 3).unwrap();
    assert_eq!(line.intervals_analyzed(), 6);

    let before = engine.history(0).unwrap().clone();
    let line = engine.compute(&mut services, girder, 9).unwrap();
    assert_eq!(line.intervals_analyzed(), 10);
    let after = engine.history(0).unwrap();
    for (old, new) in before.records().zip(after.records()) {
        assert_eq!(old.history[..], new.history[..6]);
    }
}

#[test]
fn test_repeated_compute_keeps_friction_results() {
    let (bridge, mut solver) = sample();
    let mut engine = TimeStepLossEngine::new(LossConfig::default()).unwrap();
    let mut services = AnalysisServices::new(&bridge, &mut solver);
    let girder = GirderKey::new(0, 0);

    let first = engine.compute(&mut services, girder, 9).unwrap().clone();
    let second = engine.compute(&mut services, girder, 9).unwrap();
    assert_eq!(second.stage, LineStage::ComputedThrough(9));
    assert_eq!(*second, first);
    for (a, b) in first.girders.iter().zip(second.girders.iter()) {
        assert_eq!(a.anchor_sets, b.anchor_sets);
        assert_eq!(a.tendons, b.tendons);
        for (ra, rb) in a.records.iter().zip(b.records.iter()) {
            assert_eq!(ra.friction, rb.friction);
        }
    }

    // friction queries answer from the stored pass
    let before = engine.anchor_set(&mut services, girder, 0).unwrap();
    let elongation = engine.elongation(&mut services, girder, 0, MemberEnd::Start).unwrap();
    assert_eq!(engine.anchor_set(&mut services, girder, 0).unwrap(), before);
    assert_eq!(engine.elongation(&mut services, girder, 0, MemberEnd::Start).unwrap(), elongation);
    assert_eq!(engine.history(0).unwrap().stage, LineStage::ComputedThrough(9));
}

#[test]
fn test_imposed_deformations_are_submitted_once() {
    let (bridge, mut solver) = sample();
    let mut engine = TimeStepLossEngine::new(LossConfig::default()).unwrap();
    let shared = GirderKey::new(1, 2);
    let interval = 5;
    let creep_on_shared = |solver: &SimpleSpanSolver| {
        solver
            .initial_strains("Creep")
            .iter()
            .filter(|load| load.interval == interval && load.start.girder == shared)
            .count()
    };

    // group 2 girder C belongs to lines 3 and 4
    engine
        .compute(&mut AnalysisServices::new(&bridge, &mut solver), GirderKey::new(0, 2), interval)
        .unwrap();
    let once = creep_on_shared(&solver);
    assert_eq!(once, bridge.points_of_interest(shared).len() - 1);

    engine
        .compute(&mut AnalysisServices::new(&bridge, &mut solver), GirderKey::new(0, 3), interval)
        .unwrap();
    assert_eq!(creep_on_shared(&solver), once);

    engine.clear();
    engine
        .compute(&mut AnalysisServices::new(&bridge, &mut solver), shared, interval)
        .unwrap();
    assert_eq!(creep_on_shared(&solver), once);
}

#[test]
fn test_girder_line_is_computed_in_lock_step() {
    let (bridge, mut solver) = sample();
    let mut engine = TimeStepLossEngine::new(LossConfig::default()).unwrap();
    let mut services = AnalysisServices::new(&bridge, &mut solver);

    // group 2 has three girders, so the fourth line uses its last girder
    assert_eq!(
        line_girders(&bridge, 3),
        vec![GirderKey::new(0, 3), GirderKey::new(1, 2)]
    );

    let poi = midspan(&bridge, GirderKey::new(0, 3));
    engine.losses(&mut services, &poi, 7).unwrap();

    let line = engine.history(3).unwrap();
    assert_eq!(line.girders.len(), 2);
    assert!(line.records().all(|record| record.history.len() == 8));
    assert!(engine.history(0).is_none());
}

#[test]
fn test_strict_equilibrium_holds_through_design_life() {
    let (bridge, mut solver) = sample();
    let mut config = LossConfig::default();
    config.equilibrium.policy = EquilibriumPolicy::Strict;
    let mut engine = TimeStepLossEngine::new(config).unwrap();
    let mut services = AnalysisServices::new(&bridge, &mut solver);

    let last = bridge.interval_count() - 1;
    let line = engine.compute(&mut services, GirderKey::new(0, 0), last).unwrap();
    for record in line.records() {
        assert_eq!(record.history.len(), last + 1);
        assert!(record.history.iter().all(|state| state.equilibrium.satisfied));
    }
}

#[test]
fn test_effective_prestress_over_time() {
    let (bridge, mut solver) = sample();
    let mut engine = TimeStepLossEngine::new(LossConfig::default()).unwrap();
    let mut services = AnalysisServices::new(&bridge, &mut solver);
    let girder = GirderKey::new(0, 1);
    let poi = midspan(&bridge, girder);
    let release = 2;
    let last = bridge.interval_count() - 1;

    let at_release = engine
        .effective_prestress(&mut services, &poi, release, StrandType::Straight)
        .unwrap();
    let at_end = engine
        .effective_prestress(&mut services, &poi, last, StrandType::Straight)
        .unwrap();
    assert!(at_release < 1395.0);
    assert!(at_end < at_release);
    assert!(0.0 < at_end);

    // no temporary strands in the sample
    let temporary = engine
        .effective_prestress(&mut services, &poi, last, StrandType::Temporary)
        .unwrap();
    assert_eq!(temporary, 0.0);
}

#[test]
fn test_tendon_stress_starts_when_stressed() {
    let (bridge, mut solver) = sample();
    let mut engine = TimeStepLossEngine::new(LossConfig::default()).unwrap();
    let mut services = AnalysisServices::new(&bridge, &mut solver);
    let girder = GirderKey::new(0, 0);
    let poi = midspan(&bridge, girder);
    let stressed = bridge.stress_tendon_interval(girder, 0);

    let before = engine.tendon_stress(&mut services, &poi, stressed - 1, 0).unwrap();
    let after = engine.tendon_stress(&mut services, &poi, stressed, 0).unwrap();
    assert_eq!(before, 0.0);
    assert!(0.0 < after && after < 1395.0);
}

#[test]
fn test_nearest_poi_stands_in() {
    let (bridge, mut solver) = sample();
    let mut engine = TimeStepLossEngine::new(LossConfig::default()).unwrap();
    let mut services = AnalysisServices::new(&bridge, &mut solver);
    let girder = GirderKey::new(0, 0);
    let pois = bridge.points_of_interest(girder);
    let first = pois[1];
    let second = pois[2];

    let mut near = first;
    near.dist_from_start += 1.0;
    let losses = engine.losses(&mut services, &near, 2).unwrap();
    assert!(losses.approximate);
    assert_relative_eq!(losses.poi.dist_from_start, first.dist_from_start);

    // halfway goes to the later POI
    let mut halfway = first;
    halfway.dist_from_start = 0.5 * (first.dist_from_start + second.dist_from_start);
    let losses = engine.losses(&mut services, &halfway, 2).unwrap();
    assert_relative_eq!(losses.poi.dist_from_start, second.dist_from_start);

    let exact = engine.losses(&mut services, &second, 2).unwrap();
    assert!(!exact.approximate);
}

#[test]
fn test_tendon_friction_and_anchor_set() {
    let (bridge, mut solver) = sample();
    let mut engine = TimeStepLossEngine::new(LossConfig::default()).unwrap();
    let mut services = AnalysisServices::new(&bridge, &mut solver);
    let girder = GirderKey::new(1, 0);

    let anchor_set = engine.anchor_set(&mut services, girder, 0).unwrap();
    assert!(0.0 < anchor_set.lset[0]);
    assert_eq!(anchor_set.lset[1], 0.0);
    assert!(anchor_set.lset[0] <= bridge.girder_length(girder));

    let start = engine.elongation(&mut services, girder, 0, MemberEnd::Start).unwrap();
    let end = engine.elongation(&mut services, girder, 0, MemberEnd::End).unwrap();
    assert!(0.0 < start);
    assert_eq!(end, 0.0);

    let friction = engine.average_friction_loss(&mut services, girder, 0).unwrap();
    let set = engine.average_anchor_set_loss(&mut services, girder, 0).unwrap();
    assert!(0.0 < friction);
    assert!(0.0 < set);

    // friction does not advance the time-step analysis
    assert_eq!(engine.history(0).unwrap().stage, LineStage::FrictionAndAnchorSetComputed);
    assert!(engine.anchor_set(&mut services, girder, 1).is_err());
}

#[test]
fn test_query_errors() {
    let (bridge, mut solver) = sample();
    let mut engine = TimeStepLossEngine::new(LossConfig::default()).unwrap();
    let mut services = AnalysisServices::new(&bridge, &mut solver);

    let count = bridge.interval_count();
    let poi = midspan(&bridge, GirderKey::new(0, 0));
    let err = engine.losses(&mut services, &poi, count).unwrap_err();
    assert_eq!(err.error_code(), "INTERVAL_OUT_OF_RANGE");

    let err = engine.compute(&mut services, GirderKey::new(1, 3), 0).unwrap_err();
    assert_eq!(err.error_code(), "GIRDER_NOT_FOUND");
    assert!(engine.history(3).is_none());
}

#[derive(Default)]
struct Recorder {
    messages: RefCell<Vec<String>>,
    open: RefCell<i32>,
}

impl ProgressSink for Recorder {
    fn begin(&self, message: &str) {
        *self.open.borrow_mut() += 1;
        self.messages.borrow_mut().push(message.to_string());
    }

    fn update(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }

    fn end(&self) {
        *self.open.borrow_mut() -= 1;
    }
}

#[test]
fn test_progress_is_reported_per_interval() {
    let (bridge, mut solver) = sample();
    let mut engine = TimeStepLossEngine::new(LossConfig::default()).unwrap();
    let recorder = Recorder::default();
    let mut services = AnalysisServices::new(&bridge, &mut solver).with_progress(&recorder);

    engine.compute(&mut services, GirderKey::new(0, 0), 3).unwrap();
    let messages = recorder.messages.borrow();
    assert_eq!(messages.len(), 5);
    assert!(messages[0].contains("girder line 1"));
    assert_eq!(*recorder.open.borrow(), 0);
}

#[test]
fn test_clear_drops_results() {
    let (bridge, mut solver) = sample();
    let mut engine = TimeStepLossEngine::new(LossConfig::default()).unwrap();
    let mut services = AnalysisServices::new(&bridge, &mut solver);

    engine.compute(&mut services, GirderKey::new(0, 0), 4).unwrap();
    assert!(engine.history(0).is_some());
    engine.clear();
    assert!(engine.history(0).is_none());

    let line = engine.compute(&mut services, GirderKey::new(0, 0), 2).unwrap();
    assert_eq!(line.intervals_analyzed(), 3);
}

#[test]
fn test_user_load_raises_strand_stress() {
    let railing = 14;
    let fpe_at_railing = |description: BridgeDescription| {
        let bridge = ReferenceBridge::new(description).unwrap();
        let mut solver = SimpleSpanSolver::for_bridge(&bridge);
        let mut engine = TimeStepLossEngine::new(LossConfig::default()).unwrap();
        let mut services = AnalysisServices::new(&bridge, &mut solver);
        let poi = midspan(&bridge, GirderKey::new(0, 0));
        engine
            .effective_prestress(&mut services, &poi, railing, StrandType::Straight)
            .unwrap()
    };

    let mut loaded = BridgeDescription::sample();
    loaded.user_loads.push(UserLoad {
        kind: UserLoadKind::Dw,
        group: 0,
        activity: Activity::InstallRailing,
        load: SpanLoad::point(200_000.0, 15_000.0),
    });

    // sagging moment stretches the bottom strands
    assert!(fpe_at_railing(BridgeDescription::sample()) < fpe_at_railing(loaded));
}
