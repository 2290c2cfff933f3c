//! # Time-Step Records
//!
//! The history built by the engine. Each POI owns a dense, append-only
//! `Vec<TimeStepState>` indexed by interval; every POI of a girder line grows
//! in lock-step.
//!
//! ```text
//! GirderLineHistory
//! ├── stage: LineStage
//! └── girders: Vec<GirderHistory>          (one per group)
//!     ├── anchor_sets: Vec<AnchorSetResult>
//!     ├── tendons: Vec<TendonSummary>
//!     └── records: Vec<PerPoiRecord>       (ordered by position)
//!         ├── friction: Vec<FrictionLoss>  (per duct)
//!         └── history: Vec<TimeStepState>  (per interval)
//! ```

use serde::{Deserialize, Serialize};

use crate::bridge::{NetSection, StrandType, TransformedSection};
use crate::intervals::Interval;
use crate::loads::{LoadLedger, Mechanism};
use crate::poi::{GirderKey, IntervalIndex, MemberEnd, PointOfInterest};
use crate::solver::{MomentEnvelope, SectionForce};

/// Friction and anchor-set loss of one duct at a POI
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrictionLoss {
    /// Distance from the start of the girder
    pub x: f64,
    /// Distance from the stressing end
    pub x_from_jacking: f64,
    /// Angular change from the stressing end
    pub alpha: f64,
    /// Friction loss Δf_pF
    pub dfp_f: f64,
    /// Anchor-set loss Δf_pA
    pub dfp_a: f64,
}

impl FrictionLoss {
    pub fn total(&self) -> f64 {
        self.dfp_f + self.dfp_a
    }
}

/// Anchor-set solution of a duct, indexed by [`MemberEnd::index`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnchorSetResult {
    /// Length of the anchor-set zone
    pub lset: [f64; 2],
    /// Anchor-set loss at the anchorage
    pub dfp_at: [f64; 2],
    /// Anchor-set loss at the end of the zone
    pub dfp_s: [f64; 2],
    /// False-position iterations used
    pub iterations: [usize; 2],
    /// Location of zero strand slip (minimum tendon stress)
    pub zero_slip: f64,
}

impl AnchorSetResult {
    pub fn zone_length(&self, end: MemberEnd) -> f64 {
        self.lset[end.index()]
    }
}

/// Per-tendon values computed once with friction and anchor set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TendonSummary {
    /// Elongation at each end
    pub elongation: [f64; 2],
    /// Average friction loss over the POIs on the girder
    pub average_friction: f64,
    /// Average anchor-set loss over the POIs on the girder
    pub average_anchor_set: f64,
}

/// Force, moment, strain and curvature of a component by load type.
///
/// `d_*` fields are increments in the interval, the others are running sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentLedger {
    pub d_p: LoadLedger,
    pub p: LoadLedger,
    pub d_m: LoadLedger,
    pub m: LoadLedger,
    pub d_strain: LoadLedger,
    pub strain: LoadLedger,
    pub d_curvature: LoadLedger,
    pub curvature: LoadLedger,
}

impl ComponentLedger {
    /// Set the running sums from the previous interval plus the increments
    pub fn accumulate(&mut self, previous: Option<&ComponentLedger>) {
        let previous = previous.copied().unwrap_or_default();
        self.p = previous.p.plus(&self.d_p);
        self.m = previous.m.plus(&self.d_m);
        self.strain = previous.strain.plus(&self.d_strain);
        self.curvature = previous.curvature.plus(&self.d_curvature);
    }
}

/// Top and bottom fiber stresses by load type
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FiberStresses {
    pub d_top: LoadLedger,
    pub top: LoadLedger,
    pub d_bottom: LoadLedger,
    pub bottom: LoadLedger,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StressEnvelope {
    pub min: f64,
    pub max: f64,
}

impl StressEnvelope {
    /// Envelope of two stresses, ordered
    pub fn between(a: f64, b: f64) -> Self {
        StressEnvelope {
            min: a.min(b),
            max: a.max(b),
        }
    }
}

/// Creep caused in the current interval by the loads of an earlier one
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CreepTerm {
    pub loading_interval: IntervalIndex,
    /// Total force increment of the earlier interval
    pub d_p: f64,
    pub d_m: f64,
    /// Modulus, area and inertia in the earlier interval
    pub modulus: f64,
    pub area: f64,
    pub inertia: f64,
    /// Creep coefficient at the start and end of the current interval
    pub cs: f64,
    pub ce: f64,
    pub strain: f64,
    pub curvature: f64,
}

/// Restraining forces of a concrete component
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConcreteRestraint {
    pub creep_force: f64,
    pub creep_moment: f64,
    pub shrinkage_force: f64,
}

/// Girder or deck concrete in one interval
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConcreteState {
    pub section: NetSection,
    pub modulus: f64,
    pub age_adjusted_modulus: f64,
    pub creep_terms: Vec<CreepTerm>,
    /// Unrestrained creep strain and curvature in the interval
    pub creep_strain: f64,
    pub creep_curvature: f64,
    /// Unrestrained shrinkage strain in the interval
    pub shrinkage_strain: f64,
    pub restraint: ConcreteRestraint,
    pub forces: ComponentLedger,
    pub stresses: FiberStresses,
    pub live_load_top: StressEnvelope,
    pub live_load_bottom: StressEnvelope,
}

/// A row or mat of mild reinforcement in one interval
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RebarState {
    pub area: f64,
    pub elevation: f64,
    pub modulus: f64,
    pub forces: ComponentLedger,
}

/// Effective prestress with live load
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PrestressLiveLoad {
    pub fpe_min: f64,
    pub fpe_max: f64,
    pub loss_min: f64,
    pub loss_max: f64,
}

/// A strand element or tendon in one interval
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PrestressState {
    pub area: f64,
    pub elevation: f64,
    pub modulus: f64,
    /// Time since stressing at the end of the interval
    pub age: f64,
    /// Jacking force and stress (net of friction and anchor set for tendons)
    pub pj: f64,
    pub fpj: f64,
    /// Intrinsic relaxation in the interval
    pub relaxation: f64,
    pub relaxation_strain: f64,
    pub relaxation_force: f64,
    pub forces: ComponentLedger,
    /// Effective stress and loss at the end of the interval
    pub fpe: f64,
    pub loss: f64,
    pub live_load: PrestressLiveLoad,
}

impl PrestressState {
    /// Effective force at the end of the interval
    pub fn force(&self) -> f64 {
        self.fpe * self.area
    }
}

/// Section restraining forces by mechanism, indexed by [`Mechanism::index`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RestraintTotals {
    pub force: [f64; 3],
    pub moment: [f64; 3],
}

impl RestraintTotals {
    pub fn get(&self, mechanism: Mechanism) -> SectionForce {
        SectionForce::new(self.force[mechanism.index()], self.moment[mechanism.index()])
    }
}

/// Internal vs external totals for one interval
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumCheck {
    pub d_p_external: f64,
    pub d_p_internal: f64,
    pub d_m_external: f64,
    pub d_m_internal: f64,
    pub p_external: f64,
    pub p_internal: f64,
    pub m_external: f64,
    pub m_internal: f64,
    pub satisfied: bool,
}

/// Everything known about one POI in one interval
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeStepState {
    pub interval: IntervalIndex,
    pub time: Interval,
    /// Composite section transformed to the girder's age-adjusted modulus
    pub transformed: TransformedSection,
    pub reference_modulus: f64,
    pub girder: ConcreteState,
    pub deck: ConcreteState,
    /// Top and bottom mats
    pub deck_rebar: [RebarState; 2],
    pub girder_rebar: Vec<RebarState>,
    /// Strand elements by [`StrandType::index`]
    pub strands: [Vec<PrestressState>; 3],
    pub tendons: Vec<PrestressState>,
    pub restraint: RestraintTotals,
    /// Structure response to the imposed deformations, by mechanism
    pub initial_strain_response: [SectionForce; 3],
    /// Section forces and deformations by load type
    pub section: ComponentLedger,
    pub live_load: MomentEnvelope,
    pub equilibrium: EquilibriumCheck,
}

impl TimeStepState {
    pub fn strands_of(&self, strand_type: StrandType) -> &[PrestressState] {
        &self.strands[strand_type.index()]
    }

    /// Area-weighted effective stress of a strand type
    pub fn strand_effective_stress(&self, strand_type: StrandType) -> f64 {
        let strands = self.strands_of(strand_type);
        let area: f64 = strands.iter().map(|s| s.area).sum();
        let force: f64 = strands.iter().map(|s| s.force()).sum();
        if area == 0.0 {
            0.0
        } else {
            force / area
        }
    }

    /// Area-weighted loss of a strand type
    pub fn strand_loss(&self, strand_type: StrandType) -> f64 {
        let strands = self.strands_of(strand_type);
        let area: f64 = strands.iter().map(|s| s.area).sum();
        let loss: f64 = strands.iter().map(|s| s.loss * s.area).sum();
        if area == 0.0 {
            0.0
        } else {
            loss / area
        }
    }
}

/// Friction details and the interval history of one POI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerPoiRecord {
    pub poi: PointOfInterest,
    /// One entry per duct
    pub friction: Vec<FrictionLoss>,
    /// One entry per analyzed interval
    pub history: Vec<TimeStepState>,
}

impl PerPoiRecord {
    pub fn new(poi: PointOfInterest) -> Self {
        PerPoiRecord {
            poi,
            friction: Vec::new(),
            history: Vec::new(),
        }
    }
}

/// One girder of a girder line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GirderHistory {
    pub girder: GirderKey,
    pub records: Vec<PerPoiRecord>,
    pub anchor_sets: Vec<AnchorSetResult>,
    pub tendons: Vec<TendonSummary>,
}

impl GirderHistory {
    /// Record at a POI, exact match or the nearer neighbor
    pub fn record_near(&self, poi: &PointOfInterest) -> Option<(&PerPoiRecord, bool)> {
        if self.records.is_empty() {
            return None;
        }
        if let Some(record) = self.records.iter().find(|r| r.poi.is_at(poi)) {
            return Some((record, false));
        }
        let x = poi.dist_from_start;
        let after = self.records.partition_point(|r| r.poi.dist_from_start < x);
        if after == 0 {
            return Some((&self.records[0], true));
        }
        if after == self.records.len() {
            return Some((&self.records[after - 1], true));
        }
        let before = &self.records[after - 1];
        let next = &self.records[after];
        if x - before.poi.dist_from_start < next.poi.dist_from_start - x {
            Some((before, true))
        } else {
            Some((next, true))
        }
    }
}

/// Analysis state of a girder line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStage {
    Uninitialized,
    FrictionAndAnchorSetComputed,
    /// Section losses computed for intervals `0..=k`
    ComputedThrough(IntervalIndex),
}

/// Every girder sharing a relative girder index, analyzed together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GirderLineHistory {
    pub line: usize,
    pub stage: LineStage,
    pub girders: Vec<GirderHistory>,
}

impl GirderLineHistory {
    pub fn new(line: usize) -> Self {
        GirderLineHistory {
            line,
            stage: LineStage::Uninitialized,
            girders: Vec::new(),
        }
    }

    /// Number of intervals analyzed so far
    pub fn intervals_analyzed(&self) -> usize {
        match self.stage {
            LineStage::ComputedThrough(k) => k + 1,
            _ => 0,
        }
    }

    pub fn girder(&self, girder: GirderKey) -> Option<&GirderHistory> {
        self.girders.iter().find(|g| g.girder == girder)
    }

    pub fn records(&self) -> impl Iterator<Item = &PerPoiRecord> {
        self.girders.iter().flat_map(|g| g.records.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::ProductForce;
    use crate::poi::PoiAttributes;

    fn girder_with_pois(positions: &[f64]) -> GirderHistory {
        let key = GirderKey::new(0, 0);
        GirderHistory {
            girder: key,
            records: positions
                .iter()
                .map(|x| {
                    PerPoiRecord::new(PointOfInterest::new(key, 0, *x, PoiAttributes::ON_SEGMENT))
                })
                .collect(),
            anchor_sets: Vec::new(),
            tendons: Vec::new(),
        }
    }

    fn query(x: f64) -> PointOfInterest {
        PointOfInterest::new(GirderKey::new(0, 0), 0, x, PoiAttributes::CRITICAL_SECTION)
    }

    #[test]
    fn test_nearest_poi_approximation() {
        let girder = girder_with_pois(&[0.0, 10.0, 20.0, 30.0]);

        let (record, approximate) = girder.record_near(&query(13.0)).unwrap();
        assert_eq!(record.poi.dist_from_start, 10.0);
        assert!(approximate);

        let (record, _) = girder.record_near(&query(17.0)).unwrap();
        assert_eq!(record.poi.dist_from_start, 20.0);

        let (record, approximate) = girder.record_near(&query(20.0)).unwrap();
        assert_eq!(record.poi.dist_from_start, 20.0);
        assert!(!approximate);
    }

    #[test]
    fn test_nearest_poi_outside_range() {
        let girder = girder_with_pois(&[0.0, 10.0]);
        let (record, _) = girder.record_near(&query(-1.0)).unwrap();
        assert_eq!(record.poi.dist_from_start, 0.0);
        let (record, _) = girder.record_near(&query(50.0)).unwrap();
        assert_eq!(record.poi.dist_from_start, 10.0);
    }

    #[test]
    fn test_ledger_accumulation() {
        let mut previous = ComponentLedger::default();
        previous.d_p.set(ProductForce::Deck, 5.0);
        previous.accumulate(None);

        let mut current = ComponentLedger::default();
        current.d_p.set(ProductForce::Deck, 2.0);
        current.d_p.set(ProductForce::Creep, -1.0);
        current.accumulate(Some(&previous));

        assert_eq!(current.p[ProductForce::Deck], 7.0);
        assert_eq!(current.p[ProductForce::Creep], -1.0);
    }

    #[test]
    fn test_stress_envelope_orders_values() {
        let envelope = StressEnvelope::between(3.0, -2.0);
        assert_eq!(envelope.min, -2.0);
        assert_eq!(envelope.max, 3.0);
    }

    #[test]
    fn test_stage_counts_intervals() {
        let mut line = GirderLineHistory::new(0);
        assert_eq!(line.intervals_analyzed(), 0);
        line.stage = LineStage::ComputedThrough(4);
        assert_eq!(line.intervals_analyzed(), 5);
    }
}
