//! Time-step state initialization
//!
//! Builds the record of one POI for a new interval: section properties,
//! moduli, the unrestrained creep and shrinkage deformations of the concrete,
//! strand and tendon relaxation, and the forces needed to restrain them.
//! Prestress transferred in the interval (release, tendon stressing) is
//! booked here as an external section force.

use crate::bridge::{DuctData, NetSection, StrandType};
use crate::intervals::IntervalTime;
use crate::loads::{Mechanism, ProductForce};
use crate::losses::classifier::StrandInventory;
use crate::losses::friction::is_on_girder;
use crate::losses::mechanics::{moment_about_centroid, safe_ratio};
use crate::losses::strands::{jacking_shares, StrandDiscretization};
use crate::materials::{ConcreteElement, PrestressElement, RebarElement};
use crate::poi::{GirderKey, IntervalIndex, PointOfInterest};
use crate::services::BridgeModel;

use super::details::{
    ConcreteRestraint, ConcreteState, CreepTerm, FrictionLoss, PerPoiRecord, PrestressState,
    RebarState, RestraintTotals, TimeStepState,
};

/// Girder-wide data shared by every POI while stepping through intervals
pub struct GirderContext<'a> {
    pub model: &'a dyn BridgeModel,
    pub girder: GirderKey,
    pub girder_length: f64,
    pub ducts: Vec<DuctData>,
    /// Stressing interval of each duct
    pub tendon_stressing: Vec<IntervalIndex>,
    pub strands: &'a dyn StrandDiscretization,
}

impl<'a> GirderContext<'a> {
    pub fn new(
        model: &'a dyn BridgeModel,
        girder: GirderKey,
        strands: &'a dyn StrandDiscretization,
    ) -> Self {
        let duct_count = model.duct_count(girder);
        GirderContext {
            model,
            girder,
            girder_length: model.girder_length(girder),
            ducts: (0..duct_count).map(|duct| model.duct(girder, duct)).collect(),
            tendon_stressing: (0..duct_count)
                .map(|duct| model.stress_tendon_interval(girder, duct))
                .collect(),
            strands,
        }
    }

    pub fn girder_concrete(&self, poi: &PointOfInterest) -> ConcreteElement {
        if poi.is_in_closure() {
            ConcreteElement::Closure(poi.segment_key())
        } else {
            ConcreteElement::Segment(poi.segment_key())
        }
    }

    /// A closure joint that cannot carry load yet
    pub fn is_closure_inactive(&self, poi: &PointOfInterest, interval: IntervalIndex) -> bool {
        poi.is_in_closure()
            && self
                .model
                .composite_closure_interval(poi.segment_key())
                .map_or(true, |composite| interval < composite)
    }

    /// True once the girder concrete at the POI carries load
    pub fn is_girder_active(&self, poi: &PointOfInterest, interval: IntervalIndex) -> bool {
        if poi.is_in_closure() {
            !self.is_closure_inactive(poi, interval)
        } else {
            self.model.release_interval(poi.segment_key()) <= interval
        }
    }

    pub fn is_deck_active(&self, interval: IntervalIndex) -> bool {
        self.model
            .composite_deck_interval()
            .map_or(false, |composite| composite <= interval)
    }

    /// True when the tendon is bonded and shares in section deformations
    pub fn is_tendon_bonded(&self, duct: usize, interval: IntervalIndex) -> bool {
        self.tendon_stressing
            .get(duct)
            .map_or(false, |stressed| *stressed < interval)
    }
}

/// Build the state of `record` for `interval`.
///
/// The history of the record must already hold every earlier interval.
pub fn initialize_state(
    ctx: &GirderContext<'_>,
    inventory: &StrandInventory,
    record: &PerPoiRecord,
    interval: IntervalIndex,
) -> TimeStepState {
    let model = ctx.model;
    let poi = &record.poi;
    let segment = poi.segment_key();
    let history = &record.history;
    let time = model.interval(interval);
    let girder_concrete = ctx.girder_concrete(poi);

    let mut state = TimeStepState {
        interval,
        time,
        transformed: model.transformed_section(interval, poi),
        reference_modulus: model.age_adjusted_modulus(girder_concrete, interval),
        ..TimeStepState::default()
    };
    let girder_active = ctx.is_girder_active(poi, interval);
    let deck_active = ctx.is_deck_active(interval);

    let girder_section = if girder_active {
        model.net_girder_section(interval, poi)
    } else {
        NetSection::default()
    };
    state.girder = concrete_state(
        ctx,
        girder_concrete,
        girder_section,
        history,
        interval,
        time.duration(),
        |s| &s.girder,
    );

    let deck_section = if deck_active {
        model.net_deck_section(interval, poi)
    } else {
        NetSection::default()
    };
    state.deck = concrete_state(
        ctx,
        ConcreteElement::Deck,
        deck_section,
        history,
        interval,
        time.duration(),
        |s| &s.deck,
    );

    // mild reinforcement
    let rebar = if poi.is_in_closure() {
        RebarElement::Closure(segment)
    } else {
        RebarElement::Segment(segment)
    };
    let girder_rebar_modulus = model.rebar_modulus(rebar);
    state.girder_rebar = model
        .girder_rebar(poi)
        .into_iter()
        .map(|layer| RebarState {
            area: if girder_active { layer.area } else { 0.0 },
            elevation: layer.elevation,
            modulus: girder_rebar_modulus,
            ..RebarState::default()
        })
        .collect();

    let mats = model.deck_rebar(poi);
    let deck_rebar_modulus = model.rebar_modulus(RebarElement::Deck);
    for (slot, layer) in state.deck_rebar.iter_mut().zip([mats.top, mats.bottom]) {
        *slot = RebarState {
            area: if deck_active { layer.area } else { 0.0 },
            elevation: layer.elevation,
            modulus: deck_rebar_modulus,
            ..RebarState::default()
        };
    }

    if !poi.is_in_closure() {
        initialize_strands(ctx, inventory, record, &mut state);
    }
    initialize_tendons(ctx, inventory, record, &mut state);

    if model.release_interval(segment) <= interval {
        state.restraint = restraint_totals(&state);
    }
    state
}

fn concrete_state(
    ctx: &GirderContext<'_>,
    element: ConcreteElement,
    section: NetSection,
    history: &[TimeStepState],
    interval: IntervalIndex,
    duration: f64,
    select: fn(&TimeStepState) -> &ConcreteState,
) -> ConcreteState {
    let model = ctx.model;
    let modulus = model.concrete_modulus(element, interval);
    let mut concrete = ConcreteState {
        section,
        modulus,
        age_adjusted_modulus: model.age_adjusted_modulus(element, interval),
        ..ConcreteState::default()
    };
    if section.area == 0.0 || duration == 0.0 {
        return concrete;
    }

    // creep due to the force increments of every earlier interval
    for earlier in history.iter().filter(|s| s.interval < interval) {
        let loaded = select(earlier);
        if loaded.section.area == 0.0 {
            continue;
        }
        let d_p = loaded.forces.d_p.total();
        let d_m = loaded.forces.d_m.total();
        let cs = model.creep_coefficient(element, earlier.interval, interval, IntervalTime::Start);
        let ce = model.creep_coefficient(element, earlier.interval, interval, IntervalTime::End);
        concrete.creep_terms.push(CreepTerm {
            loading_interval: earlier.interval,
            d_p,
            d_m,
            modulus: loaded.modulus,
            area: loaded.section.area,
            inertia: loaded.section.inertia,
            cs,
            ce,
            strain: safe_ratio((ce - cs) * d_p, loaded.modulus * loaded.section.area),
            curvature: safe_ratio((ce - cs) * d_m, loaded.modulus * loaded.section.inertia),
        });
    }
    concrete.creep_strain = concrete.creep_terms.iter().map(|t| t.strain).sum();
    concrete.creep_curvature = concrete.creep_terms.iter().map(|t| t.curvature).sum();
    concrete.shrinkage_strain = model.shrinkage_strain(element, interval);

    concrete.restraint = ConcreteRestraint {
        creep_force: -concrete.creep_strain * section.area * modulus,
        creep_moment: -concrete.creep_curvature * section.inertia * modulus,
        shrinkage_force: -concrete.shrinkage_strain * section.area * modulus,
    };
    concrete
}

fn initialize_strands(
    ctx: &GirderContext<'_>,
    inventory: &StrandInventory,
    record: &PerPoiRecord,
    state: &mut TimeStepState,
) {
    let model = ctx.model;
    let poi = &record.poi;
    let segment = poi.segment_key();
    let interval = state.interval;
    let previous = record.history.last();
    let stressed_at = model.stress_strand_interval(segment);
    let released_at = model.release_interval(segment);
    let t_stressing = model.interval(stressed_at).start;
    let age = (state.time.end - t_stressing).max(0.0);
    let ytr = state.transformed.centroid;

    for strand_type in StrandType::ALL {
        if !inventory.has_strands(strand_type) {
            continue;
        }
        let elements = ctx.strands.discretize(model.strand_elements(poi, strand_type));
        let shares = jacking_shares(&elements, model.strand_jacking_force(segment, strand_type));
        let steel = PrestressElement::Strand(segment, strand_type);
        let modulus = model.prestress_modulus(steel);

        let mut strands = Vec::with_capacity(elements.len());
        for (j, (element, pj)) in elements.iter().zip(shares).enumerate() {
            if interval < stressed_at {
                strands.push(PrestressState::default());
                continue;
            }
            let fpj = safe_ratio(pj, element.area);
            let before = previous
                .and_then(|p| p.strands_of(strand_type).get(j))
                .filter(|s| s.area > 0.0);
            let relaxation = match before {
                Some(before) => model.relaxation(steel, before.fpe, before.age, age),
                None => model.relaxation(steel, fpj, 0.0, age),
            };

            if interval == released_at {
                let fpe = before.map_or(fpj, |b| b.fpe);
                let force = -element.area * fpe;
                state.section.d_p.add(ProductForce::Pretension, force);
                state
                    .section
                    .d_m
                    .add(ProductForce::Pretension, force * (ytr - element.elevation));
            }

            strands.push(PrestressState {
                area: element.area,
                elevation: element.elevation,
                modulus,
                age,
                pj,
                fpj,
                relaxation,
                relaxation_strain: safe_ratio(relaxation, modulus),
                relaxation_force: -relaxation * element.area,
                ..PrestressState::default()
            });
        }
        state.strands[strand_type.index()] = strands;
    }
}

fn initialize_tendons(
    ctx: &GirderContext<'_>,
    inventory: &StrandInventory,
    record: &PerPoiRecord,
    state: &mut TimeStepState,
) {
    let model = ctx.model;
    let poi = &record.poi;
    let interval = state.interval;
    let previous = record.history.last();
    let ytr = state.transformed.centroid;

    for (duct_index, duct) in ctx.ducts.iter().enumerate() {
        let stressed_at = ctx.tendon_stressing[duct_index];
        if interval < stressed_at
            || !inventory.has_tendon(duct_index)
            || !is_on_girder(poi, ctx.girder_length)
        {
            state.tendons.push(PrestressState::default());
            continue;
        }
        let steel = PrestressElement::Tendon(ctx.girder, duct_index);
        let modulus = model.prestress_modulus(steel);
        let area = duct.tendon_area();
        let elevation = model.tendon_elevation(poi, duct_index);
        let friction = record.friction.get(duct_index).map_or(0.0, FrictionLoss::total);
        let pj = duct.jacking_force() - area * friction;
        let fpj = safe_ratio(pj, area);
        let age = (state.time.end - model.interval(stressed_at).start).max(0.0);

        let relaxation = if interval == stressed_at {
            let force = -area * fpj;
            state.section.d_p.add(ProductForce::PostTensioning, force);
            state
                .section
                .d_m
                .add(ProductForce::PostTensioning, force * (ytr - elevation));
            model.relaxation(steel, fpj, 0.0, age)
        } else {
            let before = previous
                .and_then(|p| p.tendons.get(duct_index))
                .copied()
                .unwrap_or_default();
            model.relaxation(steel, before.fpe, before.age, age)
        };

        state.tendons.push(PrestressState {
            area,
            elevation,
            modulus,
            age,
            pj,
            fpj,
            relaxation,
            relaxation_strain: safe_ratio(relaxation, modulus),
            relaxation_force: -relaxation * area,
            ..PrestressState::default()
        });
    }
}

/// Section restraining forces about the transformed centroid
pub fn restraint_totals(state: &TimeStepState) -> RestraintTotals {
    let ytr = state.transformed.centroid;
    let mut totals = RestraintTotals::default();
    let creep = Mechanism::Creep.index();
    let shrinkage = Mechanism::Shrinkage.index();
    let relaxation = Mechanism::Relaxation.index();

    for concrete in [&state.girder, &state.deck] {
        let r = concrete.restraint;
        let centroid = concrete.section.centroid;
        totals.force[creep] += r.creep_force;
        totals.moment[creep] += moment_about_centroid(r.creep_force, r.creep_moment, ytr, centroid);
        totals.force[shrinkage] += r.shrinkage_force;
        totals.moment[shrinkage] += moment_about_centroid(r.shrinkage_force, 0.0, ytr, centroid);
    }
    for steel in state.strands.iter().flatten().chain(state.tendons.iter()) {
        totals.force[relaxation] += steel.relaxation_force;
        totals.moment[relaxation] +=
            moment_about_centroid(steel.relaxation_force, 0.0, ytr, steel.elevation);
    }
    totals
}
