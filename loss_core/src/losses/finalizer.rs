//! Time-step finalization
//!
//! Collects the section force increments of an interval, spreads each one
//! over the components of the transformed section, updates prestress and
//! fiber stresses, and checks that the components balance the section.
//!
//! For a section increment `(ΔP, ΔM)` about the transformed centroid:
//!
//! ```text
//! Δε(y) = ΔP/(E·A_tr) + ΔM·(Y_tr − y)/(E·I_tr)
//! Δκ    = ΔM/(E·I_tr)
//! ΔP_c  = Δε(Y_c)·E_c·A_c        ΔM_c = Δκ·E_c·I_c
//! ```
//!
//! Creep, shrinkage and relaxation components additionally carry their own
//! restraining force.

use crate::errors::{LossError, LossResult};
use crate::loads::{applicable_loads, Mechanism, ProductForce};
use crate::losses::config::{EquilibriumPolicy, EquilibriumSettings};
use crate::losses::initializer::GirderContext;
use crate::losses::mechanics::{
    fiber_stress, moment_about_centroid, safe_ratio, ComponentStiffness, Deformation,
};
use crate::poi::IntervalIndex;
use crate::solver::{MomentEnvelope, StructuralSolver};

use super::details::{
    ComponentLedger, ConcreteState, EquilibriumCheck, PerPoiRecord, PrestressLiveLoad,
    PrestressState, StressEnvelope, TimeStepState,
};

/// Finalize the last state in `record`
pub fn finalize_state(
    ctx: &GirderContext<'_>,
    solver: &dyn StructuralSolver,
    settings: &EquilibriumSettings,
    record: &mut PerPoiRecord,
    interval: IntervalIndex,
) -> LossResult<()> {
    let model = ctx.model;
    let poi = record.poi;
    let segment = poi.segment_key();
    if record.history.len() != interval + 1 {
        return Err(LossError::internal(format!(
            "Cannot finalize interval {} at {:.3}: history holds {} intervals",
            interval,
            poi.dist_from_start,
            record.history.len()
        )));
    }
    let (done, current) = record.history.split_at_mut(interval);
    let previous = done.last();
    let state = &mut current[0];

    if interval < model.release_interval(segment) {
        finalize_before_release(state, previous);
        return Ok(());
    }

    // external section forces
    let closure_inactive = ctx.is_closure_inactive(&poi, interval);
    for load in applicable_loads(model, segment, &ctx.tendon_stressing, interval) {
        if load.is_solver_load() && !closure_inactive {
            let response = solver.product_response(interval, load, &poi);
            state.section.d_p.add(load, response.axial);
            state.section.d_m.add(load, response.moment);
        }
    }
    if !closure_inactive && model.live_load_interval() <= interval {
        let envelope = solver.live_load_moment(interval, &poi);
        state.live_load = MomentEnvelope {
            min: envelope.min.min(envelope.max),
            max: envelope.min.max(envelope.max),
        };
    }

    // release the restraint
    if state.transformed.area != 0.0 {
        for mechanism in Mechanism::ALL {
            let load = mechanism.product_force();
            let restraint = state.restraint.get(mechanism);
            let response = state.initial_strain_response[mechanism.index()];
            state.section.d_p.add(load, -(response.axial + restraint.axial));
            state.section.d_m.add(load, -(response.moment + restraint.moment));
        }
    }

    distribute(ctx, state);
    add_restraining_forces(state);
    update_prestress(ctx, state, previous);
    update_fiber_stresses(state);
    accumulate(state, previous);
    update_live_load(ctx, state);
    check_equilibrium(state, previous, settings, poi.dist_from_start)
}

/// Strands sit in the bed and only relax
fn finalize_before_release(state: &mut TimeStepState, previous: Option<&TimeStepState>) {
    for (strand_type, strands) in state.strands.iter_mut().enumerate() {
        for (j, strand) in strands.iter_mut().enumerate() {
            if strand.area == 0.0 {
                continue;
            }
            strand
                .forces
                .d_p
                .add(ProductForce::Relaxation, -strand.relaxation * strand.area);
            let fpe_before = previous
                .and_then(|p| p.strands[strand_type].get(j))
                .filter(|s| s.area > 0.0)
                .map_or(strand.fpj, |s| s.fpe);
            strand.fpe = fpe_before - strand.relaxation;
            strand.loss = strand.fpj - strand.fpe;
        }
    }
    accumulate(state, previous);
    state.equilibrium.satisfied = true;
}

fn concrete_stiffness(concrete: &ConcreteState) -> ComponentStiffness {
    ComponentStiffness {
        modulus: concrete.age_adjusted_modulus,
        area: concrete.section.area,
        inertia: concrete.section.inertia,
        elevation: concrete.section.centroid,
    }
}

fn steel_stiffness(modulus: f64, area: f64, elevation: f64) -> ComponentStiffness {
    ComponentStiffness {
        modulus,
        area,
        inertia: 0.0,
        elevation,
    }
}

fn share(
    ledger: &mut ComponentLedger,
    stiffness: &ComponentStiffness,
    deformation: &Deformation,
    ytr: f64,
    load: ProductForce,
) {
    if stiffness.area == 0.0 {
        return;
    }
    let (d_p, d_m) = stiffness.share(deformation, ytr);
    ledger.d_p.add(load, d_p);
    ledger.d_m.add(load, d_m);
    ledger.d_strain.add(load, deformation.strain_at(ytr, stiffness.elevation));
    ledger.d_curvature.add(load, deformation.curvature);
}

/// Spread every section increment over the bonded components
fn distribute(ctx: &GirderContext<'_>, state: &mut TimeStepState) {
    let ytr = state.transformed.centroid;
    let e = state.reference_modulus;
    let interval = state.interval;
    let girder = concrete_stiffness(&state.girder);
    let deck = concrete_stiffness(&state.deck);

    for load in ProductForce::ALL {
        let (d_p, d_m) = (state.section.d_p[load], state.section.d_m[load]);
        let deformation = Deformation::of_section(d_p, d_m, e, &state.transformed);
        state.section.d_strain.set(load, deformation.strain);
        state.section.d_curvature.set(load, deformation.curvature);

        share(&mut state.girder.forces, &girder, &deformation, ytr, load);
        share(&mut state.deck.forces, &deck, &deformation, ytr, load);
        for rebar in state.girder_rebar.iter_mut().chain(state.deck_rebar.iter_mut()) {
            let stiffness = steel_stiffness(rebar.modulus, rebar.area, rebar.elevation);
            share(&mut rebar.forces, &stiffness, &deformation, ytr, load);
        }
        for strand in state.strands.iter_mut().flatten() {
            let stiffness = steel_stiffness(strand.modulus, strand.area, strand.elevation);
            share(&mut strand.forces, &stiffness, &deformation, ytr, load);
        }
        for (duct, tendon) in state.tendons.iter_mut().enumerate() {
            if ctx.is_tendon_bonded(duct, interval) {
                let stiffness = steel_stiffness(tendon.modulus, tendon.area, tendon.elevation);
                share(&mut tendon.forces, &stiffness, &deformation, ytr, load);
            }
        }
    }
}

fn add_restraining_forces(state: &mut TimeStepState) {
    for concrete in [&mut state.girder, &mut state.deck] {
        let r = concrete.restraint;
        concrete.forces.d_p.add(ProductForce::Creep, r.creep_force);
        concrete.forces.d_m.add(ProductForce::Creep, r.creep_moment);
        concrete.forces.d_p.add(ProductForce::Shrinkage, r.shrinkage_force);
    }
    for steel in state.strands.iter_mut().flatten().chain(state.tendons.iter_mut()) {
        steel.forces.d_p.add(ProductForce::Relaxation, steel.relaxation_force);
    }
}

fn update_prestress(
    ctx: &GirderContext<'_>,
    state: &mut TimeStepState,
    previous: Option<&TimeStepState>,
) {
    for (strand_type, strands) in state.strands.iter_mut().enumerate() {
        for (j, strand) in strands.iter_mut().enumerate() {
            if strand.area == 0.0 {
                continue;
            }
            let fpe_before = previous
                .and_then(|p| p.strands[strand_type].get(j))
                .filter(|s| s.area > 0.0)
                .map_or(strand.fpj, |s| s.fpe);
            strand.fpe = fpe_before + strand.forces.d_p.total() / strand.area;
            strand.loss = strand.fpj - strand.fpe;
        }
    }
    for (duct, tendon) in state.tendons.iter_mut().enumerate() {
        if tendon.area == 0.0 {
            continue;
        }
        let fpe_before = if ctx.is_tendon_bonded(duct, state.interval) {
            previous
                .and_then(|p| p.tendons.get(duct))
                .filter(|t| t.area > 0.0)
                .map_or(tendon.fpj, |t| t.fpe)
        } else {
            tendon.fpj
        };
        tendon.fpe = fpe_before + tendon.forces.d_p.total() / tendon.area;
        tendon.loss = tendon.fpj - tendon.fpe;
    }
}

fn update_fiber_stresses(state: &mut TimeStepState) {
    for concrete in [&mut state.girder, &mut state.deck] {
        let section = concrete.section;
        for load in ProductForce::ALL {
            let d_p = concrete.forces.d_p[load];
            let d_m = concrete.forces.d_m[load];
            concrete.stresses.d_top.set(load, fiber_stress(d_p, d_m, &section, section.top));
            concrete.stresses.d_bottom.set(load, fiber_stress(d_p, d_m, &section, section.bottom));
        }
    }
}

/// Running sums from the previous interval plus this interval's increments
fn accumulate(state: &mut TimeStepState, previous: Option<&TimeStepState>) {
    state.section.accumulate(previous.map(|p| &p.section));
    for (concrete, before) in [
        (&mut state.girder, previous.map(|p| &p.girder)),
        (&mut state.deck, previous.map(|p| &p.deck)),
    ] {
        concrete.forces.accumulate(before.map(|b| &b.forces));
        let (top, bottom) = before.map_or((Default::default(), Default::default()), |b| {
            (b.stresses.top, b.stresses.bottom)
        });
        concrete.stresses.top = top.plus(&concrete.stresses.d_top);
        concrete.stresses.bottom = bottom.plus(&concrete.stresses.d_bottom);
    }
    for (j, rebar) in state.girder_rebar.iter_mut().enumerate() {
        rebar.forces.accumulate(previous.and_then(|p| p.girder_rebar.get(j)).map(|r| &r.forces));
    }
    for (j, rebar) in state.deck_rebar.iter_mut().enumerate() {
        rebar.forces.accumulate(previous.map(|p| &p.deck_rebar[j].forces));
    }
    for (strand_type, strands) in state.strands.iter_mut().enumerate() {
        for (j, strand) in strands.iter_mut().enumerate() {
            let before = previous.and_then(|p| p.strands[strand_type].get(j));
            strand.forces.accumulate(before.map(|s| &s.forces));
        }
    }
    for (duct, tendon) in state.tendons.iter_mut().enumerate() {
        tendon
            .forces
            .accumulate(previous.and_then(|p| p.tendons.get(duct)).map(|t| &t.forces));
    }
}

fn prestress_live_load(
    steel: &mut PrestressState,
    ratio: f64,
    envelope: &MomentEnvelope,
    ytr: f64,
    itr: f64,
) {
    if steel.area == 0.0 {
        return;
    }
    let at_min = ratio * safe_ratio(envelope.min * (ytr - steel.elevation), itr);
    let at_max = ratio * safe_ratio(envelope.max * (ytr - steel.elevation), itr);
    let (low, high) = (at_min.min(at_max), at_min.max(at_max));
    steel.live_load = PrestressLiveLoad {
        fpe_min: steel.fpe + low,
        fpe_max: steel.fpe + high,
        loss_min: steel.loss - high,
        loss_max: steel.loss - low,
    };
}

/// Elastic effect of the live-load envelope on concrete and prestress
fn update_live_load(ctx: &GirderContext<'_>, state: &mut TimeStepState) {
    let envelope = state.live_load;
    let ytr = state.transformed.centroid;
    let itr = state.transformed.inertia;
    let e_girder = state.girder.modulus;

    let fiber = |ratio: f64, elevation: f64| {
        StressEnvelope::between(
            ratio * safe_ratio(envelope.min * (ytr - elevation), itr),
            ratio * safe_ratio(envelope.max * (ytr - elevation), itr),
        )
    };

    if state.girder.section.area != 0.0 {
        state.girder.live_load_top = fiber(1.0, state.girder.section.top);
        state.girder.live_load_bottom = fiber(1.0, state.girder.section.bottom);
    }
    if state.deck.section.area != 0.0 {
        let ratio = safe_ratio(state.deck.modulus, e_girder);
        state.deck.live_load_top = fiber(ratio, state.deck.section.top);
        state.deck.live_load_bottom = fiber(ratio, state.deck.section.bottom);
    }

    for steel in state.strands.iter_mut().flatten() {
        let ratio = safe_ratio(steel.modulus, e_girder);
        prestress_live_load(steel, ratio, &envelope, ytr, itr);
    }
    for (duct, tendon) in state.tendons.iter_mut().enumerate() {
        if ctx.is_tendon_bonded(duct, state.interval) {
            let ratio = safe_ratio(tendon.modulus, e_girder);
            prestress_live_load(tendon, ratio, &envelope, ytr, itr);
        } else {
            prestress_live_load(tendon, 0.0, &envelope, ytr, itr);
        }
    }
}

/// Sum of component force increments about the transformed centroid
#[derive(Debug, Default)]
struct InternalTotals {
    p: f64,
    m: f64,
    /// Sums of absolute contributions, to scale the tolerance
    p_scale: f64,
    m_scale: f64,
}

impl InternalTotals {
    fn add(&mut self, d_p: f64, moment: f64) {
        self.p += d_p;
        self.m += moment;
        self.p_scale += d_p.abs();
        self.m_scale += moment.abs();
    }
}

fn internal_totals(state: &TimeStepState) -> InternalTotals {
    let ytr = state.transformed.centroid;
    let mut totals = InternalTotals::default();
    for concrete in [&state.girder, &state.deck] {
        let d_p = concrete.forces.d_p.total();
        totals.add(
            d_p,
            moment_about_centroid(d_p, concrete.forces.d_m.total(), ytr, concrete.section.centroid),
        );
    }
    let rebar = state
        .girder_rebar
        .iter()
        .chain(state.deck_rebar.iter())
        .map(|r| (r.forces.d_p.total(), r.elevation));
    let prestress = state
        .strands
        .iter()
        .flatten()
        .chain(state.tendons.iter())
        .map(|s| (s.forces.d_p.total(), s.elevation));
    for (d_p, elevation) in rebar.chain(prestress) {
        totals.add(d_p, moment_about_centroid(d_p, 0.0, ytr, elevation));
    }
    totals
}

fn check_equilibrium(
    state: &mut TimeStepState,
    previous: Option<&TimeStepState>,
    settings: &EquilibriumSettings,
    location: f64,
) -> LossResult<()> {
    let restraint_force: f64 = state.restraint.force.iter().sum();
    let restraint_moment: f64 = state.restraint.moment.iter().sum();
    let d_p_external = state.section.d_p.total() + restraint_force;
    let d_m_external = state.section.d_m.total() + restraint_moment;
    let internal = internal_totals(state);
    let (d_p_internal, d_m_internal) = (internal.p, internal.m);

    let before = previous.map(|p| p.equilibrium).unwrap_or_default();
    let mut check = EquilibriumCheck {
        d_p_external,
        d_p_internal,
        d_m_external,
        d_m_internal,
        p_external: before.p_external + d_p_external,
        p_internal: before.p_internal + d_p_internal,
        m_external: before.m_external + d_m_external,
        m_internal: before.m_internal + d_m_internal,
        satisfied: true,
    };

    let interval = state.interval;
    let balanced = |external: f64, internal: f64, scale: f64| {
        let scale = scale.max(external.abs()).max(internal.abs());
        (external - internal).abs() <= settings.allowance(interval, scale)
    };
    check.satisfied = balanced(check.d_p_external, check.d_p_internal, internal.p_scale)
        && balanced(check.d_m_external, check.d_m_internal, internal.m_scale)
        && balanced(check.p_external, check.p_internal, internal.p_scale)
        && balanced(check.m_external, check.m_internal, internal.m_scale);
    state.equilibrium = check;

    if check.satisfied {
        return Ok(());
    }
    match settings.policy {
        EquilibriumPolicy::Lenient => {
            log::warn!(
                "Equilibrium not satisfied in interval {} at {:.3}: P {:.3} vs {:.3}, M {:.3} vs {:.3}",
                interval,
                location,
                check.p_external,
                check.p_internal,
                check.m_external,
                check.m_internal
            );
            Ok(())
        }
        EquilibriumPolicy::Strict => Err(LossError::EquilibriumMismatch {
            interval,
            location,
            p_external: check.p_external,
            p_internal: check.p_internal,
            m_external: check.m_external,
            m_internal: check.m_internal,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{NetSection, TransformedSection};
    use approx::assert_relative_eq;

    /// Girder, deck and one strand element transformed to E = 30000
    fn composite_state() -> TimeStepState {
        let e = 30_000.0;
        let girder = NetSection {
            area: 400_000.0,
            inertia: 8.0e10,
            centroid: -800.0,
            top: 0.0,
            bottom: -1600.0,
        };
        let deck = NetSection {
            area: 500_000.0,
            inertia: 1.67e9,
            centroid: 100.0,
            top: 200.0,
            bottom: 0.0,
        };
        let strand_area = 2_000.0;
        let strand_modulus = 197_000.0;
        let strand_elevation = -1500.0;

        let n = strand_modulus / e;
        let area = girder.area + deck.area + n * strand_area;
        let centroid = (girder.area * girder.centroid
            + deck.area * deck.centroid
            + n * strand_area * strand_elevation)
            / area;
        let inertia = girder.inertia
            + girder.area * (girder.centroid - centroid).powi(2)
            + deck.inertia
            + deck.area * (deck.centroid - centroid).powi(2)
            + n * strand_area * (strand_elevation - centroid).powi(2);

        let mut state = TimeStepState {
            interval: 3,
            reference_modulus: e,
            transformed: TransformedSection { area, inertia, centroid },
            ..TimeStepState::default()
        };
        for (concrete, section) in [(&mut state.girder, girder), (&mut state.deck, deck)] {
            concrete.section = section;
            concrete.modulus = e;
            concrete.age_adjusted_modulus = e;
        }
        state.strands[0].push(PrestressState {
            area: strand_area,
            elevation: strand_elevation,
            modulus: strand_modulus,
            fpj: 1400.0,
            ..PrestressState::default()
        });
        state
    }

    #[test]
    fn test_distribution_balances_section() {
        let mut state = composite_state();
        state.section.d_p.set(ProductForce::Deck, 0.0);
        state.section.d_m.set(ProductForce::Deck, 2.5e9);
        state.section.d_p.set(ProductForce::Pretension, -2.0e6);
        state.section.d_m.set(ProductForce::Pretension, 1.2e9);

        let totals = {
            let girder = concrete_stiffness(&state.girder);
            let deck = concrete_stiffness(&state.deck);
            let strand = steel_stiffness(197_000.0, 2_000.0, -1500.0);
            let ytr = state.transformed.centroid;
            for load in [ProductForce::Deck, ProductForce::Pretension] {
                let deformation = Deformation::of_section(
                    state.section.d_p[load],
                    state.section.d_m[load],
                    state.reference_modulus,
                    &state.transformed,
                );
                share(&mut state.girder.forces, &girder, &deformation, ytr, load);
                share(&mut state.deck.forces, &deck, &deformation, ytr, load);
                share(&mut state.strands[0][0].forces, &strand, &deformation, ytr, load);
            }
            internal_totals(&state)
        };
        assert_relative_eq!(totals.p, state.section.d_p.total(), max_relative = 1e-9);
        assert_relative_eq!(totals.m, state.section.d_m.total(), max_relative = 1e-9);
    }

    #[test]
    fn test_restraint_release_is_in_equilibrium() {
        let mut state = composite_state();
        state.girder.restraint.shrinkage_force = 1.2e5;
        state.deck.restraint.shrinkage_force = 2.0e5;
        state.strands[0][0].relaxation_force = -3.0e4;
        state.restraint = crate::losses::initializer::restraint_totals(&state);
        for mechanism in Mechanism::ALL {
            let load = mechanism.product_force();
            let restraint = state.restraint.get(mechanism);
            state.section.d_p.add(load, -restraint.axial);
            state.section.d_m.add(load, -restraint.moment);
        }

        let ytr = state.transformed.centroid;
        let girder = concrete_stiffness(&state.girder);
        let deck = concrete_stiffness(&state.deck);
        let strand = steel_stiffness(197_000.0, 2_000.0, -1500.0);
        for load in ProductForce::ALL {
            let deformation = Deformation::of_section(
                state.section.d_p[load],
                state.section.d_m[load],
                state.reference_modulus,
                &state.transformed,
            );
            share(&mut state.girder.forces, &girder, &deformation, ytr, load);
            share(&mut state.deck.forces, &deck, &deformation, ytr, load);
            share(&mut state.strands[0][0].forces, &strand, &deformation, ytr, load);
        }
        add_restraining_forces(&mut state);

        let settings = EquilibriumSettings {
            policy: EquilibriumPolicy::Strict,
            ..EquilibriumSettings::default()
        };
        check_equilibrium(&mut state, None, &settings, 0.0).unwrap();
        assert!(state.equilibrium.satisfied);
        // no external load and no secondary response
        assert!(state.equilibrium.p_external.abs() < 1e-6);

        // the strand loses relaxation and picks up shrinkage shortening
        assert!(state.strands[0][0].forces.d_p[ProductForce::Relaxation] < 0.0);
        assert!(state.strands[0][0].forces.d_p[ProductForce::Shrinkage] < 0.0);
    }

    #[test]
    fn test_strict_policy_reports_mismatch() {
        let mut state = composite_state();
        state.section.d_p.set(ProductForce::Deck, 1.0e5);
        let settings = EquilibriumSettings {
            policy: EquilibriumPolicy::Strict,
            ..EquilibriumSettings::default()
        };
        let err = check_equilibrium(&mut state, None, &settings, 12.5).unwrap_err();
        assert_eq!(err.error_code(), "EQUILIBRIUM_MISMATCH");
        assert!(!state.equilibrium.satisfied);

        let lenient = EquilibriumSettings::default();
        assert!(check_equilibrium(&mut state, None, &lenient, 12.5).is_ok());
    }

    #[test]
    fn test_zero_stiffness_component_gets_nothing() {
        let mut ledger = ComponentLedger::default();
        let deformation = Deformation {
            strain: 1.0e-4,
            curvature: 1.0e-7,
        };
        let stiffness = steel_stiffness(200_000.0, 0.0, -100.0);
        share(&mut ledger, &stiffness, &deformation, -500.0, ProductForce::Deck);
        assert_eq!(ledger, ComponentLedger::default());
    }

    #[test]
    fn test_bed_relaxation_before_release() {
        let mut previous = TimeStepState::default();
        previous.strands[0].push(PrestressState {
            area: 1000.0,
            fpj: 1400.0,
            fpe: 1390.0,
            ..PrestressState::default()
        });
        let mut state = TimeStepState::default();
        state.interval = 1;
        state.strands[0].push(PrestressState {
            area: 1000.0,
            fpj: 1400.0,
            relaxation: 5.0,
            ..PrestressState::default()
        });
        finalize_before_release(&mut state, Some(&previous));
        let strand = &state.strands[0][0];
        assert_eq!(strand.fpe, 1385.0);
        assert_eq!(strand.loss, 15.0);
        assert_eq!(strand.forces.p[ProductForce::Relaxation], -5000.0);
    }
}
