//! Imposed deformations from restraining forces
//!
//! The restraining forces of an interval are released into the structure as
//! imposed strain and curvature between adjacent POIs, one load case per
//! mechanism. On a statically indeterminate structure this produces the
//! secondary forces the restraint would otherwise hide.

use crate::loads::Mechanism;
use crate::losses::initializer::GirderContext;
use crate::losses::mechanics::safe_ratio;
use crate::poi::IntervalIndex;
use crate::solver::{InitialStrainLoad, SectionForce, StructuralSolver};

use super::details::{PerPoiRecord, TimeStepState};

/// Create the creep, shrinkage and relaxation load cases
pub fn register_load_cases(solver: &mut dyn StructuralSolver) {
    for mechanism in Mechanism::ALL {
        solver.register_load_case(mechanism.load_case_name());
    }
}

/// Strain and curvature that would fully restrain a mechanism
fn restrained_deformation(state: &TimeStepState, mechanism: Mechanism) -> (f64, f64) {
    let restraint = state.restraint.get(mechanism);
    let e = state.reference_modulus;
    (
        safe_ratio(restraint.axial, e * state.transformed.area),
        safe_ratio(restraint.moment, e * state.transformed.inertia),
    )
}

fn carries_deformation(
    ctx: &GirderContext<'_>,
    record: &PerPoiRecord,
    interval: IntervalIndex,
) -> bool {
    record.poi.is_on_segment() && !ctx.is_closure_inactive(&record.poi, interval)
}

/// Submit the imposed deformations of `interval` for one girder and read
/// back the structure's response at every POI.
pub fn distribute_initial_strains(
    ctx: &GirderContext<'_>,
    solver: &mut dyn StructuralSolver,
    records: &mut [PerPoiRecord],
    interval: IntervalIndex,
) {
    for pair in records.windows(2) {
        let (first, second) = (&pair[0], &pair[1]);
        let (Some(a), Some(b)) = (first.history.get(interval), second.history.get(interval)) else {
            continue;
        };
        let loaded =
            carries_deformation(ctx, first, interval) && carries_deformation(ctx, second, interval);

        for mechanism in Mechanism::ALL {
            let (strain, curvature) = if loaded {
                let (e1, r1) = restrained_deformation(a, mechanism);
                let (e2, r2) = restrained_deformation(b, mechanism);
                (-0.5 * (e1 + e2), -0.5 * (r1 + r2))
            } else {
                (0.0, 0.0)
            };
            solver.add_initial_strain(InitialStrainLoad {
                interval,
                load_case: mechanism.load_case_name().to_string(),
                start: first.poi,
                end: second.poi,
                strain,
                curvature,
            });
        }
    }

    for record in records.iter_mut() {
        let closure_inactive = ctx.is_closure_inactive(&record.poi, interval);
        let poi = record.poi;
        let Some(state) = record.history.get_mut(interval) else {
            continue;
        };
        for mechanism in Mechanism::ALL {
            state.initial_strain_response[mechanism.index()] = if closure_inactive {
                SectionForce::default()
            } else {
                solver.load_case_response(interval, mechanism.load_case_name(), &poi)
            };
        }
    }
}
