//! # Structural Solver Seam
//!
//! The line-girder (or FEM) analysis that turns loads into section forces is
//! owned by the host. The engine asks it for incremental responses and hands
//! it imposed-deformation loads that represent creep, shrinkage and
//! relaxation.
//!
//! Sign convention: tension positive, sagging moment positive.

use serde::{Deserialize, Serialize};

use crate::loads::ProductForce;
use crate::poi::{IntervalIndex, PointOfInterest};

/// Axial force and moment at a section
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionForce {
    pub axial: f64,
    pub moment: f64,
}

impl SectionForce {
    pub fn new(axial: f64, moment: f64) -> Self {
        SectionForce { axial, moment }
    }
}

/// Minimum and maximum combined live-load moment
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MomentEnvelope {
    pub min: f64,
    pub max: f64,
}

/// An imposed axial strain and curvature between two POIs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialStrainLoad {
    pub interval: IntervalIndex,
    pub load_case: String,
    pub start: PointOfInterest,
    pub end: PointOfInterest,
    pub strain: f64,
    pub curvature: f64,
}

impl InitialStrainLoad {
    /// True when both loads act in the same load case, interval and POI pair
    pub fn replaces(&self, other: &InitialStrainLoad) -> bool {
        self.interval == other.interval
            && self.load_case == other.load_case
            && self.start.is_at(&other.start)
            && self.end.is_at(&other.end)
    }
}

/// Structural analysis services used by the time-step engine.
pub trait StructuralSolver {
    /// Create a named load case. Registering an existing name is harmless.
    fn register_load_case(&mut self, name: &str);

    /// Incremental response to a product load during an interval
    fn product_response(
        &self,
        interval: IntervalIndex,
        load: ProductForce,
        poi: &PointOfInterest,
    ) -> SectionForce;

    /// Live-load moment envelope at a POI in an interval
    fn live_load_moment(&self, interval: IntervalIndex, poi: &PointOfInterest) -> MomentEnvelope;

    /// Add an imposed deformation to a named load case.
    ///
    /// A load for the same load case, interval and POI pair as one already
    /// added replaces it. The engine resubmits loads after `clear()`, after a
    /// failed interval, and for girders shared by two girder lines.
    fn add_initial_strain(&mut self, load: InitialStrainLoad);

    /// Response to the imposed deformations of a named load case
    fn load_case_response(
        &self,
        interval: IntervalIndex,
        load_case: &str,
        poi: &PointOfInterest,
    ) -> SectionForce;
}
