//! Borrowed host services
//!
//! The engine never stores references to host providers. Each query borrows
//! them through an [`AnalysisServices`] value for the duration of one call,
//! and the borrow ends when the call returns.

use crate::bridge::{BridgeTopology, PrestressGeometry, SectionProperties};
use crate::intervals::IntervalSchedule;
use crate::materials::MaterialModel;
use crate::progress::ProgressSink;
use crate::solver::StructuralSolver;

/// Every read-only provider the engine needs, as one trait object
pub trait BridgeModel:
    BridgeTopology + IntervalSchedule + SectionProperties + PrestressGeometry + MaterialModel
{
}

impl<T> BridgeModel for T where
    T: BridgeTopology + IntervalSchedule + SectionProperties + PrestressGeometry + MaterialModel
{
}

/// Providers borrowed for one analysis pass
pub struct AnalysisServices<'a> {
    pub model: &'a dyn BridgeModel,
    pub solver: &'a mut dyn StructuralSolver,
    pub progress: Option<&'a dyn ProgressSink>,
}

impl<'a> AnalysisServices<'a> {
    pub fn new(model: &'a dyn BridgeModel, solver: &'a mut dyn StructuralSolver) -> Self {
        AnalysisServices {
            model,
            solver,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = Some(progress);
        self
    }
}
