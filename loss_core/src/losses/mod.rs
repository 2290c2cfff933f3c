//! # Time-Step Prestress Losses
//!
//! Friction, anchor set and the incremental time-step analysis of creep,
//! shrinkage and relaxation.
//!
//! ## Pipeline
//!
//! ```text
//! friction ─► anchor_set                     (once per girder line)
//!
//! for each interval k:
//!     initializer ─► initial_strain ─► finalizer
//!     (restrain)     (release into     (distribute, update stresses,
//!                     the structure)    check equilibrium)
//! ```
//!
//! [`TimeStepLossEngine`] drives the pipeline lazily: a query for interval `k`
//! computes whatever intervals up to `k` are still missing.

pub mod anchor_set;
pub mod classifier;
pub mod config;
pub mod details;
pub mod engine;
pub mod finalizer;
pub mod friction;
pub mod initial_strain;
pub mod initializer;
pub mod mechanics;
pub mod strands;

pub use config::{
    AnchorSetSolverSettings, EquilibriumPolicy, EquilibriumSettings, FrictionParameters,
    LossConfig, LossMethod, StrandModeling,
};
pub use details::{
    AnchorSetResult, ConcreteState, EquilibriumCheck, FrictionLoss, GirderHistory,
    GirderLineHistory, LineStage, PerPoiRecord, PrestressState, TendonSummary, TimeStepState,
};
pub use engine::{PoiLosses, TimeStepLossEngine};
pub use strands::{IndividualStrands, LumpedStrands, StrandDiscretization};
