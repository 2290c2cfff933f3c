//! # loss_core - Time-Step Prestress Loss Engine
//!
//! `loss_core` computes prestress losses in precast, pretensioned and
//! post-tensioned girders: friction and anchor set for tendons, then an
//! incremental time-step analysis of creep, shrinkage and relaxation over the
//! construction and service life of the bridge.
//!
//! ## Design Philosophy
//!
//! - **Providers, not ownership**: bridge geometry, sections, materials, the
//!   schedule and the structural solver are traits the host implements
//! - **Lazy**: a query for interval `k` computes only what is still missing
//! - **JSON-First**: inputs, settings and per-interval details serialize
//! - **Rich Errors**: structured [`LossError`] values with stable codes
//!
//! ## Quick Start
//!
//! ```rust
//! use loss_core::bridge::{BridgeTopology, StrandType};
//! use loss_core::intervals::IntervalSchedule;
//! use loss_core::poi::GirderKey;
//! use loss_core::project::Project;
//! use loss_core::services::AnalysisServices;
//!
//! let project = Project::new("Jane Engineer", "25-001", "State DOT");
//! let (bridge, mut solver, mut engine) = project.analysis().unwrap();
//!
//! let girder = GirderKey::new(0, 0);
//! let midspan = bridge.points_of_interest(girder)[5];
//! let last = bridge.interval_count() - 1;
//!
//! let mut services = AnalysisServices::new(&bridge, &mut solver);
//! let fpe = engine
//!     .effective_prestress(&mut services, &midspan, last, StrandType::Straight)
//!     .unwrap();
//! assert!(0.0 < fpe && fpe < 1395.0);
//! ```
//!
//! ## Modules
//!
//! - [`losses`] - The engine: friction, anchor set and time-step analysis
//! - [`bridge`], [`intervals`], [`materials`], [`solver`] - Provider traits
//! - [`poi`] - Girder keys and points of interest
//! - [`loads`] - Load types and the per-interval applicable load rules
//! - [`reference`] - A complete simple-span bridge model and solver
//! - [`project`] - Project container persisted to `.tsl` files
//! - [`file_io`] - File operations with atomic saves and locking
//! - [`errors`] - Structured error types

pub mod bridge;
pub mod errors;
pub mod file_io;
pub mod intervals;
pub mod loads;
pub mod losses;
pub mod materials;
pub mod poi;
pub mod progress;
pub mod project;
pub mod reference;
pub mod services;
pub mod solver;

// Re-export commonly used types at crate root for convenience
pub use errors::{LossError, LossResult};
pub use file_io::{load_project, save_project, FileLock};
pub use losses::{LossConfig, PoiLosses, TimeStepLossEngine, TimeStepState};
pub use poi::{GirderKey, PointOfInterest};
pub use project::{Project, ProjectMetadata};
pub use reference::{BridgeDescription, ReferenceBridge, SimpleSpanSolver};
pub use services::{AnalysisServices, BridgeModel};
