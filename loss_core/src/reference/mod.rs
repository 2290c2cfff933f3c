//! # Reference Bridge
//!
//! A complete host for the loss engine: a persisted description of a
//! simple-span precast girder bridge, the providers built from it, and a
//! line-girder solver.
//!
//! - [`description`] - serializable bridge input and a sample bridge
//! - [`timeline`] - construction events and the intervals they produce
//! - [`model`] - [`ReferenceBridge`], implementing every provider trait
//! - [`beam_analysis`] - [`SimpleSpanSolver`]
//!
//! ## Example
//!
//! ```rust
//! use loss_core::reference::{BridgeDescription, ReferenceBridge, SimpleSpanSolver};
//! use loss_core::bridge::BridgeTopology;
//!
//! let bridge = ReferenceBridge::new(BridgeDescription::sample()).unwrap();
//! let solver = SimpleSpanSolver::for_bridge(&bridge);
//! assert_eq!(bridge.group_count(), 2);
//! # let _ = solver;
//! ```

pub mod beam_analysis;
pub mod description;
pub mod model;
pub mod timeline;

pub use beam_analysis::{AppliedLoad, SimpleSpanSolver, SpanLoad};
pub use description::{BridgeDescription, UserLoad, UserLoadKind};
pub use model::ReferenceBridge;
pub use timeline::{Activity, ConstructionEvent, Timeline};
