//! # Material Models
//!
//! Time-dependent material behavior consumed by the loss engine.
//!
//! ## Material Types
//!
//! - **Concrete**: instantaneous and age-adjusted modulus, creep coefficient,
//!   free shrinkage strain ([`concrete`] holds an ACI 209 implementation)
//! - **Prestressing steel**: modulus and intrinsic relaxation
//!   ([`prestressing`] holds a low-relaxation strand implementation)
//! - **Mild reinforcement**: modulus only
//!
//! The engine talks to materials only through [`MaterialModel`], so a host
//! can plug in any code-specific formulation.
//!
//! ## Example
//!
//! ```rust
//! use loss_core::materials::concrete::ConcreteMix;
//!
//! let mix = ConcreteMix::default();
//! // Modulus at 28 days equals the specified value
//! assert!((mix.modulus_at_age(28.0) - mix.modulus_28).abs() / mix.modulus_28 < 1e-9);
//! ```

pub mod concrete;
pub mod prestressing;

pub use concrete::ConcreteMix;
pub use prestressing::PrestressingSteel;

use serde::{Deserialize, Serialize};

use crate::bridge::StrandType;
use crate::intervals::IntervalTime;
use crate::poi::{DuctIndex, GirderKey, IntervalIndex, SegmentKey};

/// Identifies a concrete element of the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConcreteElement {
    /// Precast segment
    Segment(SegmentKey),
    /// Cast-in-place closure joint at the end of a segment
    Closure(SegmentKey),
    Deck,
}

/// Identifies a group of mild reinforcement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RebarElement {
    Segment(SegmentKey),
    Closure(SegmentKey),
    Deck,
}

/// Identifies prestressing steel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrestressElement {
    Strand(SegmentKey, StrandType),
    Tendon(GirderKey, DuctIndex),
}

/// Material behavior needed by the time-step analysis.
pub trait MaterialModel {
    /// Instantaneous modulus of elasticity during an interval
    fn concrete_modulus(&self, concrete: ConcreteElement, interval: IntervalIndex) -> f64;

    /// Age-adjusted effective modulus for load applied during an interval
    fn age_adjusted_modulus(&self, concrete: ConcreteElement, interval: IntervalIndex) -> f64;

    /// Creep coefficient for load applied at the middle of `loading_interval`
    /// evaluated at the given point of `evaluation_interval`
    fn creep_coefficient(
        &self,
        concrete: ConcreteElement,
        loading_interval: IntervalIndex,
        evaluation_interval: IntervalIndex,
        at: IntervalTime,
    ) -> f64;

    /// Free shrinkage strain occurring during an interval (negative shortens)
    fn shrinkage_strain(&self, concrete: ConcreteElement, interval: IntervalIndex) -> f64;

    /// Intrinsic relaxation (stress loss, positive) between two times measured
    /// from stressing, for a steel stressed to `fpe` at the start
    fn relaxation(&self, steel: PrestressElement, fpe: f64, t_start: f64, t_end: f64) -> f64;

    fn prestress_modulus(&self, steel: PrestressElement) -> f64;

    fn rebar_modulus(&self, rebar: RebarElement) -> f64;
}
