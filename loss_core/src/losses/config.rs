//! Engine configuration
//!
//! [`LossConfig`] is persisted with the project and validated when an engine
//! is created.

use serde::{Deserialize, Serialize};

use crate::errors::{LossError, LossResult};

/// Prestress loss method selected for the project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LossMethod {
    /// Incremental time-step analysis
    #[default]
    TimeStep,
    /// Refined estimate of time-dependent losses
    Refined,
    /// Approximate estimate of time-dependent losses
    Approximate,
    /// Lump sum losses
    LumpSum,
}

impl LossMethod {
    pub fn display_name(&self) -> &'static str {
        match self {
            LossMethod::TimeStep => "Time-step analysis",
            LossMethod::Refined => "Refined estimate",
            LossMethod::Approximate => "Approximate estimate",
            LossMethod::LumpSum => "Lump sum",
        }
    }
}

/// How pretensioned strands are represented in the section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StrandModeling {
    /// All strands of a type are one element at their centroid
    #[default]
    Lumped,
    /// Each strand is its own element
    Individual,
}

/// Tendon friction and anchorage parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrictionParameters {
    /// Curvature friction coefficient μ (1/radian)
    pub friction_coefficient: f64,

    /// Wobble coefficient k (1/length)
    pub wobble_coefficient: f64,

    /// Anchor set (seating) Δset
    pub anchor_set: f64,
}

impl Default for FrictionParameters {
    /// Galvanized metal duct, 6 mm seating (mm based units)
    fn default() -> Self {
        FrictionParameters {
            friction_coefficient: 0.25,
            wobble_coefficient: 6.6e-7,
            anchor_set: 6.0,
        }
    }
}

/// Controls for the anchor-set root finding
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorSetSolverSettings {
    /// Maximum false-position iterations
    pub max_iterations: usize,

    /// Convergence tolerance on the seating, relative to Δset
    pub tolerance: f64,

    /// First bracketing step as a fraction of the end span length
    pub initial_step_fraction: f64,

    /// Growth of the bracketing step
    pub growth_factor: f64,

    /// Maximum number of bracketing steps
    pub max_bracket_steps: usize,
}

impl Default for AnchorSetSolverSettings {
    fn default() -> Self {
        AnchorSetSolverSettings {
            max_iterations: 100,
            tolerance: 1.0e-6,
            initial_step_fraction: 0.05,
            growth_factor: 1.5,
            max_bracket_steps: 60,
        }
    }
}

/// What to do when internal forces do not balance the section forces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EquilibriumPolicy {
    /// Record the check, log a warning, keep going
    #[default]
    Lenient,
    /// Fail the analysis with `LossError::EquilibriumMismatch`
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumSettings {
    pub policy: EquilibriumPolicy,

    /// Relative tolerance; the allowance grows with the interval index
    pub tolerance: f64,
}

impl Default for EquilibriumSettings {
    fn default() -> Self {
        EquilibriumSettings {
            policy: EquilibriumPolicy::Lenient,
            tolerance: 1.0e-6,
        }
    }
}

impl EquilibriumSettings {
    /// Allowed difference between two totals in an interval
    pub fn allowance(&self, interval: usize, scale: f64) -> f64 {
        self.tolerance * (interval + 1) as f64 * scale.abs().max(1.0)
    }
}

/// Settings of the time-step loss engine
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LossConfig {
    pub method: LossMethod,
    pub strand_modeling: StrandModeling,
    pub friction: FrictionParameters,
    pub anchor_set_solver: AnchorSetSolverSettings,
    pub equilibrium: EquilibriumSettings,
}

impl LossConfig {
    /// Check the configuration can drive a time-step analysis
    pub fn validate(&self) -> LossResult<()> {
        if self.method != LossMethod::TimeStep {
            return Err(LossError::configuration(format!(
                "Time-step analysis was requested but the project loss method is '{}'. \
                 Select the time-step method in the project criteria.",
                self.method.display_name()
            )));
        }
        if self.friction.friction_coefficient < 0.0 {
            return Err(LossError::invalid_input(
                "friction_coefficient",
                self.friction.friction_coefficient.to_string(),
                "Friction coefficient cannot be negative",
            ));
        }
        if self.friction.wobble_coefficient < 0.0 {
            return Err(LossError::invalid_input(
                "wobble_coefficient",
                self.friction.wobble_coefficient.to_string(),
                "Wobble coefficient cannot be negative",
            ));
        }
        if self.friction.anchor_set < 0.0 {
            return Err(LossError::invalid_input(
                "anchor_set",
                self.friction.anchor_set.to_string(),
                "Anchor set cannot be negative",
            ));
        }
        if self.anchor_set_solver.growth_factor <= 1.0 {
            return Err(LossError::invalid_input(
                "growth_factor",
                self.anchor_set_solver.growth_factor.to_string(),
                "Bracketing step must grow",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(LossConfig::default().validate().is_ok());
    }

    #[test]
    fn test_other_methods_are_configuration_errors() {
        let config = LossConfig {
            method: LossMethod::Refined,
            ..LossConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION");
        assert!(err.to_string().contains("Refined estimate"));
    }

    #[test]
    fn test_allowance_grows_with_interval() {
        let settings = EquilibriumSettings::default();
        assert!(settings.allowance(10, 1.0) > settings.allowance(0, 1.0));
        assert_eq!(settings.allowance(0, 0.0), settings.tolerance);
    }
}
