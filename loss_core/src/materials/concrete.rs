//! Concrete time-dependent properties per ACI 209R-92
//!
//! Ages are in days measured from casting. Strains are signed: shrinkage is
//! negative (shortening).
//!
//! ## Formulas
//!
//! - Modulus: `E(t) = E28·√[(t/(a + b·t)) / (28/(a + 28·b))]`
//! - Creep: `φ(t, t0) = (t − t0)^0.6 / (10 + (t − t0)^0.6) · φu · 1.25·t0^−0.118`
//! - Shrinkage: `ε(t) = −εu · (t − tc) / (f + (t − tc))`
//! - Age-adjusted modulus: `Ea = E(t0) / (1 + χ·φ(t, t0))`

use serde::{Deserialize, Serialize};

/// Time-dependent properties of a concrete mix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConcreteMix {
    /// Modulus of elasticity at 28 days
    pub modulus_28: f64,

    /// Strength gain parameter `a` (days)
    pub time_factor_a: f64,

    /// Strength gain parameter `b`
    pub time_factor_b: f64,

    /// Ultimate creep coefficient φu
    pub ultimate_creep: f64,

    /// Ultimate shrinkage strain εu (magnitude)
    pub ultimate_shrinkage: f64,

    /// Shrinkage time parameter `f` (35 moist cured, 55 steam cured)
    pub shrinkage_time_factor: f64,

    /// Length of curing before drying starts (days)
    pub curing_days: f64,

    /// Aging coefficient χ for the age-adjusted modulus
    pub aging_coefficient: f64,

    /// Unit weight, used for self-weight of the members cast from it
    pub unit_weight: f64,
}

impl Default for ConcreteMix {
    /// Moist-cured normal weight concrete, E28 = 30 000 MPa (N/mm²)
    fn default() -> Self {
        ConcreteMix {
            modulus_28: 30_000.0,
            time_factor_a: 4.0,
            time_factor_b: 0.85,
            ultimate_creep: 2.35,
            ultimate_shrinkage: 780.0e-6,
            shrinkage_time_factor: 35.0,
            curing_days: 1.0,
            aging_coefficient: 0.7,
            unit_weight: 24.0e-6,
        }
    }
}

impl ConcreteMix {
    /// Modulus of elasticity at an age; zero before casting
    pub fn modulus_at_age(&self, age: f64) -> f64 {
        if age <= 0.0 {
            return 0.0;
        }
        let gain = |t: f64| t / (self.time_factor_a + self.time_factor_b * t);
        self.modulus_28 * (gain(age) / gain(28.0)).sqrt()
    }

    /// Creep coefficient at `age` for load applied at `age_loaded`
    pub fn creep_coefficient(&self, age: f64, age_loaded: f64) -> f64 {
        if age_loaded <= 0.0 || age <= age_loaded {
            return 0.0;
        }
        let elapsed = (age - age_loaded).powf(0.6);
        let loading_age_factor = 1.25 * age_loaded.powf(-0.118);
        elapsed / (10.0 + elapsed) * self.ultimate_creep * loading_age_factor
    }

    /// Total free shrinkage strain at an age (negative)
    pub fn shrinkage_at_age(&self, age: f64) -> f64 {
        let drying = age - self.curing_days;
        if drying <= 0.0 {
            return 0.0;
        }
        -self.ultimate_shrinkage * drying / (self.shrinkage_time_factor + drying)
    }

    /// Age-adjusted effective modulus for load applied at `age_loaded`,
    /// evaluated at `age`
    pub fn age_adjusted_modulus(&self, age_loaded: f64, age: f64) -> f64 {
        let e = self.modulus_at_age(age_loaded);
        e / (1.0 + self.aging_coefficient * self.creep_coefficient(age, age_loaded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_modulus_growth() {
        let mix = ConcreteMix::default();
        assert_eq!(mix.modulus_at_age(0.0), 0.0);
        assert_relative_eq!(mix.modulus_at_age(28.0), 30_000.0, max_relative = 1e-12);
        // gains stiffness with age but less than 28-day value at 7 days
        assert!(mix.modulus_at_age(7.0) < mix.modulus_at_age(28.0));
        assert!(mix.modulus_at_age(365.0) > mix.modulus_at_age(28.0));
    }

    #[test]
    fn test_creep_coefficient() {
        let mix = ConcreteMix::default();
        assert_eq!(mix.creep_coefficient(10.0, 10.0), 0.0);
        assert_eq!(mix.creep_coefficient(5.0, 10.0), 0.0);

        // t0 = 1 day, t - t0 = 100 days
        // 100^0.6 = 15.849, 15.849/25.849 = 0.6131, x 2.35 x 1.25 = 1.801
        assert_relative_eq!(mix.creep_coefficient(101.0, 1.0), 1.801, max_relative = 1e-3);

        let early = mix.creep_coefficient(200.0, 1.0);
        let late = mix.creep_coefficient(200.0, 60.0);
        assert!(late < early);
    }

    #[test]
    fn test_shrinkage() {
        let mix = ConcreteMix::default();
        assert_eq!(mix.shrinkage_at_age(1.0), 0.0);
        // 35 days of drying: half of ultimate
        assert_relative_eq!(mix.shrinkage_at_age(36.0), -390.0e-6, max_relative = 1e-12);
        assert!(mix.shrinkage_at_age(10_000.0) > -780.0e-6);
    }

    #[test]
    fn test_age_adjusted_modulus() {
        let mix = ConcreteMix::default();
        // no creep, no reduction
        assert_relative_eq!(mix.age_adjusted_modulus(28.0, 28.0), mix.modulus_at_age(28.0));
        assert!(mix.age_adjusted_modulus(28.0, 400.0) < mix.modulus_at_age(28.0));
    }
}
