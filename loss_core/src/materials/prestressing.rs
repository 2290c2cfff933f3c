//! Prestressing steel
//!
//! Intrinsic relaxation follows the log-time expression for stress-relieved
//! and low-relaxation strand:
//!
//! ```text
//! Δf_pR = f_pe · [log(24·t2 + 1) − log(24·t1 + 1)] / K · (f_pe/f_py − 0.55)
//! ```
//!
//! with times in days since stressing, K = 45 for low-relaxation strand and
//! K = 10 for stress-relieved strand. No relaxation occurs below
//! `0.55·f_py`.

use serde::{Deserialize, Serialize};

/// Strand grade and relaxation behavior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrestressingSteel {
    /// Modulus of elasticity
    pub modulus: f64,

    /// Specified tensile strength
    pub fpu: f64,

    /// Yield strength
    pub fpy: f64,

    /// Relaxation constant K
    pub relaxation_constant: f64,
}

impl Default for PrestressingSteel {
    /// Grade 1860 low-relaxation strand (MPa)
    fn default() -> Self {
        PrestressingSteel {
            modulus: 197_000.0,
            fpu: 1860.0,
            fpy: 0.9 * 1860.0,
            relaxation_constant: 45.0,
        }
    }
}

impl PrestressingSteel {
    /// Relaxation loss between `t_start` and `t_end` for steel at stress `fpe`
    pub fn relaxation(&self, fpe: f64, t_start: f64, t_end: f64) -> f64 {
        if t_end <= t_start || self.fpy <= 0.0 || self.relaxation_constant <= 0.0 {
            return 0.0;
        }
        let stress_ratio = fpe / self.fpy - 0.55;
        if stress_ratio <= 0.0 {
            return 0.0;
        }
        let log_time = (24.0 * t_end + 1.0).log10() - (24.0 * t_start.max(0.0) + 1.0).log10();
        fpe * log_time / self.relaxation_constant * stress_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_relaxation_first_day() {
        let steel = PrestressingSteel::default();
        // fpe = 1395, fpy = 1674: ratio - 0.55 = 0.28333
        // log10(25) = 1.39794
        // 1395 x 1.39794 / 45 x 0.28333 = 12.278
        assert_relative_eq!(steel.relaxation(1395.0, 0.0, 1.0), 12.278, max_relative = 1e-3);
    }

    #[test]
    fn test_no_relaxation_at_low_stress() {
        let steel = PrestressingSteel::default();
        assert_eq!(steel.relaxation(0.5 * 1674.0, 0.0, 100.0), 0.0);
    }

    #[test]
    fn test_no_relaxation_without_time() {
        let steel = PrestressingSteel::default();
        assert_eq!(steel.relaxation(1400.0, 10.0, 10.0), 0.0);
    }
}
