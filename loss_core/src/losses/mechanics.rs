//! Transformed-section mechanics
//!
//! Small pure functions used to distribute section force increments to the
//! components of a composite section. Elevations are in girder section
//! coordinates (see [`crate::bridge`]).
//!
//! A component or section with zero area or zero inertia contributes zero
//! strain, curvature and force.

use serde::{Deserialize, Serialize};

use crate::bridge::{NetSection, TransformedSection};

/// `num / den`, or zero when `den` is zero
pub fn safe_ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Axial strain at the transformed centroid and curvature
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Deformation {
    pub strain: f64,
    pub curvature: f64,
}

impl Deformation {
    /// Deformation of a section with reference modulus `e` under `p` and `m`
    pub fn of_section(p: f64, m: f64, e: f64, section: &TransformedSection) -> Self {
        Deformation {
            strain: safe_ratio(p, e * section.area),
            curvature: safe_ratio(m, e * section.inertia),
        }
    }

    /// Axial strain at an elevation
    pub fn strain_at(&self, centroid: f64, elevation: f64) -> f64 {
        self.strain + self.curvature * (centroid - elevation)
    }
}

/// Stiffness and position of one component of a composite section
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComponentStiffness {
    pub modulus: f64,
    pub area: f64,
    pub inertia: f64,
    /// Elevation of the component centroid
    pub elevation: f64,
}

impl ComponentStiffness {
    /// Force and moment picked up by the component
    pub fn share(&self, deformation: &Deformation, transformed_centroid: f64) -> (f64, f64) {
        let strain = deformation.strain_at(transformed_centroid, self.elevation);
        (
            strain * self.modulus * self.area,
            deformation.curvature * self.modulus * self.inertia,
        )
    }
}

/// Moment of a component force about the transformed centroid
pub fn moment_about_centroid(
    force: f64,
    moment: f64,
    transformed_centroid: f64,
    elevation: f64,
) -> f64 {
    moment + force * (transformed_centroid - elevation)
}

/// Stress at an elevation of a component carrying `p` at its centroid and `m`
pub fn fiber_stress(p: f64, m: f64, section: &NetSection, elevation: f64) -> f64 {
    safe_ratio(p, section.area) + safe_ratio(m * (section.centroid - elevation), section.inertia)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Girder 400 000 mm² at -800, deck 500 000 mm² at +100, Ea both 30 000
    fn two_part_section() -> (TransformedSection, [ComponentStiffness; 2]) {
        let girder = ComponentStiffness {
            modulus: 30_000.0,
            area: 400_000.0,
            inertia: 8.0e10,
            elevation: -800.0,
        };
        let deck = ComponentStiffness {
            modulus: 30_000.0,
            area: 500_000.0,
            inertia: 1.67e9,
            elevation: 100.0,
        };
        let area = girder.area + deck.area;
        let centroid = (girder.area * girder.elevation + deck.area * deck.elevation) / area;
        let inertia = girder.inertia
            + girder.area * (girder.elevation - centroid).powi(2)
            + deck.inertia
            + deck.area * (deck.elevation - centroid).powi(2);
        (
            TransformedSection {
                area,
                inertia,
                centroid,
            },
            [girder, deck],
        )
    }

    #[test]
    fn test_zero_stiffness_is_safe() {
        let empty = TransformedSection::default();
        let deformation = Deformation::of_section(1000.0, 1.0e6, 30_000.0, &empty);
        assert_eq!(deformation, Deformation::default());
        assert_eq!(fiber_stress(10.0, 10.0, &NetSection::default(), 5.0), 0.0);
    }

    #[test]
    fn test_distribution_is_in_equilibrium() {
        let (section, components) = two_part_section();
        let (p, m) = (-2.0e6, 3.0e9);
        let deformation = Deformation::of_section(p, m, 30_000.0, &section);

        let mut p_int = 0.0;
        let mut m_int = 0.0;
        for component in &components {
            let (dp, dm) = component.share(&deformation, section.centroid);
            p_int += dp;
            m_int += moment_about_centroid(dp, dm, section.centroid, component.elevation);
        }
        assert_relative_eq!(p_int, p, max_relative = 1e-9);
        assert_relative_eq!(m_int, m, max_relative = 1e-9);
    }

    #[test]
    fn test_sagging_moment_compresses_top() {
        let net = NetSection {
            area: 100.0,
            inertia: 1000.0,
            centroid: -5.0,
            top: 0.0,
            bottom: -10.0,
        };
        // M = 100, c = 5: top -0.5, bottom +0.5
        assert_relative_eq!(fiber_stress(0.0, 100.0, &net, net.top), -0.5);
        assert_relative_eq!(fiber_stress(0.0, 100.0, &net, net.bottom), 0.5);
    }
}
