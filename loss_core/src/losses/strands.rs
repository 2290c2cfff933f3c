//! Strand modeling strategies
//!
//! Strands of one type can be tracked as a single lumped element at the
//! centroid of the group, or one element per physical strand. Jacking force
//! is shared among elements in proportion to their area.

use crate::bridge::SteelElement;
use crate::losses::config::StrandModeling;

/// Turns the strands of one type at a POI into the elements the engine tracks
pub trait StrandDiscretization {
    fn discretize(&self, strands: Vec<SteelElement>) -> Vec<SteelElement>;
}

/// All strands of a type as one element at the group centroid
#[derive(Debug, Clone, Copy, Default)]
pub struct LumpedStrands;

impl StrandDiscretization for LumpedStrands {
    fn discretize(&self, strands: Vec<SteelElement>) -> Vec<SteelElement> {
        let area: f64 = strands.iter().map(|s| s.area).sum();
        if area == 0.0 {
            return Vec::new();
        }
        let moment: f64 = strands.iter().map(|s| s.area * s.elevation).sum();
        vec![SteelElement {
            area,
            elevation: moment / area,
        }]
    }
}

/// Every strand tracked on its own
#[derive(Debug, Clone, Copy, Default)]
pub struct IndividualStrands;

impl StrandDiscretization for IndividualStrands {
    fn discretize(&self, strands: Vec<SteelElement>) -> Vec<SteelElement> {
        strands.into_iter().filter(|s| s.area > 0.0).collect()
    }
}

pub fn strand_discretization(modeling: StrandModeling) -> &'static dyn StrandDiscretization {
    match modeling {
        StrandModeling::Lumped => &LumpedStrands,
        StrandModeling::Individual => &IndividualStrands,
    }
}

/// Share of a jacking force carried by each element
pub fn jacking_shares(elements: &[SteelElement], jacking_force: f64) -> Vec<f64> {
    let area: f64 = elements.iter().map(|s| s.area).sum();
    elements
        .iter()
        .map(|s| if area == 0.0 { 0.0 } else { jacking_force * s.area / area })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn strands() -> Vec<SteelElement> {
        vec![
            SteelElement {
                area: 140.0,
                elevation: -1750.0,
            },
            SteelElement {
                area: 140.0,
                elevation: -1750.0,
            },
            SteelElement {
                area: 140.0,
                elevation: -1650.0,
            },
        ]
    }

    #[test]
    fn test_lumped_group_centroid() {
        let lumped = strand_discretization(StrandModeling::Lumped).discretize(strands());
        assert_eq!(lumped.len(), 1);
        assert_relative_eq!(lumped[0].area, 420.0);
        // (2 x -1750 + -1650) / 3
        assert_relative_eq!(lumped[0].elevation, -1716.667, max_relative = 1e-6);
    }

    #[test]
    fn test_individual_keeps_each_strand() {
        let individual = strand_discretization(StrandModeling::Individual).discretize(strands());
        assert_eq!(individual.len(), 3);
        assert_eq!(individual[2].elevation, -1650.0);
    }

    #[test]
    fn test_no_strands() {
        assert!(LumpedStrands.discretize(Vec::new()).is_empty());
        assert!(jacking_shares(&[], 1000.0).is_empty());
    }

    #[test]
    fn test_jacking_force_split_by_area() {
        let shares = jacking_shares(&strands(), 600.0);
        assert_eq!(shares, vec![200.0, 200.0, 200.0]);
    }
}
