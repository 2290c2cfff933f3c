//! Tendon friction losses
//!
//! ```text
//! Δf_pF = f_pj · (1 − e^−(μ·α + k·x))
//! ```
//!
//! where `x` is the distance from the stressing end and `α` the angular
//! change between the stressing end and the POI. A tendon jacked from both
//! ends is stressed from whichever end is closer.
//!
//! Elongation is the integral of tendon force along the girder divided by
//! `E·A`, booked at the jacked end (split evenly when both ends are jacked).

use crate::bridge::{DuctData, JackingEnd, PrestressGeometry};
use crate::losses::config::FrictionParameters;
use crate::poi::{GirderKey, MemberEnd, PointOfInterest};

use super::details::FrictionLoss;

/// Friction loss for a stress, angular change and length
pub fn friction_loss(fpj: f64, params: &FrictionParameters, alpha: f64, x: f64) -> f64 {
    fpj * (1.0 - (-(params.friction_coefficient * alpha + params.wobble_coefficient * x)).exp())
}

/// End a POI is stressed from
pub fn stressing_end(jacking_end: JackingEnd, x: f64, girder_length: f64) -> MemberEnd {
    match jacking_end {
        JackingEnd::Start => MemberEnd::Start,
        JackingEnd::End => MemberEnd::End,
        JackingEnd::Both => {
            if x < girder_length / 2.0 {
                MemberEnd::Start
            } else {
                MemberEnd::End
            }
        }
    }
}

/// Friction losses of one duct at every POI and its elongation
#[derive(Debug, Clone, PartialEq)]
pub struct DuctFriction {
    /// One entry per POI, in POI order
    pub losses: Vec<FrictionLoss>,
    /// Elongation by [`MemberEnd::index`]
    pub elongation: [f64; 2],
}

/// True when the POI lies within the girder
pub fn is_on_girder(poi: &PointOfInterest, girder_length: f64) -> bool {
    (0.0..=girder_length).contains(&poi.dist_from_start)
}

/// Walk the POIs of a girder once for one duct.
///
/// `pois` must be ordered by position.
pub fn duct_friction<G: PrestressGeometry + ?Sized>(
    geometry: &G,
    girder: GirderKey,
    duct_index: usize,
    pois: &[PointOfInterest],
    girder_length: f64,
    params: &FrictionParameters,
    tendon_modulus: f64,
) -> DuctFriction {
    let duct: DuctData = geometry.duct(girder, duct_index);
    let fpj = duct.jacking_stress();
    let aps = duct.tendon_area();

    let mut losses = Vec::with_capacity(pois.len());
    for poi in pois {
        let x = poi.dist_from_start;
        if duct.strand_count == 0 {
            losses.push(FrictionLoss {
                x,
                ..FrictionLoss::default()
            });
            continue;
        }
        let end = stressing_end(duct.jacking_end, x, girder_length);
        let x_from_jacking = match end {
            MemberEnd::Start => x,
            MemberEnd::End => girder_length - x,
        };
        let alpha = geometry.angular_change(poi, duct_index, end);
        losses.push(FrictionLoss {
            x,
            x_from_jacking,
            alpha,
            dfp_f: friction_loss(fpj, params, alpha, x_from_jacking),
            dfp_a: 0.0,
        });
    }

    // force-length integral between consecutive POIs on the girder
    let mut force_length = 0.0;
    let mut previous: Option<&FrictionLoss> = None;
    for (poi, loss) in pois.iter().zip(losses.iter()) {
        if !is_on_girder(poi, girder_length) {
            continue;
        }
        if let Some(prev) = previous {
            let average_loss = 0.5 * (prev.dfp_f + loss.dfp_f);
            force_length += aps * (fpj - average_loss) * (loss.x - prev.x);
        }
        previous = Some(loss);
    }

    let ea = tendon_modulus * aps;
    let total = if ea == 0.0 { 0.0 } else { force_length / ea };
    let elongation = match duct.jacking_end {
        JackingEnd::Start => [total, 0.0],
        JackingEnd::End => [0.0, total],
        JackingEnd::Both => [0.5 * total, 0.5 * total],
    };

    DuctFriction { losses, elongation }
}
