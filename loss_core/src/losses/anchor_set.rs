//! Anchor set (seating) losses
//!
//! When the jack releases, the tendon slips into the anchorage by Δset. The
//! slip is resisted by friction over a zone of length `L_set` measured from
//! the anchorage, found from
//!
//! ```text
//! Δset = (1/E) ∫₀^L_set [Δf_pF(L_set) − Δf_pF(s)] ds
//! ```
//!
//! The root is bracketed by growing steps from an initial guess of half the
//! end span, then refined by false position. When the same bound is replaced
//! twice in a row the residual at the stale bound is halved.
//!
//! The loss at the anchorage is `Δf_pAT = 2·[Δf_pF(L_set) − Δf_pF(0)]`; the loss
//! at the end of the zone, `Δf_pS`, is zero unless the zone reaches past the
//! point of zero slip. In between the loss varies linearly.

use crate::bridge::JackingEnd;
use crate::errors::{LossError, LossResult};
use crate::losses::config::AnchorSetSolverSettings;
use crate::poi::MemberEnd;

use super::details::{AnchorSetResult, FrictionLoss};

/// Everything the solver needs to know about one duct
#[derive(Debug, Clone, Copy)]
pub struct AnchorSetProblem<'a> {
    pub duct: usize,
    /// Friction losses at the POIs on the girder, ordered by position
    pub losses: &'a [FrictionLoss],
    pub strand_count: usize,
    pub jacking_end: JackingEnd,
    pub girder_length: f64,
    pub tendon_modulus: f64,
    pub anchor_set: f64,
    /// Length of the span at each end, by [`MemberEnd::index`]
    pub end_span_length: [f64; 2],
}

/// Friction loss profile measured from an anchorage, ascending distance
struct Profile {
    points: Vec<(f64, f64)>,
}

impl Profile {
    fn loss_at(&self, s: f64) -> f64 {
        let points = &self.points;
        match points.len() {
            0 => 0.0,
            1 => points[0].1,
            n => {
                let k = points
                    .partition_point(|(sk, _)| *sk < s)
                    .clamp(1, n - 1);
                let (s1, f1) = points[k - 1];
                let (s2, f2) = points[k];
                if s2 == s1 {
                    f1
                } else {
                    f1 + (f2 - f1) * (s - s1) / (s2 - s1)
                }
            }
        }
    }

    fn reach(&self) -> f64 {
        self.points.last().map_or(0.0, |(s, _)| *s)
    }

    /// Seating for a trial zone length
    fn seating(&self, zone: f64, modulus: f64) -> f64 {
        if modulus == 0.0 || zone <= 0.0 {
            return 0.0;
        }
        let f_set = self.loss_at(zone);
        let mut sum = 0.0;
        for pair in self.points.windows(2) {
            let (s1, f1) = pair[0];
            let (s2, f2) = pair[1];
            if zone <= s1 {
                break;
            }
            if zone < s2 {
                sum += 0.5 * (f_set - f1) * (zone - s1);
            } else {
                sum += 0.5 * ((f_set - f1) + (f_set - f2)) * (s2 - s1);
            }
        }
        let reach = self.reach();
        if reach < zone {
            let f_end = self.points.last().map_or(0.0, |(_, f)| *f);
            sum += 0.5 * (f_set - f_end) * (zone - reach);
        }
        sum / modulus
    }
}

/// Index of the POI where strands do not slip
pub fn zero_slip_index(losses: &[FrictionLoss], jacking_end: JackingEnd) -> usize {
    let last = losses.len().saturating_sub(1);
    match jacking_end {
        JackingEnd::Start => last,
        JackingEnd::End => 0,
        JackingEnd::Both => losses
            .windows(2)
            .position(|pair| pair[1].dfp_f < pair[0].dfp_f)
            .unwrap_or(last),
    }
}

fn profile_from(
    losses: &[FrictionLoss],
    zero_slip: usize,
    end: MemberEnd,
    girder_length: f64,
) -> Profile {
    let points = match end {
        MemberEnd::Start => losses[..=zero_slip].iter().map(|l| (l.x, l.dfp_f)).collect(),
        MemberEnd::End => losses[zero_slip..]
            .iter()
            .rev()
            .map(|l| (girder_length - l.x, l.dfp_f))
            .collect(),
    };
    Profile { points }
}

#[derive(PartialEq)]
enum Side {
    Low,
    High,
}

/// Zone length at one end and the iterations used
fn solve_zone(
    profile: &Profile,
    problem: &AnchorSetProblem<'_>,
    end: MemberEnd,
    settings: &AnchorSetSolverSettings,
) -> LossResult<(f64, usize)> {
    let target = problem.anchor_set;
    let modulus = problem.tendon_modulus;
    let residual = |zone: f64| profile.seating(zone, modulus) - target;
    let tolerance = settings.tolerance * target;
    let not_converged = |iterations: usize| LossError::NonConvergence {
        duct: problem.duct,
        end: end.to_string(),
        iterations,
    };

    let span = problem.end_span_length[end.index()].max(problem.girder_length);
    let mut step = (settings.initial_step_fraction * span).max(f64::EPSILON);
    let guess = 0.5 * problem.end_span_length[end.index()];
    let r_guess = residual(guess);
    if r_guess.abs() <= tolerance {
        return Ok((guess, 0));
    }

    // bracket the root
    let (mut lo, mut r_lo, mut hi, mut r_hi);
    if r_guess < 0.0 {
        lo = guess;
        r_lo = r_guess;
        let mut steps = 0;
        loop {
            hi = lo + step;
            r_hi = residual(hi);
            if 0.0 <= r_hi {
                break;
            }
            lo = hi;
            r_lo = r_hi;
            step *= settings.growth_factor;
            steps += 1;
            if settings.max_bracket_steps <= steps {
                return Err(not_converged(0));
            }
        }
    } else {
        hi = guess;
        r_hi = r_guess;
        loop {
            lo = (hi - step).max(0.0);
            r_lo = residual(lo);
            if r_lo <= 0.0 {
                break;
            }
            hi = lo;
            r_hi = r_lo;
            step *= settings.growth_factor;
        }
    }
    if r_lo.abs() <= tolerance {
        return Ok((lo, 0));
    }
    if r_hi.abs() <= tolerance {
        return Ok((hi, 0));
    }

    // false position
    let mut last_side: Option<Side> = None;
    for iteration in 1..=settings.max_iterations {
        let zone = hi - r_hi * (hi - lo) / (r_hi - r_lo);
        let r = residual(zone);
        if r.abs() <= tolerance {
            log::debug!(
                "Anchor set zone of duct {} at the {} end: {:.3} after {} iterations",
                problem.duct,
                end,
                zone,
                iteration
            );
            return Ok((zone, iteration));
        }
        if r < 0.0 {
            lo = zone;
            r_lo = r;
            if last_side == Some(Side::Low) {
                r_hi *= 0.5;
            }
            last_side = Some(Side::Low);
        } else {
            hi = zone;
            r_hi = r;
            if last_side == Some(Side::High) {
                r_lo *= 0.5;
            }
            last_side = Some(Side::High);
        }
    }
    Err(not_converged(settings.max_iterations))
}

/// Solve the anchor-set zones of a duct
pub fn solve_anchor_set(
    problem: &AnchorSetProblem<'_>,
    settings: &AnchorSetSolverSettings,
) -> LossResult<AnchorSetResult> {
    let mut result = AnchorSetResult::default();
    if problem.strand_count == 0 || problem.losses.is_empty() {
        return Ok(result);
    }

    let zero_slip = zero_slip_index(problem.losses, problem.jacking_end);
    result.zero_slip = problem.losses[zero_slip].x;
    if problem.anchor_set <= 0.0 {
        return Ok(result);
    }

    for end in MemberEnd::BOTH {
        if !problem.jacking_end.is_jacked(end) {
            continue;
        }
        let profile = profile_from(problem.losses, zero_slip, end, problem.girder_length);
        let (zone, iterations) = solve_zone(&profile, problem, end, settings)?;

        let f_set = profile.loss_at(zone);
        let f_anchor = profile.points.first().map_or(0.0, |(_, f)| *f);
        let f_zero_slip = profile.points.last().map_or(0.0, |(_, f)| *f);

        let i = end.index();
        result.lset[i] = zone.min(problem.girder_length);
        result.dfp_at[i] = 2.0 * (f_set - f_anchor);
        result.dfp_s[i] = if zone <= profile.reach() {
            0.0
        } else {
            2.0 * (f_set - f_zero_slip)
        };
        result.iterations[i] = iterations;
    }
    Ok(result)
}

/// Anchor-set loss at a distance from the start of the girder.
///
/// Each jacked end covers its own side of the zero-slip point, running
/// linearly from `Δf_pAT` at the anchorage to `Δf_pS` where its zone stops:
/// the end of the zone, or the zero-slip point when the zone reaches past it.
pub fn anchor_set_loss(result: &AnchorSetResult, x: f64, girder_length: f64) -> f64 {
    let start_jacked = 0.0 < result.lset[MemberEnd::Start.index()];
    MemberEnd::BOTH
        .iter()
        .map(|end| {
            let i = end.index();
            let lset = result.lset[i];
            let (s, to_zero_slip) = match end {
                MemberEnd::Start => (x, result.zero_slip),
                MemberEnd::End => (girder_length - x, girder_length - result.zero_slip),
            };
            let extent = lset.min(to_zero_slip);
            // at the zero-slip point itself the start side answers
            let shared =
                *end == MemberEnd::End && start_jacked && extent == to_zero_slip && s == extent;
            if lset <= 0.0 || s < 0.0 || extent < s || shared {
                0.0
            } else if extent <= 0.0 {
                result.dfp_at[i]
            } else {
                result.dfp_at[i] + (result.dfp_s[i] - result.dfp_at[i]) * s / extent
            }
        })
        .sum()
}

/// Average friction and anchor-set loss over the given losses
pub fn average_losses(losses: &[FrictionLoss]) -> (f64, f64) {
    if losses.is_empty() {
        return (0.0, 0.0);
    }
    let n = losses.len() as f64;
    let friction: f64 = losses.iter().map(|l| l.dfp_f).sum();
    let anchor_set: f64 = losses.iter().map(|l| l.dfp_a).sum();
    (friction / n, anchor_set / n)
}
