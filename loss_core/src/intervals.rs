//! # Interval Schedule
//!
//! The construction and service timeline is divided into sequential
//! intervals. Each interval has start, middle and end times (in days) and a
//! non-negative duration. Activities such as strand stressing, prestress
//! release, or deck casting are tied to the interval in which they occur.
//!
//! The schedule itself is supplied by the host through [`IntervalSchedule`];
//! the engine only consumes it in increasing index order.

use serde::{Deserialize, Serialize};

use crate::loads::ProductForce;
use crate::poi::{DuctIndex, GirderKey, IntervalIndex, SegmentKey};

/// A span of time in the analysis timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Time at the start of the interval (days)
    pub start: f64,

    /// Time at the end of the interval (days)
    pub end: f64,
}

impl Interval {
    pub fn new(start: f64, end: f64) -> Self {
        Interval { start, end }
    }

    pub fn middle(&self) -> f64 {
        0.5 * (self.start + self.end)
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Time at the requested point of the interval
    pub fn time_at(&self, at: IntervalTime) -> f64 {
        match at {
            IntervalTime::Start => self.start,
            IntervalTime::Middle => self.middle(),
            IntervalTime::End => self.end,
        }
    }
}

/// A point within an interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalTime {
    Start,
    Middle,
    End,
}

/// Source of the interval timeline and the activities scheduled in it.
pub trait IntervalSchedule {
    /// Number of intervals in the timeline
    fn interval_count(&self) -> usize;

    /// Times of an interval
    fn interval(&self, interval: IntervalIndex) -> Interval;

    /// Short description of an interval, for reporting
    fn description(&self, interval: IntervalIndex) -> String {
        format!("Interval {}", interval + 1)
    }

    /// Interval in which pretensioned strands are stressed in the bed
    fn stress_strand_interval(&self, segment: SegmentKey) -> IntervalIndex;

    /// Interval in which prestress is transferred to the segment
    fn release_interval(&self, segment: SegmentKey) -> IntervalIndex;

    /// Interval in which the segment is placed in storage, if tracked separately
    fn storage_interval(&self, _segment: SegmentKey) -> Option<IntervalIndex> {
        None
    }

    /// Interval in which the segment is erected on its permanent supports
    fn erect_segment_interval(&self, segment: SegmentKey) -> IntervalIndex;

    /// Interval in which the closure joint at the end of the segment becomes
    /// composite, or `None` when the segment has no closure joint
    fn composite_closure_interval(&self, segment: SegmentKey) -> Option<IntervalIndex>;

    /// Interval in which a post-tensioning duct is stressed
    fn stress_tendon_interval(&self, girder: GirderKey, duct: DuctIndex) -> IntervalIndex;

    /// Interval in which the deck is cast, `None` for bridges without a cast deck
    fn cast_deck_interval(&self) -> Option<IntervalIndex>;

    /// Interval in which the deck becomes composite with the girders
    fn composite_deck_interval(&self) -> Option<IntervalIndex>;

    /// Interval in which railings/barriers are installed
    fn railing_system_interval(&self) -> Option<IntervalIndex>;

    /// Interval in which the future overlay is installed
    fn overlay_interval(&self) -> Option<IntervalIndex>;

    /// First interval in which live load acts
    fn live_load_interval(&self) -> IntervalIndex;

    /// Intervals in which temporary supports under the girder are removed
    fn temporary_support_removal_intervals(&self, girder: GirderKey) -> Vec<IntervalIndex>;

    /// Intervals in which user-defined loads of the given kind are applied
    fn user_load_intervals(&self, _girder: GirderKey, _load: ProductForce) -> Vec<IntervalIndex> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_times() {
        let interval = Interval::new(10.0, 30.0);
        assert_eq!(interval.middle(), 20.0);
        assert_eq!(interval.duration(), 20.0);
        assert_eq!(interval.time_at(IntervalTime::End), 30.0);
    }

    #[test]
    fn test_zero_duration_interval() {
        let interval = Interval::new(28.0, 28.0);
        assert_eq!(interval.duration(), 0.0);
        assert_eq!(interval.middle(), 28.0);
    }
}
