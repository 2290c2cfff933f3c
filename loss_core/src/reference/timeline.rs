//! Construction timeline
//!
//! A timeline is a list of dated construction events. Each event becomes two
//! intervals: a zero-duration interval in which its activities happen, then a
//! time-step interval running to the next event (or to the end of the design
//! life after the last event).
//!
//! ```text
//! event:      Stress strands   Release        Erect ...
//! day:        0                1              60
//! intervals:  [0] [1 ........] [2] [3 ......] [4] [5 ...
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{LossError, LossResult};
use crate::intervals::Interval;
use crate::poi::IntervalIndex;

/// Construction activities the loss analysis cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activity {
    /// Strands are stressed in the bed and the girder is cast
    StressStrands,
    ReleasePrestress,
    StoreGirders,
    ErectGirders,
    StressTendons,
    CastDeck,
    /// Deck concrete has cured and acts with the girders
    CompositeDeck,
    InstallRailing,
    InstallOverlay,
    OpenToTraffic,
}

impl Activity {
    pub fn description(&self) -> &'static str {
        match self {
            Activity::StressStrands => "Stress strands and cast girders",
            Activity::ReleasePrestress => "Release prestress",
            Activity::StoreGirders => "Place girders in storage",
            Activity::ErectGirders => "Erect girders",
            Activity::StressTendons => "Stress tendons",
            Activity::CastDeck => "Cast deck",
            Activity::CompositeDeck => "Composite deck",
            Activity::InstallRailing => "Install railing system",
            Activity::InstallOverlay => "Install overlay",
            Activity::OpenToTraffic => "Open to traffic",
        }
    }
}

/// Activities taking place on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionEvent {
    /// Day the event occurs, counted from strand stressing
    pub day: f64,
    pub description: String,
    pub activities: Vec<Activity>,
}

impl ConstructionEvent {
    pub fn new(day: f64, activities: Vec<Activity>) -> Self {
        let description = activities
            .iter()
            .map(|a| a.description())
            .collect::<Vec<_>>()
            .join(", ");
        ConstructionEvent {
            day,
            description,
            activities,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub events: Vec<ConstructionEvent>,

    /// Day at which the analysis ends
    pub design_life: f64,
}

impl Timeline {
    pub fn interval_count(&self) -> usize {
        2 * self.events.len()
    }

    /// Times of an interval; intervals past the end collapse onto the design life
    pub fn interval(&self, interval: IntervalIndex) -> Interval {
        let Some(event) = self.events.get(interval / 2) else {
            return Interval::new(self.design_life, self.design_life);
        };
        if interval % 2 == 0 {
            return Interval::new(event.day, event.day);
        }
        let end = self
            .events
            .get(interval / 2 + 1)
            .map_or(self.design_life, |next| next.day);
        Interval::new(event.day, end.max(event.day))
    }

    pub fn description(&self, interval: IntervalIndex) -> String {
        match self.events.get(interval / 2) {
            Some(event) if interval % 2 == 0 => event.description.clone(),
            Some(event) => format!("Time step after: {}", event.description),
            None => format!("Interval {}", interval + 1),
        }
    }

    /// Zero-duration interval of the first event holding `activity`
    pub fn activity_interval(&self, activity: Activity) -> Option<IntervalIndex> {
        self.events
            .iter()
            .position(|event| event.activities.contains(&activity))
            .map(|event| 2 * event)
    }

    pub fn activity_day(&self, activity: Activity) -> Option<f64> {
        self.events
            .iter()
            .find(|event| event.activities.contains(&activity))
            .map(|event| event.day)
    }

    /// Interval of a required activity
    pub fn required(&self, activity: Activity) -> LossResult<IntervalIndex> {
        self.activity_interval(activity).ok_or_else(|| {
            LossError::missing_field(format!("timeline activity '{}'", activity.description()))
        })
    }

    /// Check the timeline can drive an analysis.
    ///
    /// `tendons` and `deck` tell whether the bridge has post-tensioning and a
    /// cast deck, which makes their activities mandatory.
    pub fn validate(&self, tendons: bool, deck: bool) -> LossResult<()> {
        if self.events.is_empty() {
            return Err(LossError::missing_field("timeline.events"));
        }
        for pair in self.events.windows(2) {
            if pair[1].day < pair[0].day {
                return Err(LossError::invalid_input(
                    "timeline.events",
                    pair[1].day.to_string(),
                    format!("'{}' occurs before '{}'", pair[1].description, pair[0].description),
                ));
            }
        }
        let last = self.events.last().map_or(0.0, |event| event.day);
        if self.design_life < last {
            return Err(LossError::invalid_input(
                "timeline.design_life",
                self.design_life.to_string(),
                "Design life ends before the last construction event",
            ));
        }

        let stress = self.required(Activity::StressStrands)?;
        let release = self.required(Activity::ReleasePrestress)?;
        let erect = self.required(Activity::ErectGirders)?;
        self.required(Activity::OpenToTraffic)?;
        if release <= stress || self.day_of(release) <= self.day_of(stress) {
            return Err(LossError::invalid_input(
                "timeline",
                self.description(release),
                "Prestress must be released after the girder concrete has been cast",
            ));
        }
        if erect < release {
            return Err(LossError::invalid_input(
                "timeline",
                self.description(erect),
                "Girders cannot be erected before prestress is released",
            ));
        }
        if tendons {
            let stressing = self.required(Activity::StressTendons)?;
            if stressing < release {
                return Err(LossError::invalid_input(
                    "timeline",
                    self.description(stressing),
                    "Tendons cannot be stressed before prestress is released",
                ));
            }
        }
        if deck {
            let cast = self.required(Activity::CastDeck)?;
            let composite = self.required(Activity::CompositeDeck)?;
            if composite <= cast || self.day_of(composite) <= self.day_of(cast) {
                return Err(LossError::invalid_input(
                    "timeline",
                    self.description(composite),
                    "The deck must cure before it acts compositely",
                ));
            }
        }
        Ok(())
    }

    fn day_of(&self, interval: IntervalIndex) -> f64 {
        self.interval(interval).start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline() -> Timeline {
        Timeline {
            events: vec![
                ConstructionEvent::new(0.0, vec![Activity::StressStrands]),
                ConstructionEvent::new(1.0, vec![Activity::ReleasePrestress]),
                ConstructionEvent::new(60.0, vec![Activity::ErectGirders]),
                ConstructionEvent::new(120.0, vec![Activity::OpenToTraffic]),
            ],
            design_life: 10_000.0,
        }
    }

    #[test]
    fn test_events_become_interval_pairs() {
        let timeline = timeline();
        assert_eq!(timeline.interval_count(), 8);
        assert_eq!(timeline.interval(2), Interval::new(1.0, 1.0));
        assert_eq!(timeline.interval(3), Interval::new(1.0, 60.0));
        assert_eq!(timeline.interval(7), Interval::new(120.0, 10_000.0));
        assert_eq!(timeline.activity_interval(Activity::ErectGirders), Some(4));
        assert_eq!(timeline.activity_interval(Activity::CastDeck), None);
        assert_eq!(timeline.description(3), "Time step after: Release prestress");
    }

    #[test]
    fn test_valid_timeline() {
        assert!(timeline().validate(false, false).is_ok());
    }

    #[test]
    fn test_missing_deck_activities() {
        let err = timeline().validate(false, true).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_FIELD");
    }

    #[test]
    fn test_release_same_day_as_casting() {
        let mut timeline = timeline();
        timeline.events[1].day = 0.0;
        let err = timeline.validate(false, false).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_events_out_of_order() {
        let mut timeline = timeline();
        timeline.events[2].day = 0.5;
        assert!(timeline.validate(false, false).is_err());
    }
}
