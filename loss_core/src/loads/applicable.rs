//! Applicable load set
//!
//! Decides which product load types produce a section force increment at a
//! segment during an interval. A load produces an increment in the interval
//! it is applied in. Dead loads already on the structure produce further
//! increments whenever the support conditions change: at storage, at
//! erection, and at each temporary support removal.

use crate::intervals::IntervalSchedule;
use crate::poi::{IntervalIndex, SegmentKey};

use super::ProductForce;

/// Product load types acting on `segment` during `interval`.
///
/// `tendon_stressing` holds the stressing interval of each duct in the
/// girder.
pub fn applicable_loads<S: IntervalSchedule + ?Sized>(
    schedule: &S,
    segment: SegmentKey,
    tendon_stressing: &[IntervalIndex],
    interval: IntervalIndex,
) -> Vec<ProductForce> {
    let girder = segment.girder_key();
    let release = schedule.release_interval(segment);

    // Intervals where the support conditions of the girder change
    let mut boundary_changes: Vec<IntervalIndex> =
        schedule.temporary_support_removal_intervals(girder);
    if let Some(storage) = schedule.storage_interval(segment) {
        boundary_changes.push(storage);
    }
    boundary_changes.push(schedule.erect_segment_interval(segment));

    let applies = |applied_at: Option<IntervalIndex>| -> bool {
        match applied_at {
            Some(applied) => {
                applied == interval
                    || (applied < interval && boundary_changes.contains(&interval))
            }
            None => false,
        }
    };

    let mut loads = Vec::new();

    if applies(Some(release)) {
        loads.push(ProductForce::GirderSelfWeight);
    }

    let cast_deck = schedule.cast_deck_interval();
    if applies(cast_deck) {
        loads.push(ProductForce::Diaphragm);
        loads.push(ProductForce::Deck);
    }

    let railing = schedule.railing_system_interval();
    if applies(railing) {
        loads.push(ProductForce::TrafficBarrier);
        loads.push(ProductForce::Sidewalk);
    }

    if applies(schedule.overlay_interval()) {
        loads.push(ProductForce::Overlay);
    }

    for user_load in [ProductForce::UserDc, ProductForce::UserDw] {
        let intervals = schedule.user_load_intervals(girder, user_load);
        if intervals.iter().any(|applied| applies(Some(*applied))) {
            loads.push(user_load);
        }
    }

    if interval == release {
        loads.push(ProductForce::Pretension);
    }

    if tendon_stressing.iter().any(|stressed| applies(Some(*stressed))) {
        loads.push(ProductForce::PostTensioning);
    }

    if release <= interval && 0.0 < schedule.interval(interval).duration() {
        loads.push(ProductForce::Creep);
        loads.push(ProductForce::Shrinkage);
        loads.push(ProductForce::Relaxation);
    }

    loads
}
