//! # Points of Interest
//!
//! Girder, segment and POI identifiers. A [`PointOfInterest`] is an immutable
//! sampling location along a girder; all sequencing and interpolation in the
//! engine follows the order of `dist_from_start`.
//!
//! ## Example
//!
//! ```rust
//! use loss_core::poi::{GirderKey, PoiAttributes, PointOfInterest};
//!
//! let girder = GirderKey::new(0, 1);
//! let a = PointOfInterest::new(girder, 0, 10.0, PoiAttributes::ON_SEGMENT);
//! let b = PointOfInterest::new(girder, 0, 20.0, PoiAttributes::ON_SEGMENT);
//! assert!(a < b);
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of an interval in the construction/service schedule
pub type IntervalIndex = usize;

/// Index of a post-tensioning duct within a girder
pub type DuctIndex = usize;

/// Positions closer than this are treated as the same location
pub const LOCATION_TOLERANCE: f64 = 1.0e-6;

/// Identifies a girder by group (span) and girder index within the group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GirderKey {
    pub group: usize,
    pub girder: usize,
}

impl GirderKey {
    pub fn new(group: usize, girder: usize) -> Self {
        GirderKey { group, girder }
    }

    /// Key of a segment of this girder
    pub fn segment(&self, segment: usize) -> SegmentKey {
        SegmentKey {
            group: self.group,
            girder: self.girder,
            segment,
        }
    }
}

impl fmt::Display for GirderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Group {} Girder {}", self.group + 1, girder_letter(self.girder))
    }
}

/// Identifies a precast segment of a girder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentKey {
    pub group: usize,
    pub girder: usize,
    pub segment: usize,
}

impl SegmentKey {
    pub fn girder_key(&self) -> GirderKey {
        GirderKey::new(self.group, self.girder)
    }
}

fn girder_letter(index: usize) -> String {
    let mut index = index;
    let mut label = String::new();
    loop {
        label.insert(0, (b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    label
}

/// End of a girder or tendon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberEnd {
    Start,
    End,
}

impl MemberEnd {
    pub const BOTH: [MemberEnd; 2] = [MemberEnd::Start, MemberEnd::End];

    pub fn index(&self) -> usize {
        match self {
            MemberEnd::Start => 0,
            MemberEnd::End => 1,
        }
    }
}

impl fmt::Display for MemberEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberEnd::Start => write!(f, "start"),
            MemberEnd::End => write!(f, "end"),
        }
    }
}

/// Location attributes of a POI, stored as bit flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PoiAttributes(u32);

impl PoiAttributes {
    pub const NONE: PoiAttributes = PoiAttributes(0);
    /// Location is on a precast segment
    pub const ON_SEGMENT: PoiAttributes = PoiAttributes(1 << 0);
    /// Location is inside a cast-in-place closure joint
    pub const CLOSURE: PoiAttributes = PoiAttributes(1 << 1);
    pub const CRITICAL_SECTION: PoiAttributes = PoiAttributes(1 << 2);
    pub const HARPING_POINT: PoiAttributes = PoiAttributes(1 << 3);
    pub const LIFTING: PoiAttributes = PoiAttributes(1 << 4);
    pub const HAULING: PoiAttributes = PoiAttributes(1 << 5);
    /// Tenth point or bearing location used in the analysis grid
    pub const SPAN_POINT: PoiAttributes = PoiAttributes(1 << 6);

    pub fn contains(&self, other: PoiAttributes) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn with(self, other: PoiAttributes) -> Self {
        PoiAttributes(self.0 | other.0)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }
}

impl std::ops::BitOr for PoiAttributes {
    type Output = PoiAttributes;

    fn bitor(self, rhs: PoiAttributes) -> PoiAttributes {
        self.with(rhs)
    }
}

/// A location along a girder at which losses are computed and reported.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointOfInterest {
    /// Girder the POI belongs to
    pub girder: GirderKey,

    /// Segment index within the girder
    pub segment: usize,

    /// Distance from the start of the girder
    pub dist_from_start: f64,

    /// Location attributes
    pub attributes: PoiAttributes,
}

impl PointOfInterest {
    pub fn new(
        girder: GirderKey,
        segment: usize,
        dist_from_start: f64,
        attributes: PoiAttributes,
    ) -> Self {
        PointOfInterest {
            girder,
            segment,
            dist_from_start,
            attributes,
        }
    }

    pub fn segment_key(&self) -> SegmentKey {
        self.girder.segment(self.segment)
    }

    pub fn is_on_segment(&self) -> bool {
        self.attributes.contains(PoiAttributes::ON_SEGMENT)
    }

    pub fn is_in_closure(&self) -> bool {
        self.attributes.contains(PoiAttributes::CLOSURE)
    }

    /// True when both POIs sit at the same place on the same girder
    pub fn is_at(&self, other: &PointOfInterest) -> bool {
        self.girder == other.girder
            && (self.dist_from_start - other.dist_from_start).abs() <= LOCATION_TOLERANCE
    }
}

impl PartialEq for PointOfInterest {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PointOfInterest {}

impl PartialOrd for PointOfInterest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PointOfInterest {
    fn cmp(&self, other: &Self) -> Ordering {
        self.girder
            .cmp(&other.girder)
            .then_with(|| self.dist_from_start.total_cmp(&other.dist_from_start))
    }
}
