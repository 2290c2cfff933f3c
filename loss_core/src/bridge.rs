//! # Bridge Providers
//!
//! Read-only views of the bridge the engine needs: topology, section
//! properties, and the layout of reinforcement, strands and tendons.
//!
//! ## Girder section coordinates
//!
//! All elevations are measured in girder section coordinates: the origin is
//! at the top of the girder and elevations are positive upward. Girder fibers
//! therefore have negative elevations and a deck sits at positive elevations.
//! With this convention the strain at elevation `y` produced by a section
//! force `P` and a sagging moment `M` is
//!
//! ```text
//! ε(y) = P/(E·A_tr) + M·(Y_tr − y)/(E·I_tr)
//! ```

use serde::{Deserialize, Serialize};

use crate::poi::{DuctIndex, GirderKey, IntervalIndex, MemberEnd, PointOfInterest, SegmentKey};

/// Composite section properties transformed to the girder concrete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformedSection {
    pub area: f64,
    pub inertia: f64,
    /// Elevation of the centroid
    pub centroid: f64,
}

/// Net properties of a single concrete component (girder or deck).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NetSection {
    pub area: f64,
    pub inertia: f64,
    /// Elevation of the centroid
    pub centroid: f64,
    /// Elevation of the top fiber
    pub top: f64,
    /// Elevation of the bottom fiber
    pub bottom: f64,
}

impl NetSection {
    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }
}

/// A row of mild reinforcement
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RebarLayer {
    pub area: f64,
    pub elevation: f64,
}

/// Top and bottom mats of deck reinforcement
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckRebar {
    pub top: RebarLayer,
    pub bottom: RebarLayer,
}

/// A single piece of prestressing steel (one strand, or a lumped group)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SteelElement {
    pub area: f64,
    pub elevation: f64,
}

/// Pretensioned strand types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrandType {
    Straight,
    Harped,
    Temporary,
}

impl StrandType {
    pub const ALL: [StrandType; 3] =
        [StrandType::Straight, StrandType::Harped, StrandType::Temporary];

    pub fn index(&self) -> usize {
        match self {
            StrandType::Straight => 0,
            StrandType::Harped => 1,
            StrandType::Temporary => 2,
        }
    }
}

impl std::fmt::Display for StrandType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrandType::Straight => write!(f, "Straight"),
            StrandType::Harped => write!(f, "Harped"),
            StrandType::Temporary => write!(f, "Temporary"),
        }
    }
}

/// End(s) of a tendon that are jacked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JackingEnd {
    Start,
    End,
    Both,
}

impl JackingEnd {
    pub fn is_jacked(&self, end: MemberEnd) -> bool {
        match (self, end) {
            (JackingEnd::Both, _) => true,
            (JackingEnd::Start, MemberEnd::Start) => true,
            (JackingEnd::End, MemberEnd::End) => true,
            _ => false,
        }
    }
}

/// How the jacking force of a tendon is specified
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum JackingForce {
    /// Total jacking force
    Force(f64),
    /// Target jacking stress applied to the nominal strand area
    Stress(f64),
}

/// A post-tensioning duct and the tendon inside it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DuctData {
    pub strand_count: usize,
    /// Nominal area of one strand
    pub strand_area: f64,
    pub jacking_end: JackingEnd,
    pub jacking: JackingForce,
}

impl DuctData {
    /// Total area of prestressing steel in the duct
    pub fn tendon_area(&self) -> f64 {
        self.strand_count as f64 * self.strand_area
    }

    pub fn jacking_force(&self) -> f64 {
        match self.jacking {
            JackingForce::Force(force) => force,
            JackingForce::Stress(stress) => stress * self.tendon_area(),
        }
    }

    /// Jacking stress; zero for an empty duct
    pub fn jacking_stress(&self) -> f64 {
        if self.strand_count == 0 {
            return 0.0;
        }
        self.jacking_force() / (self.strand_area * self.strand_count as f64)
    }
}

/// Groups, girders and the POIs along them.
pub trait BridgeTopology {
    fn group_count(&self) -> usize;

    fn girder_count(&self, group: usize) -> usize;

    fn segment_count(&self, _girder: GirderKey) -> usize {
        1
    }

    fn girder_length(&self, girder: GirderKey) -> f64;

    /// Length of the span adjacent to an end of the girder
    fn end_span_length(&self, girder: GirderKey, end: MemberEnd) -> f64;

    /// POIs analyzed along the girder, in any order
    fn points_of_interest(&self, girder: GirderKey) -> Vec<PointOfInterest>;
}

/// Section properties at a POI for an interval.
pub trait SectionProperties {
    fn transformed_section(
        &self,
        interval: IntervalIndex,
        poi: &PointOfInterest,
    ) -> TransformedSection;

    fn net_girder_section(&self, interval: IntervalIndex, poi: &PointOfInterest) -> NetSection;

    /// Net deck properties; zero area before the deck is composite
    fn net_deck_section(&self, interval: IntervalIndex, poi: &PointOfInterest) -> NetSection;

    fn girder_rebar(&self, poi: &PointOfInterest) -> Vec<RebarLayer>;

    fn deck_rebar(&self, poi: &PointOfInterest) -> DeckRebar;
}

/// Strand and tendon layout.
pub trait PrestressGeometry {
    fn strand_count(&self, segment: SegmentKey, strand_type: StrandType) -> usize;

    /// Every strand of a type at a POI
    fn strand_elements(&self, poi: &PointOfInterest, strand_type: StrandType) -> Vec<SteelElement>;

    /// Total jacking force of a strand type
    fn strand_jacking_force(&self, segment: SegmentKey, strand_type: StrandType) -> f64;

    fn duct_count(&self, girder: GirderKey) -> usize;

    fn duct(&self, girder: GirderKey, duct: DuctIndex) -> DuctData;

    fn tendon_elevation(&self, poi: &PointOfInterest, duct: DuctIndex) -> f64;

    /// Angular change of the tendon between the given end and the POI (radians)
    fn angular_change(&self, poi: &PointOfInterest, duct: DuctIndex, from: MemberEnd) -> f64;
}
