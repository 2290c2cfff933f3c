//! # Bridge Description
//!
//! Persisted input of the reference bridge: one or more simple spans (groups)
//! of identical precast girders with a composite cast-in-place deck.
//! Dimensions are in mm, forces in N, stresses in MPa and times in days.
//! Elevations of strands, tendons and girder rebar are measured up from the
//! bottom of the girder; the model converts them to section coordinates.

use serde::{Deserialize, Serialize};

use crate::bridge::{JackingEnd, StrandType};
use crate::errors::{LossError, LossResult};
use crate::loads::ProductForce;
use crate::materials::{ConcreteMix, PrestressingSteel};

use super::beam_analysis::SpanLoad;
use super::timeline::{Activity, ConstructionEvent, Timeline};

/// A simple span and the girders spanning it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpanGroup {
    pub span_length: f64,
    pub girder_count: usize,
}

/// Gross properties of the precast girder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GirderSection {
    pub area: f64,
    pub inertia: f64,
    pub height: f64,
    /// Distance from the bottom fiber to the centroid (y_b)
    pub centroid_from_bottom: f64,
}

/// Strands of one type, all at the same height at a section
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StrandGroup {
    pub count: usize,
    /// Height above the girder bottom at the girder ends
    pub end_elevation: f64,
    /// Height above the girder bottom between the harping points
    pub harp_elevation: f64,
}

impl StrandGroup {
    pub fn straight(count: usize, elevation: f64) -> Self {
        StrandGroup {
            count,
            end_elevation: elevation,
            harp_elevation: elevation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrandLayout {
    /// Nominal area of one strand
    pub strand_area: f64,
    pub jacking_stress: f64,
    /// Distance of the harping points from each girder end, as a fraction of
    /// the girder length
    pub harping_point: f64,
    pub straight: StrandGroup,
    pub harped: StrandGroup,
    pub temporary: StrandGroup,
}

impl StrandLayout {
    pub fn group(&self, strand_type: StrandType) -> &StrandGroup {
        match strand_type {
            StrandType::Straight => &self.straight,
            StrandType::Harped => &self.harped,
            StrandType::Temporary => &self.temporary,
        }
    }
}

/// A parabolic tendon running the full girder length
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TendonProfile {
    pub strand_count: usize,
    pub strand_area: f64,
    pub jacking_end: JackingEnd,
    pub jacking_stress: f64,
    /// Height above the girder bottom at both anchorages
    pub end_elevation: f64,
    /// Height above the girder bottom at midspan
    pub low_point_elevation: f64,
}

/// A row of longitudinal girder reinforcement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RebarRow {
    pub area: f64,
    /// Height above the girder bottom
    pub elevation: f64,
}

/// One mat of deck reinforcement within the effective width
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckMat {
    pub area: f64,
    /// Clear distance to the nearest deck face
    pub cover: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeckDescription {
    pub thickness: f64,
    /// Effective flange width carried by one girder
    pub effective_width: f64,
    /// Gap between the top of the girder and the bottom of the deck
    pub haunch: f64,
    pub top_mat: DeckMat,
    pub bottom_mat: DeckMat,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialSet {
    pub girder: ConcreteMix,
    pub deck: ConcreteMix,
    pub strand: PrestressingSteel,
    pub tendon: PrestressingSteel,
    pub rebar_modulus: f64,
}

/// Superimposed dead loads carried by one girder (N/mm)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SuperimposedLoads {
    pub diaphragm: f64,
    pub barrier: f64,
    pub sidewalk: f64,
    pub overlay: f64,
}

/// Category of a user-defined load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserLoadKind {
    /// Structural components and attachments
    Dc,
    /// Wearing surfaces and utilities
    Dw,
}

impl UserLoadKind {
    pub fn product_force(&self) -> ProductForce {
        match self {
            UserLoadKind::Dc => ProductForce::UserDc,
            UserLoadKind::Dw => ProductForce::UserDw,
        }
    }
}

/// A load placed on every girder of a group during a construction activity.
///
/// Positions are measured from the start of the girder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserLoad {
    pub kind: UserLoadKind,
    pub group: usize,
    pub activity: Activity,
    pub load: SpanLoad,
}

/// Lane plus design truck live load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveLoad {
    /// Uniform lane load (N/mm)
    pub lane_load: f64,
    /// Axle weights of the design truck, front axle first
    pub axle_weights: Vec<f64>,
    /// Distance between consecutive axles
    pub axle_spacing: Vec<f64>,
    /// Dynamic load allowance applied to the truck
    pub impact_factor: f64,
    /// Lanes carried by one girder
    pub distribution_factor: f64,
}

impl Default for LiveLoad {
    /// HL-93 lane and truck in N and mm
    fn default() -> Self {
        LiveLoad {
            lane_load: 9.3,
            axle_weights: vec![35_000.0, 145_000.0, 145_000.0],
            axle_spacing: vec![4300.0, 4300.0],
            impact_factor: 0.33,
            distribution_factor: 0.6,
        }
    }
}

/// Complete input of the reference bridge model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeDescription {
    pub name: String,
    pub groups: Vec<SpanGroup>,
    pub girder: GirderSection,
    pub strands: StrandLayout,
    #[serde(default)]
    pub tendons: Vec<TendonProfile>,
    #[serde(default)]
    pub girder_rebar: Vec<RebarRow>,
    pub deck: Option<DeckDescription>,
    pub materials: MaterialSet,
    #[serde(default)]
    pub loads: SuperimposedLoads,
    #[serde(default)]
    pub user_loads: Vec<UserLoad>,
    #[serde(default)]
    pub live_load: LiveLoad,
    pub timeline: Timeline,
    /// Equal divisions of each girder used to place POIs
    pub poi_divisions: usize,
}

impl BridgeDescription {
    /// Two simple spans of AASHTO Type IV girders with one parabolic tendon
    /// each and a 200 mm composite deck.
    pub fn sample() -> Self {
        BridgeDescription {
            name: "Two-span precast girder bridge".to_string(),
            groups: vec![
                SpanGroup {
                    span_length: 30_000.0,
                    girder_count: 4,
                },
                SpanGroup {
                    span_length: 32_000.0,
                    girder_count: 3,
                },
            ],
            girder: GirderSection {
                area: 509_000.0,
                inertia: 1.0852e11,
                height: 1372.0,
                centroid_from_bottom: 628.0,
            },
            strands: StrandLayout {
                strand_area: 140.0,
                jacking_stress: 1395.0,
                harping_point: 0.4,
                straight: StrandGroup::straight(24, 90.0),
                harped: StrandGroup {
                    count: 8,
                    end_elevation: 1100.0,
                    harp_elevation: 150.0,
                },
                temporary: StrandGroup::default(),
            },
            tendons: vec![TendonProfile {
                strand_count: 12,
                strand_area: 140.0,
                jacking_end: JackingEnd::Start,
                jacking_stress: 1395.0,
                end_elevation: 700.0,
                low_point_elevation: 250.0,
            }],
            girder_rebar: vec![
                RebarRow {
                    area: 800.0,
                    elevation: 50.0,
                },
                RebarRow {
                    area: 600.0,
                    elevation: 1320.0,
                },
            ],
            deck: Some(DeckDescription {
                thickness: 200.0,
                effective_width: 2400.0,
                haunch: 25.0,
                top_mat: DeckMat {
                    area: 1000.0,
                    cover: 50.0,
                },
                bottom_mat: DeckMat {
                    area: 800.0,
                    cover: 40.0,
                },
            }),
            materials: MaterialSet {
                girder: ConcreteMix {
                    modulus_28: 33_000.0,
                    time_factor_a: 1.0,
                    time_factor_b: 0.95,
                    shrinkage_time_factor: 55.0,
                    ..ConcreteMix::default()
                },
                deck: ConcreteMix::default(),
                strand: PrestressingSteel::default(),
                tendon: PrestressingSteel::default(),
                rebar_modulus: 200_000.0,
            },
            loads: SuperimposedLoads {
                diaphragm: 1.0,
                barrier: 3.5,
                sidewalk: 0.0,
                overlay: 1.8,
            },
            user_loads: Vec::new(),
            live_load: LiveLoad::default(),
            timeline: Timeline {
                events: vec![
                    ConstructionEvent::new(0.0, vec![Activity::StressStrands]),
                    ConstructionEvent::new(1.0, vec![Activity::ReleasePrestress]),
                    ConstructionEvent::new(3.0, vec![Activity::StoreGirders]),
                    ConstructionEvent::new(60.0, vec![Activity::ErectGirders]),
                    ConstructionEvent::new(75.0, vec![Activity::StressTendons]),
                    ConstructionEvent::new(90.0, vec![Activity::CastDeck]),
                    ConstructionEvent::new(97.0, vec![Activity::CompositeDeck]),
                    ConstructionEvent::new(110.0, vec![Activity::InstallRailing]),
                    ConstructionEvent::new(
                        120.0,
                        vec![Activity::InstallOverlay, Activity::OpenToTraffic],
                    ),
                ],
                design_life: 27_500.0,
            },
            poi_divisions: 10,
        }
    }

    pub fn validate(&self) -> LossResult<()> {
        if self.groups.is_empty() {
            return Err(LossError::missing_field("groups"));
        }
        for (index, group) in self.groups.iter().enumerate() {
            if group.span_length <= 0.0 {
                return Err(LossError::invalid_input(
                    format!("groups[{}].span_length", index),
                    group.span_length.to_string(),
                    "Span length must be positive",
                ));
            }
            if group.girder_count == 0 {
                return Err(LossError::invalid_input(
                    format!("groups[{}].girder_count", index),
                    "0",
                    "A span must carry at least one girder",
                ));
            }
        }

        let girder = &self.girder;
        if girder.area <= 0.0 || girder.inertia <= 0.0 || girder.height <= 0.0 {
            return Err(LossError::invalid_input(
                "girder",
                format!("A = {}, I = {}, h = {}", girder.area, girder.inertia, girder.height),
                "Girder section properties must be positive",
            ));
        }
        if girder.centroid_from_bottom <= 0.0 || girder.height <= girder.centroid_from_bottom {
            return Err(LossError::invalid_input(
                "girder.centroid_from_bottom",
                girder.centroid_from_bottom.to_string(),
                "Centroid must lie within the girder depth",
            ));
        }

        let strands = &self.strands;
        let has_strands = StrandType::ALL.iter().any(|t| strands.group(*t).count > 0);
        if has_strands && strands.strand_area <= 0.0 {
            return Err(LossError::invalid_input(
                "strands.strand_area",
                strands.strand_area.to_string(),
                "Strand area must be positive",
            ));
        }
        if strands.harping_point <= 0.0 || 0.5 < strands.harping_point {
            return Err(LossError::invalid_input(
                "strands.harping_point",
                strands.harping_point.to_string(),
                "Harping points must lie in the first half of the girder",
            ));
        }
        for (index, tendon) in self.tendons.iter().enumerate() {
            if tendon.strand_count > 0 && tendon.strand_area <= 0.0 {
                return Err(LossError::invalid_input(
                    format!("tendons[{}].strand_area", index),
                    tendon.strand_area.to_string(),
                    "Strand area must be positive",
                ));
            }
        }
        for (index, user) in self.user_loads.iter().enumerate() {
            let Some(group) = self.groups.get(user.group) else {
                return Err(LossError::invalid_input(
                    format!("user_loads[{}].group", index),
                    user.group.to_string(),
                    "No such span",
                ));
            };
            if !user.load.lies_within(group.span_length) {
                return Err(LossError::invalid_input(
                    format!("user_loads[{}].load", index),
                    format!("{:?}", user.load),
                    "Load must lie on the span",
                ));
            }
            if self.timeline.activity_interval(user.activity).is_none() {
                return Err(LossError::invalid_input(
                    format!("user_loads[{}].activity", index),
                    user.activity.description(),
                    "Activity is not on the timeline",
                ));
            }
        }
        if self.poi_divisions < 2 {
            return Err(LossError::invalid_input(
                "poi_divisions",
                self.poi_divisions.to_string(),
                "At least two divisions are needed",
            ));
        }
        self.timeline.validate(!self.tendons.is_empty(), self.deck.is_some())
    }
}
