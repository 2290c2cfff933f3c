//! # Reference Bridge Model
//!
//! [`ReferenceBridge`] turns a validated [`BridgeDescription`] into every
//! read-only provider the engine consumes. Transformed sections are built
//! from exactly the components the engine distributes forces to, each at the
//! modulus the engine uses for it, so section forces and component forces
//! balance:
//!
//! - girder concrete, girder rebar and strands from release on
//! - tendons once bonded (the interval after stressing)
//! - deck concrete and deck rebar once the deck is composite
//!
//! Concrete components are transformed with their age-adjusted modulus and
//! steel with its elastic modulus, all relative to the age-adjusted modulus
//! of the girder.

use crate::bridge::{
    BridgeTopology, DeckRebar, DuctData, JackingEnd, JackingForce, NetSection, PrestressGeometry,
    RebarLayer, SectionProperties, SteelElement, StrandType, TransformedSection,
};
use crate::errors::LossResult;
use crate::intervals::{Interval, IntervalSchedule, IntervalTime};
use crate::loads::ProductForce;
use crate::materials::{
    ConcreteElement, ConcreteMix, MaterialModel, PrestressElement, PrestressingSteel, RebarElement,
};
use crate::poi::{
    DuctIndex, GirderKey, IntervalIndex, MemberEnd, PoiAttributes, PointOfInterest, SegmentKey,
    LOCATION_TOLERANCE,
};

use super::description::{BridgeDescription, DeckDescription, TendonProfile, UserLoad};
use super::timeline::{Activity, Timeline};

/// Intervals of the construction activities, resolved once
#[derive(Debug, Clone, Copy, PartialEq)]
struct Schedule {
    stress_strands: IntervalIndex,
    release: IntervalIndex,
    storage: Option<IntervalIndex>,
    erect: IntervalIndex,
    stress_tendons: IntervalIndex,
    cast_deck: Option<IntervalIndex>,
    composite_deck: Option<IntervalIndex>,
    railing: Option<IntervalIndex>,
    overlay: Option<IntervalIndex>,
    open_to_traffic: IntervalIndex,
}

impl Schedule {
    fn resolve(timeline: &Timeline, has_deck: bool) -> LossResult<Self> {
        let release = timeline.required(Activity::ReleasePrestress)?;
        let deck_activity = |activity| {
            if has_deck {
                timeline.activity_interval(activity)
            } else {
                None
            }
        };
        Ok(Schedule {
            stress_strands: timeline.required(Activity::StressStrands)?,
            release,
            storage: timeline.activity_interval(Activity::StoreGirders),
            erect: timeline.required(Activity::ErectGirders)?,
            stress_tendons: timeline.activity_interval(Activity::StressTendons).unwrap_or(release),
            cast_deck: deck_activity(Activity::CastDeck),
            composite_deck: deck_activity(Activity::CompositeDeck),
            railing: timeline.activity_interval(Activity::InstallRailing),
            overlay: timeline.activity_interval(Activity::InstallOverlay),
            open_to_traffic: timeline.required(Activity::OpenToTraffic)?,
        })
    }
}

/// A piece of a composite section, already transformed
#[derive(Debug, Clone, Copy)]
struct Part {
    area: f64,
    inertia: f64,
    centroid: f64,
}

fn combine(parts: &[Part]) -> TransformedSection {
    let area: f64 = parts.iter().map(|p| p.area).sum();
    if area == 0.0 {
        return TransformedSection::default();
    }
    let centroid = parts.iter().map(|p| p.area * p.centroid).sum::<f64>() / area;
    let inertia = parts
        .iter()
        .map(|p| p.inertia + p.area * (p.centroid - centroid).powi(2))
        .sum();
    TransformedSection {
        area,
        inertia,
        centroid,
    }
}

/// Remove point areas (strands, bars) from a gross section
fn deduct_holes(gross: NetSection, holes: &[(f64, f64)]) -> NetSection {
    let hole_area: f64 = holes.iter().map(|(area, _)| area).sum();
    let area = gross.area - hole_area;
    if area <= 0.0 {
        return gross;
    }
    let first_moment = gross.area * gross.centroid - holes.iter().map(|(a, y)| a * y).sum::<f64>();
    let centroid = first_moment / area;
    let inertia = gross.inertia + gross.area * (gross.centroid - centroid).powi(2)
        - holes.iter().map(|(a, y)| a * (y - centroid).powi(2)).sum::<f64>();
    NetSection {
        area,
        inertia,
        centroid,
        ..gross
    }
}

/// Provider implementation over a [`BridgeDescription`]
#[derive(Debug, Clone)]
pub struct ReferenceBridge {
    description: BridgeDescription,
    schedule: Schedule,
}

impl ReferenceBridge {
    pub fn new(description: BridgeDescription) -> LossResult<Self> {
        description.validate()?;
        let schedule = Schedule::resolve(&description.timeline, description.deck.is_some())?;
        Ok(ReferenceBridge {
            description,
            schedule,
        })
    }

    /// Input the model was built from
    pub fn input(&self) -> &BridgeDescription {
        &self.description
    }

    fn timeline(&self) -> &Timeline {
        &self.description.timeline
    }

    fn height(&self) -> f64 {
        self.description.girder.height
    }

    fn span(&self, girder: GirderKey) -> f64 {
        self.description
            .groups
            .get(girder.group)
            .map_or(0.0, |group| group.span_length)
    }

    fn tendon(&self, duct: DuctIndex) -> Option<&TendonProfile> {
        self.description.tendons.get(duct)
    }

    /// User loads on the girders of `girder`'s group, with the interval
    /// each is applied in
    pub fn user_loads(
        &self,
        girder: GirderKey,
    ) -> impl Iterator<Item = (IntervalIndex, &UserLoad)> + '_ {
        self.description
            .user_loads
            .iter()
            .filter(move |user| user.group == girder.group)
            .filter_map(move |user| Some((self.timeline().activity_interval(user.activity)?, user)))
    }

    /// Interval in which a product load is first applied to the girders
    pub fn load_interval(&self, load: ProductForce) -> Option<IntervalIndex> {
        let schedule = &self.schedule;
        match load {
            ProductForce::GirderSelfWeight => Some(schedule.release),
            ProductForce::Diaphragm | ProductForce::Deck => schedule.cast_deck,
            ProductForce::TrafficBarrier | ProductForce::Sidewalk => schedule.railing,
            ProductForce::Overlay => schedule.overlay,
            _ => None,
        }
    }

    /// Gross weight per unit length of the girder
    pub fn girder_weight(&self) -> f64 {
        self.description.materials.girder.unit_weight * self.description.girder.area
    }

    /// Weight per unit length of the deck carried by one girder
    pub fn deck_weight(&self) -> f64 {
        self.description.deck.map_or(0.0, |deck| {
            self.description.materials.deck.unit_weight * deck.thickness * deck.effective_width
        })
    }

    /// Mix and casting day of a concrete element; `None` for a missing deck
    fn concrete(&self, element: ConcreteElement) -> Option<(&ConcreteMix, f64)> {
        let materials = &self.description.materials;
        match element {
            ConcreteElement::Segment(_) | ConcreteElement::Closure(_) => Some((
                &materials.girder,
                self.timeline().interval(self.schedule.stress_strands).start,
            )),
            ConcreteElement::Deck => self
                .description
                .deck
                .and(self.schedule.cast_deck)
                .map(|cast| (&materials.deck, self.timeline().interval(cast).start)),
        }
    }

    fn steel(&self, steel: PrestressElement) -> &PrestressingSteel {
        match steel {
            PrestressElement::Strand(..) => &self.description.materials.strand,
            PrestressElement::Tendon(..) => &self.description.materials.tendon,
        }
    }

    fn strand_elevation(&self, strand_type: StrandType, x: f64, length: f64) -> f64 {
        let layout = &self.description.strands;
        let group = layout.group(strand_type);
        let harp = layout.harping_point * length;
        let x = x.clamp(0.0, length);
        let from_end = x.min(length - x);
        let rise = group.end_elevation - group.harp_elevation;
        let elevation = if harp <= 0.0 || harp <= from_end {
            group.harp_elevation
        } else {
            group.harp_elevation + rise * (harp - from_end) / harp
        };
        elevation - self.height()
    }

    fn tendon_slope(tendon: &TendonProfile, x: f64, length: f64) -> f64 {
        let sag = tendon.low_point_elevation - tendon.end_elevation;
        4.0 * sag * (1.0 - 2.0 * x / length) / length
    }

    fn gross_girder(&self) -> NetSection {
        let girder = &self.description.girder;
        NetSection {
            area: girder.area,
            inertia: girder.inertia,
            centroid: girder.centroid_from_bottom - girder.height,
            top: 0.0,
            bottom: -girder.height,
        }
    }

    fn gross_deck(deck: &DeckDescription) -> NetSection {
        NetSection {
            area: deck.thickness * deck.effective_width,
            inertia: deck.effective_width * deck.thickness.powi(3) / 12.0,
            centroid: deck.haunch + 0.5 * deck.thickness,
            top: deck.haunch + deck.thickness,
            bottom: deck.haunch,
        }
    }

    fn deck_is_composite(&self, interval: IntervalIndex) -> bool {
        self.schedule
            .composite_deck
            .map_or(false, |composite| composite <= interval)
    }

    /// Strand groups present at a POI as (area, elevation)
    fn strand_areas(&self, poi: &PointOfInterest) -> Vec<(f64, f64)> {
        let layout = &self.description.strands;
        let length = self.girder_length(poi.girder);
        StrandType::ALL
            .iter()
            .filter(|t| layout.group(**t).count > 0)
            .map(|t| {
                (
                    layout.group(*t).count as f64 * layout.strand_area,
                    self.strand_elevation(*t, poi.dist_from_start, length),
                )
            })
            .collect()
    }

    fn tendon_areas(&self, poi: &PointOfInterest) -> Vec<(DuctIndex, f64, f64)> {
        (0..self.description.tendons.len())
            .filter_map(|duct| {
                let tendon = self.tendon(duct)?;
                let area = tendon.strand_count as f64 * tendon.strand_area;
                (area > 0.0).then(|| (duct, area, self.tendon_elevation(poi, duct)))
            })
            .collect()
    }
}

impl BridgeTopology for ReferenceBridge {
    fn group_count(&self) -> usize {
        self.description.groups.len()
    }

    fn girder_count(&self, group: usize) -> usize {
        self.description.groups.get(group).map_or(0, |g| g.girder_count)
    }

    fn girder_length(&self, girder: GirderKey) -> f64 {
        self.span(girder)
    }

    fn end_span_length(&self, girder: GirderKey, _end: MemberEnd) -> f64 {
        self.span(girder)
    }

    fn points_of_interest(&self, girder: GirderKey) -> Vec<PointOfInterest> {
        let length = self.span(girder);
        let divisions = self.description.poi_divisions.max(1);
        let mut pois: Vec<PointOfInterest> = (0..=divisions)
            .map(|i| {
                PointOfInterest::new(
                    girder,
                    0,
                    length * i as f64 / divisions as f64,
                    PoiAttributes::ON_SEGMENT | PoiAttributes::SPAN_POINT,
                )
            })
            .collect();

        if self.description.strands.harped.count > 0 {
            let harp = self.description.strands.harping_point * length;
            for x in [harp, length - harp] {
                match pois
                    .iter_mut()
                    .find(|poi| (poi.dist_from_start - x).abs() <= LOCATION_TOLERANCE)
                {
                    Some(poi) => poi.attributes = poi.attributes | PoiAttributes::HARPING_POINT,
                    None => pois.push(PointOfInterest::new(
                        girder,
                        0,
                        x,
                        PoiAttributes::ON_SEGMENT | PoiAttributes::HARPING_POINT,
                    )),
                }
            }
        }
        pois.sort();
        pois
    }
}

impl IntervalSchedule for ReferenceBridge {
    fn interval_count(&self) -> usize {
        self.timeline().interval_count()
    }

    fn interval(&self, interval: IntervalIndex) -> Interval {
        self.timeline().interval(interval)
    }

    fn description(&self, interval: IntervalIndex) -> String {
        self.timeline().description(interval)
    }

    fn stress_strand_interval(&self, _segment: SegmentKey) -> IntervalIndex {
        self.schedule.stress_strands
    }

    fn release_interval(&self, _segment: SegmentKey) -> IntervalIndex {
        self.schedule.release
    }

    fn storage_interval(&self, _segment: SegmentKey) -> Option<IntervalIndex> {
        self.schedule.storage
    }

    fn erect_segment_interval(&self, _segment: SegmentKey) -> IntervalIndex {
        self.schedule.erect
    }

    fn composite_closure_interval(&self, _segment: SegmentKey) -> Option<IntervalIndex> {
        None
    }

    fn stress_tendon_interval(&self, _girder: GirderKey, _duct: DuctIndex) -> IntervalIndex {
        self.schedule.stress_tendons
    }

    fn cast_deck_interval(&self) -> Option<IntervalIndex> {
        self.schedule.cast_deck
    }

    fn composite_deck_interval(&self) -> Option<IntervalIndex> {
        self.schedule.composite_deck
    }

    fn railing_system_interval(&self) -> Option<IntervalIndex> {
        self.schedule.railing
    }

    fn overlay_interval(&self) -> Option<IntervalIndex> {
        self.schedule.overlay
    }

    fn live_load_interval(&self) -> IntervalIndex {
        self.schedule.open_to_traffic
    }

    fn temporary_support_removal_intervals(&self, _girder: GirderKey) -> Vec<IntervalIndex> {
        Vec::new()
    }

    fn user_load_intervals(&self, girder: GirderKey, load: ProductForce) -> Vec<IntervalIndex> {
        let mut intervals: Vec<IntervalIndex> = self
            .user_loads(girder)
            .filter(|(_, user)| user.kind.product_force() == load)
            .map(|(interval, _)| interval)
            .collect();
        intervals.sort_unstable();
        intervals.dedup();
        intervals
    }
}

impl SectionProperties for ReferenceBridge {
    fn transformed_section(
        &self,
        interval: IntervalIndex,
        poi: &PointOfInterest,
    ) -> TransformedSection {
        let girder = self.net_girder_section(interval, poi);
        let segment = ConcreteElement::Segment(poi.segment_key());
        let e_girder = self.age_adjusted_modulus(segment, interval);
        if interval < self.schedule.release || e_girder <= 0.0 {
            return TransformedSection {
                area: girder.area,
                inertia: girder.inertia,
                centroid: girder.centroid,
            };
        }

        let steel = |modulus: f64, area: f64, elevation: f64| Part {
            area: modulus / e_girder * area,
            inertia: 0.0,
            centroid: elevation,
        };
        let mut parts = vec![Part {
            area: girder.area,
            inertia: girder.inertia,
            centroid: girder.centroid,
        }];

        let rebar_modulus = self.rebar_modulus(RebarElement::Segment(poi.segment_key()));
        for layer in self.girder_rebar(poi) {
            parts.push(steel(rebar_modulus, layer.area, layer.elevation));
        }
        let strand_modulus = self.description.materials.strand.modulus;
        for (area, elevation) in self.strand_areas(poi) {
            parts.push(steel(strand_modulus, area, elevation));
        }
        let tendon_modulus = self.description.materials.tendon.modulus;
        for (duct, area, elevation) in self.tendon_areas(poi) {
            if self.stress_tendon_interval(poi.girder, duct) < interval {
                parts.push(steel(tendon_modulus, area, elevation));
            }
        }

        if self.deck_is_composite(interval) {
            let deck = self.net_deck_section(interval, poi);
            let n = self.age_adjusted_modulus(ConcreteElement::Deck, interval) / e_girder;
            parts.push(Part {
                area: n * deck.area,
                inertia: n * deck.inertia,
                centroid: deck.centroid,
            });
            let mats = self.deck_rebar(poi);
            let deck_rebar_modulus = self.rebar_modulus(RebarElement::Deck);
            for mat in [mats.top, mats.bottom] {
                parts.push(steel(deck_rebar_modulus, mat.area, mat.elevation));
            }
        }
        combine(&parts)
    }

    fn net_girder_section(&self, _interval: IntervalIndex, poi: &PointOfInterest) -> NetSection {
        let mut holes = self.strand_areas(poi);
        holes.extend(self.girder_rebar(poi).iter().map(|layer| (layer.area, layer.elevation)));
        holes.extend(
            self.tendon_areas(poi)
                .into_iter()
                .map(|(_, area, elevation)| (area, elevation)),
        );
        deduct_holes(self.gross_girder(), &holes)
    }

    fn net_deck_section(&self, interval: IntervalIndex, poi: &PointOfInterest) -> NetSection {
        match self.description.deck {
            Some(deck) if self.deck_is_composite(interval) => {
                let mats = self.deck_rebar(poi);
                let holes = [
                    (mats.top.area, mats.top.elevation),
                    (mats.bottom.area, mats.bottom.elevation),
                ];
                deduct_holes(Self::gross_deck(&deck), &holes)
            }
            _ => NetSection::default(),
        }
    }

    fn girder_rebar(&self, _poi: &PointOfInterest) -> Vec<RebarLayer> {
        self.description
            .girder_rebar
            .iter()
            .map(|row| RebarLayer {
                area: row.area,
                elevation: row.elevation - self.height(),
            })
            .collect()
    }

    fn deck_rebar(&self, _poi: &PointOfInterest) -> DeckRebar {
        self.description.deck.map_or(DeckRebar::default(), |deck| DeckRebar {
            top: RebarLayer {
                area: deck.top_mat.area,
                elevation: deck.haunch + deck.thickness - deck.top_mat.cover,
            },
            bottom: RebarLayer {
                area: deck.bottom_mat.area,
                elevation: deck.haunch + deck.bottom_mat.cover,
            },
        })
    }
}

impl PrestressGeometry for ReferenceBridge {
    fn strand_count(&self, _segment: SegmentKey, strand_type: StrandType) -> usize {
        self.description.strands.group(strand_type).count
    }

    fn strand_elements(&self, poi: &PointOfInterest, strand_type: StrandType) -> Vec<SteelElement> {
        let layout = &self.description.strands;
        let length = self.girder_length(poi.girder);
        let elevation = self.strand_elevation(strand_type, poi.dist_from_start, length);
        vec![
            SteelElement {
                area: layout.strand_area,
                elevation,
            };
            layout.group(strand_type).count
        ]
    }

    fn strand_jacking_force(&self, _segment: SegmentKey, strand_type: StrandType) -> f64 {
        let layout = &self.description.strands;
        layout.group(strand_type).count as f64 * layout.strand_area * layout.jacking_stress
    }

    fn duct_count(&self, _girder: GirderKey) -> usize {
        self.description.tendons.len()
    }

    fn duct(&self, _girder: GirderKey, duct: DuctIndex) -> DuctData {
        match self.tendon(duct) {
            Some(tendon) => DuctData {
                strand_count: tendon.strand_count,
                strand_area: tendon.strand_area,
                jacking_end: tendon.jacking_end,
                jacking: JackingForce::Stress(tendon.jacking_stress),
            },
            None => DuctData {
                strand_count: 0,
                strand_area: 0.0,
                jacking_end: JackingEnd::Start,
                jacking: JackingForce::Force(0.0),
            },
        }
    }

    fn tendon_elevation(&self, poi: &PointOfInterest, duct: DuctIndex) -> f64 {
        let Some(tendon) = self.tendon(duct) else {
            return 0.0;
        };
        let length = self.girder_length(poi.girder);
        if length <= 0.0 {
            return tendon.end_elevation - self.height();
        }
        let r = (poi.dist_from_start / length).clamp(0.0, 1.0);
        let sag = tendon.low_point_elevation - tendon.end_elevation;
        tendon.end_elevation + 4.0 * sag * r * (1.0 - r) - self.height()
    }

    fn angular_change(&self, poi: &PointOfInterest, duct: DuctIndex, from: MemberEnd) -> f64 {
        let Some(tendon) = self.tendon(duct) else {
            return 0.0;
        };
        let length = self.girder_length(poi.girder);
        if length <= 0.0 {
            return 0.0;
        }
        let x = poi.dist_from_start.clamp(0.0, length);
        let end = match from {
            MemberEnd::Start => 0.0,
            MemberEnd::End => length,
        };
        let angle = |at: f64| Self::tendon_slope(tendon, at, length).atan();
        (angle(end) - angle(x)).abs()
    }
}

impl MaterialModel for ReferenceBridge {
    fn concrete_modulus(&self, concrete: ConcreteElement, interval: IntervalIndex) -> f64 {
        let Some((mix, cast)) = self.concrete(concrete) else {
            return 0.0;
        };
        mix.modulus_at_age(self.timeline().interval(interval).middle() - cast)
    }

    fn age_adjusted_modulus(&self, concrete: ConcreteElement, interval: IntervalIndex) -> f64 {
        let Some((mix, cast)) = self.concrete(concrete) else {
            return 0.0;
        };
        let time = self.timeline().interval(interval);
        if time.duration() == 0.0 {
            return mix.modulus_at_age(time.middle() - cast);
        }
        mix.age_adjusted_modulus(time.middle() - cast, time.end - cast)
    }

    fn creep_coefficient(
        &self,
        concrete: ConcreteElement,
        loading_interval: IntervalIndex,
        evaluation_interval: IntervalIndex,
        at: IntervalTime,
    ) -> f64 {
        let Some((mix, cast)) = self.concrete(concrete) else {
            return 0.0;
        };
        let timeline = self.timeline();
        let loaded = timeline.interval(loading_interval).middle() - cast;
        let age = timeline.interval(evaluation_interval).time_at(at) - cast;
        mix.creep_coefficient(age, loaded)
    }

    fn shrinkage_strain(&self, concrete: ConcreteElement, interval: IntervalIndex) -> f64 {
        let Some((mix, cast)) = self.concrete(concrete) else {
            return 0.0;
        };
        let time = self.timeline().interval(interval);
        mix.shrinkage_at_age(time.end - cast) - mix.shrinkage_at_age(time.start - cast)
    }

    fn relaxation(&self, steel: PrestressElement, fpe: f64, t_start: f64, t_end: f64) -> f64 {
        self.steel(steel).relaxation(fpe, t_start, t_end)
    }

    fn prestress_modulus(&self, steel: PrestressElement) -> f64 {
        self.steel(steel).modulus
    }

    fn rebar_modulus(&self, _rebar: RebarElement) -> f64 {
        self.description.materials.rebar_modulus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::beam_analysis::SpanLoad;
    use crate::reference::description::UserLoadKind;
    use approx::assert_relative_eq;

    fn bridge() -> ReferenceBridge {
        ReferenceBridge::new(BridgeDescription::sample()).unwrap()
    }

    fn midspan(bridge: &ReferenceBridge) -> PointOfInterest {
        let girder = GirderKey::new(0, 0);
        let x = 0.5 * bridge.girder_length(girder);
        PointOfInterest::new(girder, 0, x, PoiAttributes::ON_SEGMENT)
    }

    #[test]
    fn test_schedule_from_timeline() {
        let bridge = bridge();
        let segment = GirderKey::new(0, 0).segment(0);
        assert_eq!(bridge.interval_count(), 18);
        assert_eq!(bridge.stress_strand_interval(segment), 0);
        assert_eq!(bridge.release_interval(segment), 2);
        assert_eq!(bridge.storage_interval(segment), Some(4));
        assert_eq!(bridge.erect_segment_interval(segment), 6);
        assert_eq!(bridge.stress_tendon_interval(GirderKey::new(0, 0), 0), 8);
        assert_eq!(bridge.composite_deck_interval(), Some(12));
        assert_eq!(bridge.live_load_interval(), 16);
        assert_eq!(bridge.interval(3).duration(), 2.0);
    }

    #[test]
    fn test_pois_include_harping_points() {
        let bridge = bridge();
        let pois = bridge.points_of_interest(GirderKey::new(0, 0));
        // 0.4L and 0.6L are already tenth points
        assert_eq!(pois.len(), 11);
        let harping: Vec<f64> = pois
            .iter()
            .filter(|p| p.attributes.contains(PoiAttributes::HARPING_POINT))
            .map(|p| p.dist_from_start)
            .collect();
        assert_eq!(harping.len(), 2);
        assert_relative_eq!(harping[0], 12_000.0);
    }

    #[test]
    fn test_harped_strand_profile() {
        let bridge = bridge();
        // h = 1372, ends at 1100, harp point at 150 above the bottom
        let harped = |x: f64| bridge.strand_elevation(StrandType::Harped, x, 30_000.0);
        assert_relative_eq!(harped(0.0), -272.0);
        assert_relative_eq!(harped(15_000.0), -1222.0);
        // halfway to the harp point: 150 + 950/2
        assert_relative_eq!(harped(6000.0), -747.0);
        assert_relative_eq!(
            bridge.strand_elevation(StrandType::Straight, 6000.0, 30_000.0),
            -1282.0
        );
    }

    #[test]
    fn test_parabolic_tendon() {
        let bridge = bridge();
        let mid = midspan(&bridge);
        assert_relative_eq!(bridge.tendon_elevation(&mid, 0), 250.0 - 1372.0);

        // end slope 4 x 450 / 30000 = 0.06
        let end = PointOfInterest::new(mid.girder, 0, 30_000.0, PoiAttributes::ON_SEGMENT);
        let from_start = |poi: &PointOfInterest| bridge.angular_change(poi, 0, MemberEnd::Start);
        assert_relative_eq!(from_start(&mid), 0.06f64.atan(), max_relative = 1e-12);
        assert_relative_eq!(from_start(&end), 2.0 * 0.06f64.atan(), max_relative = 1e-12);
        assert_eq!(bridge.angular_change(&end, 0, MemberEnd::End), 0.0);
    }

    #[test]
    fn test_net_section_removes_steel() {
        let bridge = bridge();
        let net = bridge.net_girder_section(0, &midspan(&bridge));
        // 32 strands, 1400 mm2 rebar, 12 strand tendon
        assert_relative_eq!(net.area, 509_000.0 - 32.0 * 140.0 - 1400.0 - 12.0 * 140.0);
        assert_eq!(net.top, 0.0);
        assert_eq!(net.bottom, -1372.0);
    }

    #[test]
    fn test_transformed_section_grows_with_construction() {
        let bridge = bridge();
        let poi = midspan(&bridge);
        let at_release = bridge.transformed_section(2, &poi);
        let bonded = bridge.transformed_section(9, &poi);
        let composite = bridge.transformed_section(12, &poi);
        assert!(at_release.area > bridge.net_girder_section(2, &poi).area);
        assert!(composite.area > bonded.area);
        // deck pulls the centroid up
        assert!(composite.centroid > bonded.centroid);
        assert_eq!(bridge.net_deck_section(11, &poi).area, 0.0);
        assert!(bridge.net_deck_section(12, &poi).area > 0.0);
    }

    #[test]
    fn test_transformed_section_matches_components() {
        let bridge = bridge();
        let poi = midspan(&bridge);
        let interval = 13;
        let section = bridge.transformed_section(interval, &poi);
        let e = bridge.age_adjusted_modulus(ConcreteElement::Segment(poi.segment_key()), interval);

        // axial stiffness of the components, concrete at age-adjusted moduli
        let girder = bridge.net_girder_section(interval, &poi);
        let deck = bridge.net_deck_section(interval, &poi);
        let deck_modulus = bridge.age_adjusted_modulus(ConcreteElement::Deck, interval);
        let steel = 200_000.0 * (1400.0 + 1800.0) + 197_000.0 * (32.0 + 12.0) * 140.0;
        let ea = e * girder.area + deck_modulus * deck.area + steel;
        assert_relative_eq!(section.area * e, ea, max_relative = 1e-12);
    }

    #[test]
    fn test_age_adjusted_modulus() {
        let bridge = bridge();
        let segment = ConcreteElement::Segment(GirderKey::new(0, 0).segment(0));
        // zero-duration interval: elastic modulus
        assert_eq!(bridge.age_adjusted_modulus(segment, 2), bridge.concrete_modulus(segment, 2));
        assert!(bridge.age_adjusted_modulus(segment, 3) < bridge.concrete_modulus(segment, 3));
        // deck is not cast until day 90
        assert_eq!(bridge.concrete_modulus(ConcreteElement::Deck, 3), 0.0);
    }

    #[test]
    fn test_shrinkage_per_interval() {
        let bridge = bridge();
        let segment = ConcreteElement::Segment(GirderKey::new(0, 0).segment(0));
        assert_eq!(bridge.shrinkage_strain(segment, 2), 0.0);
        assert!(bridge.shrinkage_strain(segment, 3) < 0.0);
        assert_eq!(bridge.shrinkage_strain(ConcreteElement::Deck, 3), 0.0);
    }

    #[test]
    fn test_load_intervals() {
        let bridge = bridge();
        assert_eq!(bridge.load_interval(ProductForce::GirderSelfWeight), Some(2));
        assert_eq!(bridge.load_interval(ProductForce::Deck), Some(10));
        assert_eq!(bridge.load_interval(ProductForce::Overlay), Some(16));
        assert_eq!(bridge.load_interval(ProductForce::Creep), None);
    }

    #[test]
    fn test_user_load_intervals() {
        let mut description = BridgeDescription::sample();
        for activity in [Activity::InstallRailing, Activity::CastDeck, Activity::InstallRailing] {
            description.user_loads.push(UserLoad {
                kind: UserLoadKind::Dw,
                group: 0,
                activity,
                load: SpanLoad::uniform(1.0),
            });
        }
        let bridge = ReferenceBridge::new(description).unwrap();
        let girder = GirderKey::new(0, 1);

        assert_eq!(bridge.user_load_intervals(girder, ProductForce::UserDw), vec![10, 14]);
        assert!(bridge.user_load_intervals(girder, ProductForce::UserDc).is_empty());
        assert!(bridge
            .user_load_intervals(GirderKey::new(1, 0), ProductForce::UserDw)
            .is_empty());
        assert_eq!(bridge.user_loads(girder).count(), 3);
    }
}
