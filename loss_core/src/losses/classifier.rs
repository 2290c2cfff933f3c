//! Strand and tendon inventory
//!
//! Which strand types and ducts actually carry steel in a segment. The
//! lookups are pure, so results are cached per segment for the life of the
//! engine.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::bridge::{PrestressGeometry, StrandType};
use crate::poi::{DuctIndex, SegmentKey};

/// Prestressing present in a segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrandInventory {
    /// Strand count by [`StrandType::index`]
    pub strand_counts: [usize; 3],
    /// Strand count of every duct in the girder
    pub duct_strand_counts: Vec<usize>,
}

impl StrandInventory {
    pub fn has_strands(&self, strand_type: StrandType) -> bool {
        self.strand_counts[strand_type.index()] > 0
    }

    pub fn has_tendon(&self, duct: DuctIndex) -> bool {
        self.duct_strand_counts.get(duct).map_or(false, |n| *n > 0)
    }
}

/// Memoized strand/tendon classification
#[derive(Debug, Default)]
pub struct StrandClassifier {
    cache: HashMap<SegmentKey, StrandInventory>,
}

impl StrandClassifier {
    pub fn new() -> Self {
        StrandClassifier::default()
    }

    pub fn inventory<G: PrestressGeometry + ?Sized>(
        &mut self,
        geometry: &G,
        segment: SegmentKey,
    ) -> &StrandInventory {
        self.cache.entry(segment).or_insert_with(|| {
            let girder = segment.girder_key();
            let strand_counts = [
                geometry.strand_count(segment, StrandType::Straight),
                geometry.strand_count(segment, StrandType::Harped),
                geometry.strand_count(segment, StrandType::Temporary),
            ];
            let duct_strand_counts = (0..geometry.duct_count(girder))
                .map(|duct| geometry.duct(girder, duct).strand_count)
                .collect();
            StrandInventory {
                strand_counts,
                duct_strand_counts,
            }
        })
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
