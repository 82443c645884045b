use crate::core::io::digest_table::FragmentAnnotator;
use crate::core::models::ids::SegmentId;
use crate::core::models::segment::{MarginRole, Segment, SegmentKey};
use slotmap::SlotMap;
use std::collections::BTreeMap;
use std::sync::Arc;

/// The canonical store of active segments, ordered by chromosome and start.
///
/// Each segment lives once in the arena; viewpoints refer to it by [`SegmentId`]. Keys are
/// ordered the way [`SegmentKey::preceeds`] orders them: chromosome names lexicographically,
/// then starts numerically. Lookups are `O(log n)` regardless of insertion order.
///
/// The index is filled by a single writer after the per-chromosome jobs finish and is only
/// read afterwards.
#[derive(Debug, Clone, Default)]
pub struct SegmentIndex {
    segments: SlotMap<SegmentId, Segment>,
    keys: BTreeMap<Arc<str>, BTreeMap<u64, SegmentId>>,
}

impl SegmentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `segment` unless a segment with the same chromosome and start is already
    /// present, in which case the stored one is kept. Returns the id of the stored segment.
    pub fn insert(&mut self, segment: Segment) -> SegmentId {
        let SegmentKey { chromosome, start } = segment.key();
        let starts = self.keys.entry(chromosome).or_default();
        if let Some(&id) = starts.get(&start) {
            return id;
        }
        let id = self.segments.insert(segment);
        starts.insert(start, id);
        id
    }

    /// True iff a segment starting exactly at `position` on `chromosome` was inserted.
    pub fn contains(&self, chromosome: &str, position: u64) -> bool {
        self.id_of(chromosome, position).is_some()
    }

    pub fn lookup(&self, chromosome: &str, position: u64) -> Option<&Segment> {
        self.id_of(chromosome, position)
            .and_then(|id| self.segments.get(id))
    }

    pub fn id_of(&self, chromosome: &str, position: u64) -> Option<SegmentId> {
        self.keys
            .get(chromosome)
            .and_then(|starts| starts.get(&position))
            .copied()
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id)
    }

    pub fn get_mut(&mut self, id: SegmentId) -> Option<&mut Segment> {
        self.segments.get_mut(id)
    }

    /// Segments in key order.
    pub fn iter(&self) -> impl Iterator<Item = (SegmentId, &Segment)> {
        self.keys
            .values()
            .flat_map(|starts| starts.values())
            .map(|&id| (id, &self.segments[id]))
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl FragmentAnnotator for SegmentIndex {
    fn probe_counts(&self, chromosome: &str, start: u64) -> Option<(usize, usize)> {
        self.lookup(chromosome, start).map(|segment| {
            (
                segment.bait_count(MarginRole::FivePrime),
                segment.bait_count(MarginRole::ThreePrime),
            )
        })
    }
}
