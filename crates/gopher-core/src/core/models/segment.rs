use super::fragment::{Composition, Fragment, Interval};
use std::cmp::Ordering;
use std::sync::Arc;

/// GC fraction above which a baited margin is considered GC-rich.
pub const HIGH_GC_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarginRole {
    FivePrime,
    ThreePrime,
}

/// A fixed-length probe placed inside a margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bait {
    pub interval: Interval,
    pub composition: Composition,
    /// True when the bait does not touch the segment boundary of its margin: its start for
    /// a 5' bait, its end for a 3' bait.
    pub shifted: bool,
}

/// Identity of a segment: two segments with the same chromosome and start are the same
/// segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SegmentKey {
    pub chromosome: Arc<str>,
    pub start: u64,
}

impl SegmentKey {
    pub fn new(chromosome: impl Into<Arc<str>>, start: u64) -> Self {
        Self {
            chromosome: chromosome.into(),
            start,
        }
    }

    /// Strict total order used by the segment index: chromosome names compare
    /// lexicographically, starts on the same chromosome numerically.
    pub fn preceeds(&self, other: &SegmentKey) -> bool {
        self.cmp(other) == Ordering::Less
    }
}

impl PartialOrd for SegmentKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SegmentKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.chromosome
            .cmp(&other.chromosome)
            .then(self.start.cmp(&other.start))
    }
}

/// A restriction fragment chosen as active for at least one viewpoint, together with the
/// baits placed in its margins.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub fragment: Fragment,
    pub selected: bool,
    pub five_prime_baits: Vec<Bait>,
    pub three_prime_baits: Vec<Bait>,
}

impl Segment {
    pub fn new(fragment: Fragment) -> Self {
        Self {
            fragment,
            selected: true,
            five_prime_baits: Vec::new(),
            three_prime_baits: Vec::new(),
        }
    }

    pub fn key(&self) -> SegmentKey {
        SegmentKey {
            chromosome: self.fragment.chromosome.clone(),
            start: self.fragment.start(),
        }
    }

    pub fn chromosome(&self) -> &str {
        &self.fragment.chromosome
    }

    pub fn interval(&self) -> Interval {
        self.fragment.interval
    }

    pub fn baits(&self, role: MarginRole) -> &[Bait] {
        match role {
            MarginRole::FivePrime => &self.five_prime_baits,
            MarginRole::ThreePrime => &self.three_prime_baits,
        }
    }

    pub fn bait_count(&self, role: MarginRole) -> usize {
        self.baits(role).len()
    }

    pub fn margin_composition(&self, role: MarginRole) -> &Composition {
        match role {
            MarginRole::FivePrime => &self.fragment.five_prime,
            MarginRole::ThreePrime => &self.fragment.three_prime,
        }
    }

    fn is_baited(&self, role: MarginRole) -> bool {
        !self.baits(role).is_empty()
    }

    /// The bait closest to the segment boundary of the given margin is shifted away from it.
    fn is_shifted(&self, role: MarginRole) -> bool {
        self.baits(role).first().is_some_and(|bait| bait.shifted)
    }

    fn is_high_gc(&self, role: MarginRole) -> bool {
        self.is_baited(role) && self.margin_composition(role).gc > HIGH_GC_THRESHOLD
    }

    /// Both margins carry baits.
    pub fn is_balanced(&self) -> bool {
        self.is_baited(MarginRole::FivePrime) && self.is_baited(MarginRole::ThreePrime)
    }

    /// Exactly one margin carries baits.
    pub fn is_unilateral(&self) -> bool {
        self.is_baited(MarginRole::FivePrime) != self.is_baited(MarginRole::ThreePrime)
    }

    /// A baited margin exceeds [`HIGH_GC_THRESHOLD`].
    pub fn has_high_gc_margin(&self) -> bool {
        self.is_high_gc(MarginRole::FivePrime) || self.is_high_gc(MarginRole::ThreePrime)
    }

    /// Both margins are baited, neither margin's outermost bait is shifted and neither
    /// margin is GC-rich.
    pub fn is_well_placed(&self) -> bool {
        self.is_balanced()
            && !self.is_shifted(MarginRole::FivePrime)
            && !self.is_shifted(MarginRole::ThreePrime)
            && !self.has_high_gc_margin()
    }

    /// Iterates over every bait of the segment; a bait shared by both roles of a single
    /// margin is yielded once per role.
    pub fn all_baits(&self) -> impl Iterator<Item = &Bait> {
        self.five_prime_baits
            .iter()
            .chain(self.three_prime_baits.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::fragment::{Margins, NO_SITE};

    fn fragment(start: u64, end: u64, gc5: f64, gc3: f64) -> Fragment {
        let interval = Interval::new(start, end);
        Fragment {
            chromosome: Arc::from("chr1"),
            interval,
            five_prime_site: Arc::from(NO_SITE),
            three_prime_site: Arc::from(NO_SITE),
            margins: Margins::for_interval(interval, 100),
            five_prime: Composition {
                gc: gc5,
                ..Default::default()
            },
            three_prime: Composition {
                gc: gc3,
                ..Default::default()
            },
        }
    }

    fn bait(start: u64, end: u64, shifted: bool) -> Bait {
        Bait {
            interval: Interval::new(start, end),
            composition: Composition::default(),
            shifted,
        }
    }

    #[test]
    fn key_order_is_chromosome_then_numeric_start() {
        let a = SegmentKey::new("chr1", 900);
        let b = SegmentKey::new("chr1", 1000);
        let c = SegmentKey::new("chr2", 5);
        assert!(a.preceeds(&b));
        assert!(b.preceeds(&c));
        assert!(!b.preceeds(&a));
        assert!(!a.preceeds(&a.clone()));
    }

    #[test]
    fn unbaited_segment_is_neither_balanced_nor_unilateral() {
        let segment = Segment::new(fragment(1, 1000, 0.4, 0.4));
        assert!(!segment.is_balanced());
        assert!(!segment.is_unilateral());
        assert!(!segment.is_well_placed());
    }

    #[test]
    fn segment_baited_on_both_ends_without_shift_is_well_placed() {
        let mut segment = Segment::new(fragment(1, 1000, 0.4, 0.45));
        segment.five_prime_baits.push(bait(1, 50, false));
        segment.three_prime_baits.push(bait(951, 1000, false));
        assert!(segment.is_balanced());
        assert!(segment.is_well_placed());
        assert!(!segment.has_high_gc_margin());
    }

    #[test]
    fn shifted_outer_bait_prevents_well_placed() {
        let mut segment = Segment::new(fragment(1, 1000, 0.4, 0.4));
        segment.five_prime_baits.push(bait(3, 52, true));
        segment.three_prime_baits.push(bait(951, 1000, false));
        assert!(segment.is_balanced());
        assert!(!segment.is_well_placed());
    }

    #[test]
    fn one_baited_margin_is_unilateral() {
        let mut segment = Segment::new(fragment(1, 1000, 0.4, 0.4));
        segment.three_prime_baits.push(bait(951, 1000, false));
        assert!(segment.is_unilateral());
        assert!(!segment.is_balanced());
    }

    #[test]
    fn gc_rich_margin_counts_only_when_baited() {
        let mut segment = Segment::new(fragment(1, 1000, 0.7, 0.4));
        segment.three_prime_baits.push(bait(951, 1000, false));
        assert!(!segment.has_high_gc_margin());

        segment.five_prime_baits.push(bait(1, 50, false));
        assert!(segment.has_high_gc_margin());
        assert!(!segment.is_well_placed());
    }
}
