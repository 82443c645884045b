use std::sync::Arc;

/// Label used for the flank of a fragment that touches a chromosome end.
pub const NO_SITE: &str = "None";

/// A closed, 1-based genomic interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interval {
    pub start: u64,
    pub end: u64,
}

impl Interval {
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "interval start must not exceed its end");
        Self { start, end }
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub fn contains(&self, position: u64) -> bool {
        self.start <= position && position <= self.end
    }

    #[inline]
    pub fn overlaps(&self, start: u64, end: u64) -> bool {
        self.start <= end && start <= self.end
    }


    /// Converts to the 0-based half-open range used for slicing sequences.
    #[inline]
    pub fn as_range(&self) -> std::ops::Range<usize> {
        (self.start - 1) as usize..self.end as usize
    }
}

/// The margins of a fragment, the stretches next to its cut sites that probes are placed in.
///
/// A fragment at least twice as long as the margin size has two disjoint margins of exactly
/// `margin_size` nucleotides, one at each end. A shorter fragment has one margin spanning the
/// whole fragment, which plays both the upstream and the downstream role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Margins {
    Split {
        upstream: Interval,
        downstream: Interval,
    },
    Single(Interval),
}

impl Margins {
    pub fn for_interval(fragment: Interval, margin_size: u64) -> Self {
        if margin_size > 0 && fragment.len() >= 2 * margin_size {
            Margins::Split {
                upstream: Interval::new(fragment.start, fragment.start + margin_size - 1),
                downstream: Interval::new(fragment.end - margin_size + 1, fragment.end),
            }
        } else {
            Margins::Single(fragment)
        }
    }

    /// The 5' (lower-coordinate) margin.
    pub fn upstream(&self) -> Interval {
        match *self {
            Margins::Split { upstream, .. } => upstream,
            Margins::Single(margin) => margin,
        }
    }

    /// The 3' (higher-coordinate) margin.
    pub fn downstream(&self) -> Interval {
        match *self {
            Margins::Split { downstream, .. } => downstream,
            Margins::Single(margin) => margin,
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self, Margins::Single(_))
    }

    /// Number of distinct nucleotides covered by the margins.
    pub fn total_len(&self) -> u64 {
        match self {
            Margins::Split {
                upstream,
                downstream,
            } => upstream.len() + downstream.len(),
            Margins::Single(margin) => margin.len(),
        }
    }
}

/// Composition of an interval: GC and repeat content as fractions in `[0, 1]`, and the
/// mean k-mer alignability if an alignability map covers it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Composition {
    pub gc: f64,
    pub repeat: f64,
    pub alignability: Option<f64>,
}

/// A restriction fragment produced by digesting one chromosome.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub chromosome: Arc<str>,
    pub interval: Interval,
    /// Enzyme(s) cutting at the 5' end, or [`NO_SITE`] at the chromosome start.
    pub five_prime_site: Arc<str>,
    /// Enzyme(s) cutting at the 3' end, or [`NO_SITE`] at the chromosome end.
    pub three_prime_site: Arc<str>,
    pub margins: Margins,
    pub five_prime: Composition,
    pub three_prime: Composition,
}

impl Fragment {
    pub fn start(&self) -> u64 {
        self.interval.start
    }

    pub fn end(&self) -> u64 {
        self.interval.end
    }

    pub fn len(&self) -> u64 {
        self.interval.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}
