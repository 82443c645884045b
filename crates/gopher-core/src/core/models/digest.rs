use std::cmp::Ordering;

/// A single restriction cut on a chromosome.
///
/// `position` is the 1-based coordinate of the first base after the cut, so a cut
/// produces the boundary between fragments `[.., position - 1]` and `[position, ..]`.
/// `enzyme` is the index of the producing enzyme in the enzyme list used for the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest {
    pub position: u64,
    pub enzyme: usize,
}

impl Digest {
    pub fn new(position: u64, enzyme: usize) -> Self {
        Self { position, enzyme }
    }
}

impl PartialOrd for Digest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Digest {
    fn cmp(&self, other: &Self) -> Ordering {
        self.position
            .cmp(&other.position)
            .then(self.enzyme.cmp(&other.enzyme))
    }
}
