use crate::core::models::digest::Digest;
use crate::core::models::enzyme::RestrictionEnzyme;

/// Finds the cut positions of a fixed set of enzymes in chromosome sequences.
///
/// The scanner holds no state between calls; each chromosome is scanned independently and
/// cut positions from different chromosomes are never compared.
#[derive(Debug, Clone)]
pub struct RestrictionSiteScanner {
    enzymes: Vec<RestrictionEnzyme>,
}

impl RestrictionSiteScanner {
    pub fn new(enzymes: Vec<RestrictionEnzyme>) -> Self {
        Self { enzymes }
    }

    pub fn enzymes(&self) -> &[RestrictionEnzyme] {
        &self.enzymes
    }

    /// Returns every cut of every enzyme in `sequence`, sorted by position.
    ///
    /// Matching ignores case and may overlap. When two enzymes cut at the same position both
    /// digests are kept.
    pub fn scan(&self, sequence: &[u8]) -> Vec<Digest> {
        let mut digests = Vec::new();
        for (index, enzyme) in self.enzymes.iter().enumerate() {
            let pattern_len = enzyme.pattern().len();
            if pattern_len > sequence.len() {
                continue;
            }
            for start in 0..=(sequence.len() - pattern_len) {
                if enzyme.matches_at(sequence, start) {
                    let position = (start + enzyme.cut_offset()) as u64 + 1;
                    digests.push(Digest::new(position, index));
                }
            }
        }
        digests.sort_unstable();
        digests
    }
}
