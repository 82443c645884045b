use super::composition::composition_of;
use crate::core::io::alignability::ChromosomeAlignability;
use crate::core::models::digest::Digest;
use crate::core::models::enzyme::RestrictionEnzyme;
use crate::core::models::fragment::{Fragment, Interval, Margins, NO_SITE};
use itertools::Itertools;
use std::collections::HashMap;
use std::sync::Arc;

/// Turns the sorted cut positions of one chromosome into restriction fragments.
///
/// The fragments partition `[1, len(sequence)]`: the first starts at 1, each cut starts a
/// new fragment and the last ends at the chromosome end. Cuts at position 1 or past the end
/// of the sequence, and repeated cuts at one position, would produce empty fragments and are
/// folded into their neighbours instead.
#[derive(Debug, Clone)]
pub struct FragmentBuilder {
    margin_size: u64,
    enzyme_names: Vec<Arc<str>>,
    no_site: Arc<str>,
}

impl FragmentBuilder {
    pub fn new(enzymes: &[RestrictionEnzyme], margin_size: u64) -> Self {
        Self {
            margin_size,
            enzyme_names: enzymes.iter().map(|e| Arc::from(e.name())).collect(),
            no_site: Arc::from(NO_SITE),
        }
    }

    pub fn build(
        &self,
        chromosome: &str,
        sequence: &[u8],
        digests: &[Digest],
        alignability: Option<&ChromosomeAlignability>,
    ) -> Vec<Fragment> {
        let length = sequence.len() as u64;
        if length == 0 {
            return Vec::new();
        }

        let chromosome: Arc<str> = Arc::from(chromosome);
        let boundaries = self.boundaries(digests, length);

        let mut fragments = Vec::with_capacity(boundaries.len() + 1);
        let mut start = 1;
        let mut five_prime_site = self.no_site.clone();
        for (position, site) in boundaries {
            let interval = Interval::new(start, position - 1);
            fragments.push(self.fragment(
                &chromosome,
                sequence,
                interval,
                five_prime_site,
                site.clone(),
                alignability,
            ));
            start = position;
            five_prime_site = site;
        }
        fragments.push(self.fragment(
            &chromosome,
            sequence,
            Interval::new(start, length),
            five_prime_site,
            self.no_site.clone(),
            alignability,
        ));
        fragments
    }

    /// Distinct cut positions strictly inside the chromosome, each labelled with the names of
    /// every enzyme cutting there.
    fn boundaries(&self, digests: &[Digest], length: u64) -> Vec<(u64, Arc<str>)> {
        let mut labels: HashMap<Vec<usize>, Arc<str>> = HashMap::new();
        digests
            .iter()
            .filter(|digest| digest.position > 1 && digest.position <= length)
            .chunk_by(|digest| digest.position)
            .into_iter()
            .map(|(position, group)| {
                let enzymes: Vec<usize> = group.map(|d| d.enzyme).sorted().dedup().collect();
                let label = labels
                    .entry(enzymes)
                    .or_insert_with_key(|enzymes| self.label(enzymes))
                    .clone();
                (position, label)
            })
            .collect()
    }

    fn label(&self, enzymes: &[usize]) -> Arc<str> {
        if let [single] = enzymes {
            if let Some(name) = self.enzyme_names.get(*single) {
                return name.clone();
            }
        }
        let joined = enzymes
            .iter()
            .filter_map(|&index| self.enzyme_names.get(index))
            .join("/");
        Arc::from(joined)
    }

    fn fragment(
        &self,
        chromosome: &Arc<str>,
        sequence: &[u8],
        interval: Interval,
        five_prime_site: Arc<str>,
        three_prime_site: Arc<str>,
        alignability: Option<&ChromosomeAlignability>,
    ) -> Fragment {
        let margins = Margins::for_interval(interval, self.margin_size);
        let five_prime = composition_of(sequence, margins.upstream(), alignability);
        let three_prime = if margins.is_single() {
            five_prime
        } else {
            composition_of(sequence, margins.downstream(), alignability)
        };
        Fragment {
            chromosome: chromosome.clone(),
            interval,
            five_prime_site,
            three_prime_site,
            margins,
            five_prime,
            three_prime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::digest::scanner::RestrictionSiteScanner;

    fn digest(sequence: &[u8], sites: &[(&str, &str)], margin_size: u64) -> Vec<Fragment> {
        let enzymes: Vec<RestrictionEnzyme> = sites
            .iter()
            .map(|(name, site)| RestrictionEnzyme::from_site(name, site).unwrap())
            .collect();
        let digests = RestrictionSiteScanner::new(enzymes.clone()).scan(sequence);
        FragmentBuilder::new(&enzymes, margin_size).build("chr1", sequence, &digests, None)
    }

    fn assert_partition(fragments: &[Fragment], length: u64) {
        assert_eq!(fragments.first().unwrap().start(), 1);
        assert_eq!(fragments.last().unwrap().end(), length);
        for pair in fragments.windows(2) {
            assert_eq!(pair[0].end() + 1, pair[1].start());
        }
        assert!(fragments.iter().all(|f| f.start() <= f.end()));
        assert_eq!(fragments.iter().map(Fragment::len).sum::<u64>(), length);
    }

    #[test]
    fn hindiii_site_splits_sequence_after_first_base() {
        let fragments = digest(b"AAGCTT", &[("HindIII", "A^AGCTT")], 150);
        let intervals: Vec<(u64, u64)> = fragments
            .iter()
            .map(|f| (f.start(), f.end()))
            .collect();
        assert_eq!(intervals, vec![(1, 1), (2, 6)]);
        assert_eq!(&*fragments[0].five_prime_site, NO_SITE);
        assert_eq!(&*fragments[0].three_prime_site, "HindIII");
        assert_eq!(&*fragments[1].five_prime_site, "HindIII");
        assert_eq!(&*fragments[1].three_prime_site, NO_SITE);
    }

    #[test]
    fn sequence_without_sites_is_one_fragment() {
        let fragments = digest(b"ACGTACGTAC", &[("HindIII", "A^AGCTT")], 150);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].interval, Interval::new(1, 10));
        assert_eq!(&*fragments[0].five_prime_site, NO_SITE);
        assert_eq!(&*fragments[0].three_prime_site, NO_SITE);
    }

    #[test]
    fn fragments_partition_the_chromosome() {
        let sequence = b"GATCAAGCTTTTTTGATCGATCAAAAAGCTTAAGCTTCCCGATC";
        let fragments = digest(
            sequence,
            &[("HindIII", "A^AGCTT"), ("DpnII", "^GATC")],
            5,
        );
        assert_partition(&fragments, sequence.len() as u64);
    }

    #[test]
    fn cut_at_first_base_produces_no_empty_fragment() {
        let sequence = b"GATCAAAAAA";
        let fragments = digest(sequence, &[("DpnII", "^GATC")], 5);
        assert_eq!(fragments.len(), 1);
        assert_partition(&fragments, sequence.len() as u64);
    }

    #[test]
    fn cut_past_the_last_base_produces_no_empty_fragment() {
        let sequence = b"AAAAAACATG";
        let fragments = digest(sequence, &[("NlaIII", "CATG^")], 5);
        assert_eq!(fragments.len(), 1);
        assert_partition(&fragments, sequence.len() as u64);
    }

    #[test]
    fn shared_cut_is_labelled_with_both_enzymes() {
        let sequence = b"TTTTGATCTTTT";
        let fragments = digest(sequence, &[("DpnII", "^GATC"), ("MboI", "^GATC")], 5);
        assert_eq!(fragments.len(), 2);
        assert_eq!(&*fragments[0].three_prime_site, "DpnII/MboI");
        assert_eq!(&*fragments[1].five_prime_site, "DpnII/MboI");
        assert_partition(&fragments, sequence.len() as u64);
    }

    #[test]
    fn margin_composition_is_recorded_per_end() {
        // 20 bp fragment: GC-rich 5' margin, soft-masked AT 3' margin.
        let sequence = b"GGGGGAAAAAAAAAAatata";
        let fragments = digest(sequence, &[("HindIII", "A^AGCTT")], 5);
        assert_eq!(fragments.len(), 1);
        let fragment = &fragments[0];
        assert!(!fragment.margins.is_single());
        assert_eq!(fragment.five_prime.gc, 1.0);
        assert_eq!(fragment.five_prime.repeat, 0.0);
        assert_eq!(fragment.three_prime.gc, 0.0);
        assert_eq!(fragment.three_prime.repeat, 1.0);
    }

    #[test]
    fn short_fragment_shares_one_composition() {
        let fragments = digest(b"GGGGAAAA", &[("HindIII", "A^AGCTT")], 5);
        let fragment = &fragments[0];
        assert!(fragment.margins.is_single());
        assert_eq!(fragment.five_prime, fragment.three_prime);
        assert_eq!(fragment.five_prime.gc, 0.5);
    }

    #[test]
    fn digestion_is_deterministic() {
        let sequence = b"GATCAAGCTTTTTTGATCGATCAAAAAGCTTAAGCTTCCCGATC";
        let sites = [("HindIII", "A^AGCTT"), ("DpnII", "^GATC")];
        assert_eq!(digest(sequence, &sites, 5), digest(sequence, &sites, 5));
    }
}
