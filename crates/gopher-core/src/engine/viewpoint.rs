use super::config::{FilterConfig, ViewpointConfig};
use super::scoring::ScoringModel;
use crate::core::models::fragment::{Fragment, Interval};
use crate::core::models::gene::{GopherGene, Strand};
use crate::core::models::viewpoint::{Approach, ViewPoint};
use tracing::warn;

/// A viewpoint whose active segments are still indices into its chromosome's fragment list.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewpointDraft {
    /// The finished viewpoint except for [`ViewPoint::segments`], which stays empty until the
    /// active fragments are stored in the segment index.
    pub viewpoint: ViewPoint,
    /// Indices of the active fragments, ascending.
    pub active_fragments: Vec<usize>,
}

/// Outcome of checking one fragment against the filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentVerdict {
    pub long_enough: bool,
    pub five_prime_margin: bool,
    pub three_prime_margin: bool,
}

impl FragmentVerdict {
    pub fn is_active(&self, allow_single_margin: bool) -> bool {
        self.long_enough
            && if allow_single_margin {
                self.five_prime_margin || self.three_prime_margin
            } else {
                self.five_prime_margin && self.three_prime_margin
            }
    }
}

/// Selects the active segments around transcription start sites and scores the result.
#[derive(Debug, Clone, Copy)]
pub struct ViewpointBuilder {
    filters: FilterConfig,
    settings: ViewpointConfig,
}

impl ViewpointBuilder {
    pub fn new(filters: FilterConfig, settings: ViewpointConfig) -> Self {
        Self { filters, settings }
    }

    pub fn evaluate(&self, fragment: &Fragment) -> FragmentVerdict {
        FragmentVerdict {
            long_enough: fragment.len() >= self.filters.min_fragment_size,
            five_prime_margin: self.filters.accepts(&fragment.five_prime),
            three_prime_margin: self.filters.accepts(&fragment.three_prime),
        }
    }

    pub fn is_active(&self, fragment: &Fragment) -> bool {
        self.evaluate(fragment)
            .is_active(self.filters.allow_single_margin)
    }

    /// Builds the viewpoint of `gene` at `tss` from the ordered fragments of the gene's
    /// chromosome.
    pub fn build(&self, gene: &GopherGene, tss: u64, fragments: &[Fragment]) -> ViewpointDraft {
        let chromosome_length = fragments.last().map_or(0, Fragment::end);
        let tss_index = fragments.partition_point(|f| f.end() < tss);
        let tss_in_chromosome = fragments
            .get(tss_index)
            .is_some_and(|f| f.interval.contains(tss));
        if !tss_in_chromosome {
            warn!(
                gene = %gene.symbol,
                chromosome = %gene.chromosome,
                tss,
                chromosome_length,
                "TSS lies outside the chromosome; viewpoint left unresolved"
            );
            return self.unresolved(gene, tss);
        }

        let (window, candidates, upstream_bound, downstream_bound) = match self.settings.approach
        {
            Approach::Simple => self.simple_candidates(gene.strand, tss, tss_index, fragments),
            Approach::Extended => {
                self.extended_candidates(gene.strand, tss, chromosome_length, fragments)
            }
        };

        let active_fragments: Vec<usize> = candidates
            .filter(|&i| self.is_active(&fragments[i]))
            .collect();

        let model = ScoringModel::new(self.settings.approach, upstream_bound, downstream_bound);
        let score = model.score(
            tss,
            gene.strand,
            window,
            active_fragments.iter().map(|&i| fragments[i].interval),
        );

        let viewpoint = ViewPoint {
            target_name: gene.symbol.clone(),
            accession: gene.accession.clone(),
            chromosome: gene.chromosome.clone(),
            strand: gene.strand,
            tss,
            window,
            upstream_bound,
            downstream_bound,
            segments: Vec::new(),
            score,
            approach: self.settings.approach,
            patched: self.settings.approach == Approach::Simple && active_fragments.len() > 1,
            tss_fragment_selected: active_fragments.contains(&tss_index),
        };
        ViewpointDraft {
            viewpoint,
            active_fragments,
        }
    }

    /// The TSS fragment and up to `tiling_factor` fragments on each side; the window spans
    /// their outer edges.
    fn simple_candidates(
        &self,
        strand: Strand,
        tss: u64,
        tss_index: usize,
        fragments: &[Fragment],
    ) -> (Interval, std::ops::RangeInclusive<usize>, u64, u64) {
        let first = tss_index.saturating_sub(self.settings.tiling_factor);
        let last = (tss_index + self.settings.tiling_factor).min(fragments.len() - 1);
        let window = Interval::new(fragments[first].start(), fragments[last].end());
        let (upstream, downstream) = oriented_bounds(strand, tss, window);
        (window, first..=last, upstream, downstream)
    }

    /// Every fragment overlapping `[tss - upstream, tss + downstream]` in the gene's
    /// orientation, clamped to the chromosome.
    fn extended_candidates(
        &self,
        strand: Strand,
        tss: u64,
        chromosome_length: u64,
        fragments: &[Fragment],
    ) -> (Interval, std::ops::RangeInclusive<usize>, u64, u64) {
        let upstream = self.settings.upstream_size;
        let downstream = self.settings.downstream_size;
        let (left, right) = match strand {
            Strand::Plus => (upstream, downstream),
            Strand::Minus => (downstream, upstream),
        };
        let window = Interval::new(
            tss.saturating_sub(left).max(1),
            tss.saturating_add(right).min(chromosome_length),
        );
        let first = fragments.partition_point(|f| f.end() < window.start);
        let last = fragments.partition_point(|f| f.start() <= window.end) - 1;
        (window, first..=last, upstream, downstream)
    }

    fn unresolved(&self, gene: &GopherGene, tss: u64) -> ViewpointDraft {
        ViewpointDraft {
            viewpoint: ViewPoint {
                target_name: gene.symbol.clone(),
                accession: gene.accession.clone(),
                chromosome: gene.chromosome.clone(),
                strand: gene.strand,
                tss,
                window: Interval::new(tss.max(1), tss.max(1)),
                upstream_bound: 0,
                downstream_bound: 0,
                segments: Vec::new(),
                score: 0.0,
                approach: self.settings.approach,
                patched: false,
                tss_fragment_selected: false,
            },
            active_fragments: Vec::new(),
        }
    }
}

/// Distances from the TSS to the window edges, upstream first in the gene's orientation.
fn oriented_bounds(strand: Strand, tss: u64, window: Interval) -> (u64, u64) {
    let left = tss - window.start;
    let right = window.end - tss;
    match strand {
        Strand::Plus => (left, right),
        Strand::Minus => (right, left),
    }
}
