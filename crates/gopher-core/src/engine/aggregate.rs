use super::index::SegmentIndex;
use crate::core::io::output::{OutputError, write_atomic};
use crate::core::models::fragment::{Interval, Margins};
use crate::core::models::ids::SegmentId;
use crate::core::models::segment::Segment;
use crate::core::models::viewpoint::ViewPoint;
use itertools::Itertools;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::io::{self, Write};
use std::path::Path;

/// Panel-wide summary of a design. Derived from the viewpoints and the segment index and
/// never edited directly.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DesignStatistics {
    pub genes: usize,
    pub resolved_genes: usize,
    pub viewpoints: usize,
    pub resolved_viewpoints: usize,
    pub patched_viewpoints: usize,
    pub unique_fragments: usize,
    pub mean_score: f64,
    pub mean_viewpoint_size: f64,
    pub mean_fragments_per_viewpoint: f64,
    pub total_margin_nucleotides: u64,
    pub mean_repeat_content: f64,
    pub estimated_probe_count: u64,
    pub placed_probes: usize,
    pub capture_size: u64,
    pub balanced_fragments: usize,
    pub unbalanced_fragments: usize,
    pub unbaited_fragments: usize,
    pub well_placed_fragments: usize,
    pub high_gc_fragments: usize,
}

impl DesignStatistics {
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn write_toml(&self, path: &Path) -> Result<(), OutputError> {
        write_atomic(path, |file| {
            let text = self.to_toml().map_err(io::Error::other)?;
            file.write_all(text.as_bytes())
        })
    }
}

/// Computes [`DesignStatistics`] over a finished design.
///
/// A segment shared by several viewpoints is counted once everywhere: in the fragment and
/// bait classifications, in the margin nucleotides and in the capture size.
#[derive(Debug, Clone, Copy)]
pub struct DesignAggregator {
    probe_length: u64,
}

impl DesignAggregator {
    pub fn new(probe_length: u64) -> Self {
        Self { probe_length }
    }

    pub fn summarize(&self, viewpoints: &[ViewPoint], index: &SegmentIndex) -> DesignStatistics {
        let mut stats = DesignStatistics {
            viewpoints: viewpoints.len(),
            ..Default::default()
        };

        let resolved: Vec<&ViewPoint> = viewpoints.iter().filter(|vp| vp.is_resolved()).collect();
        stats.resolved_viewpoints = resolved.len();
        stats.patched_viewpoints = viewpoints.iter().filter(|vp| vp.patched).count();
        stats.genes = viewpoints
            .iter()
            .map(|vp| (vp.target_name.as_str(), vp.chromosome.as_str()))
            .unique()
            .count();
        stats.resolved_genes = resolved
            .iter()
            .map(|vp| (vp.target_name.as_str(), vp.chromosome.as_str()))
            .unique()
            .count();

        if !resolved.is_empty() {
            let n = resolved.len() as f64;
            stats.mean_score = resolved.iter().map(|vp| vp.score).sum::<f64>() / n;
            stats.mean_viewpoint_size =
                resolved.iter().map(|vp| vp.window.len() as f64).sum::<f64>() / n;
            stats.mean_fragments_per_viewpoint =
                resolved.iter().map(|vp| vp.segments.len() as f64).sum::<f64>() / n;
        }

        let mut seen = HashSet::new();
        let segments: Vec<&Segment> = viewpoints
            .iter()
            .flat_map(|vp| vp.segments.iter().copied())
            .filter(|&id: &SegmentId| seen.insert(id))
            .filter_map(|id| index.get(id))
            .collect();
        stats.unique_fragments = segments.len();

        let mut repeat_weighted = 0.0;
        let mut margin_length = 0u64;
        for segment in &segments {
            stats.total_margin_nucleotides += segment
                .fragment
                .margins
                .total_len()
                .min(2 * self.probe_length);
            let (length, repeat) = margin_repeat(segment);
            margin_length += length;
            repeat_weighted += repeat;

            stats.placed_probes += segment
                .all_baits()
                .map(|bait| bait.interval)
                .unique()
                .count();
            if segment.is_balanced() {
                stats.balanced_fragments += 1;
            } else if segment.is_unilateral() {
                stats.unbalanced_fragments += 1;
            } else {
                stats.unbaited_fragments += 1;
            }
            if segment.is_well_placed() {
                stats.well_placed_fragments += 1;
            }
            if segment.has_high_gc_margin() {
                stats.high_gc_fragments += 1;
            }
        }
        if margin_length > 0 {
            stats.mean_repeat_content = repeat_weighted / margin_length as f64;
        }
        if self.probe_length > 0 {
            let effective =
                stats.total_margin_nucleotides as f64 * (1.0 - stats.mean_repeat_content);
            stats.estimated_probe_count = (effective / self.probe_length as f64).round() as u64;
        }
        stats.capture_size = capture_size(&segments);
        stats
    }
}

/// Total margin length of a segment and its repeat bases.
fn margin_repeat(segment: &Segment) -> (u64, f64) {
    let fragment = &segment.fragment;
    match fragment.margins {
        Margins::Split {
            upstream,
            downstream,
        } => (
            upstream.len() + downstream.len(),
            upstream.len() as f64 * fragment.five_prime.repeat
                + downstream.len() as f64 * fragment.three_prime.repeat,
        ),
        Margins::Single(margin) => (
            margin.len(),
            margin.len() as f64 * fragment.five_prime.repeat,
        ),
    }
}

/// Number of distinct genomic positions covered by at least one bait.
fn capture_size(segments: &[&Segment]) -> u64 {
    let mut by_chromosome: BTreeMap<&str, Vec<Interval>> = BTreeMap::new();
    for segment in segments {
        by_chromosome
            .entry(segment.chromosome())
            .or_default()
            .extend(segment.all_baits().map(|bait| bait.interval));
    }
    by_chromosome
        .into_values()
        .map(|mut intervals| {
            intervals.sort_by_key(|interval| (interval.start, interval.end));
            intervals
                .into_iter()
                .coalesce(|a, b| {
                    if b.start <= a.end {
                        Ok(Interval::new(a.start, a.end.max(b.end)))
                    } else {
                        Err((a, b))
                    }
                })
                .map(|interval| interval.len())
                .sum::<u64>()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::fragment::{Composition, Fragment, NO_SITE};
    use crate::core::models::gene::Strand;
    use crate::core::models::segment::Bait;
    use crate::core::models::viewpoint::Approach;
    use std::sync::Arc;

    fn segment(start: u64, end: u64, margin: u64, repeat: f64) -> Segment {
        let interval = Interval::new(start, end);
        let composition = Composition {
            gc: 0.4,
            repeat,
            alignability: None,
        };
        Segment::new(Fragment {
            chromosome: Arc::from("chr1"),
            interval,
            five_prime_site: Arc::from(NO_SITE),
            three_prime_site: Arc::from(NO_SITE),
            margins: Margins::for_interval(interval, margin),
            five_prime: composition,
            three_prime: composition,
        })
    }

    fn bait(start: u64, end: u64, shifted: bool) -> Bait {
        Bait {
            interval: Interval::new(start, end),
            composition: Composition {
                gc: 0.4,
                repeat: 0.0,
                alignability: None,
            },
            shifted,
        }
    }

    fn viewpoint(name: &str, tss: u64, window: Interval, segments: Vec<SegmentId>) -> ViewPoint {
        ViewPoint {
            target_name: name.to_string(),
            accession: format!("NM_{}", tss),
            chromosome: "chr1".to_string(),
            strand: Strand::Plus,
            tss,
            window,
            upstream_bound: tss - window.start,
            downstream_bound: window.end - tss,
            patched: segments.len() > 1,
            segments,
            score: 0.5,
            approach: Approach::Simple,
            tss_fragment_selected: true,
        }
    }

    #[test]
    fn shared_segment_is_counted_once() {
        let mut index = SegmentIndex::new();
        let shared = index.insert(segment(1001, 2000, 100, 0.0));
        let left = index.insert(segment(1, 1000, 100, 0.0));
        let right = index.insert(segment(2001, 3000, 100, 0.0));
        let viewpoints = vec![
            viewpoint("A", 900, Interval::new(1, 2000), vec![left, shared]),
            viewpoint("B", 2100, Interval::new(1001, 3000), vec![shared, right]),
        ];

        let stats = DesignAggregator::new(120).summarize(&viewpoints, &index);
        assert_eq!(stats.unique_fragments, 3);
        assert_eq!(stats.viewpoints, 2);
        assert_eq!(stats.resolved_viewpoints, 2);
        assert_eq!(stats.patched_viewpoints, 2);
        assert_eq!(stats.total_margin_nucleotides, 3 * 200);
        assert_eq!(stats.mean_fragments_per_viewpoint, 2.0);
        assert_eq!(stats.mean_viewpoint_size, 2000.0);
    }

    #[test]
    fn unresolved_viewpoints_are_listed_but_not_counted_as_resolved() {
        let mut index = SegmentIndex::new();
        let id = index.insert(segment(1, 1000, 100, 0.0));
        let viewpoints = vec![
            viewpoint("A", 500, Interval::new(1, 1000), vec![id]),
            viewpoint("A", 700, Interval::new(1, 1000), vec![]),
            viewpoint("B", 800, Interval::new(1, 1000), vec![]),
        ];
        let stats = DesignAggregator::new(120).summarize(&viewpoints, &index);
        assert_eq!(stats.genes, 2);
        assert_eq!(stats.resolved_genes, 1);
        assert_eq!(stats.viewpoints, 3);
        assert_eq!(stats.resolved_viewpoints, 1);
        assert_eq!(stats.mean_score, 0.5);
    }

    #[test]
    fn margin_nucleotides_are_capped_and_discounted_for_repeats() {
        let mut index = SegmentIndex::new();
        // Margins of 2 x 500 bp are capped at 2 x 120 bp.
        let id = index.insert(segment(1, 5000, 500, 0.5));
        let viewpoints = vec![viewpoint("A", 100, Interval::new(1, 5000), vec![id])];
        let stats = DesignAggregator::new(120).summarize(&viewpoints, &index);
        assert_eq!(stats.total_margin_nucleotides, 240);
        assert_eq!(stats.mean_repeat_content, 0.5);
        assert_eq!(stats.estimated_probe_count, 1);
    }

    #[test]
    fn capture_size_counts_overlapping_baits_once() {
        let mut index = SegmentIndex::new();
        let id = index.insert(segment(1, 100, 60, 0.0));
        let stored = index.get_mut(id).unwrap();
        // A single margin: the same probes serve both roles.
        stored.five_prime_baits = vec![bait(1, 20, false), bait(15, 34, true)];
        stored.three_prime_baits = vec![bait(81, 100, false), bait(15, 34, true)];

        let viewpoints = vec![viewpoint("A", 50, Interval::new(1, 100), vec![id])];
        let stats = DesignAggregator::new(20).summarize(&viewpoints, &index);
        assert_eq!(stats.capture_size, 34 + 20);
        assert_eq!(stats.placed_probes, 3);
        assert_eq!(stats.balanced_fragments, 1);
        assert_eq!(stats.well_placed_fragments, 1);
    }

    #[test]
    fn baits_classify_fragments() {
        let mut index = SegmentIndex::new();
        let balanced = index.insert(segment(1, 1000, 100, 0.0));
        let unilateral = index.insert(segment(1001, 2000, 100, 0.0));
        let bare = index.insert(segment(2001, 3000, 100, 0.0));
        index.get_mut(balanced).unwrap().five_prime_baits = vec![bait(1, 50, false)];
        index.get_mut(balanced).unwrap().three_prime_baits = vec![bait(951, 1000, true)];
        index.get_mut(unilateral).unwrap().five_prime_baits = vec![bait(1001, 1050, false)];

        let viewpoints = vec![viewpoint(
            "A",
            1500,
            Interval::new(1, 3000),
            vec![balanced, unilateral, bare],
        )];
        let stats = DesignAggregator::new(50).summarize(&viewpoints, &index);
        assert_eq!(stats.balanced_fragments, 1);
        assert_eq!(stats.unbalanced_fragments, 1);
        assert_eq!(stats.unbaited_fragments, 1);
        assert_eq!(stats.well_placed_fragments, 0);
        assert_eq!(stats.capture_size, 150);
    }

    #[test]
    fn statistics_serialise_to_toml() {
        let stats = DesignStatistics {
            genes: 3,
            mean_score: 0.25,
            ..Default::default()
        };
        let text = stats.to_toml().unwrap();
        assert!(text.contains("genes = 3"));
        assert!(text.contains("mean-score = 0.25"));
    }
}
