use super::config::{BaitConfig, FilterConfig};
use crate::core::digest::composition::composition_of;
use crate::core::io::alignability::ChromosomeAlignability;
use crate::core::models::fragment::{Composition, Interval, Margins};
use crate::core::models::segment::{Bait, Segment};

/// Places fixed-length probes in the usable margins of active segments.
///
/// Probes are laid from the outer edge of a margin inwards: from the segment start in the
/// 5' margin and from the segment end in the 3' margin. A candidate that fails the GC,
/// repeat or alignability limits is slid one base further in; an accepted one is followed
/// by the next candidate directly after it. Placement stops at `max_bait_count`, and a
/// margin that ends up with fewer than `min_bait_count` probes keeps none.
#[derive(Debug, Clone, Copy)]
pub struct BaitPlacer {
    settings: BaitConfig,
    filters: FilterConfig,
}

impl BaitPlacer {
    pub fn new(settings: BaitConfig, filters: FilterConfig) -> Self {
        Self { settings, filters }
    }

    /// Replaces the baits of `segment`. Margins that fail the margin filters stay unbaited.
    pub fn place(
        &self,
        segment: &mut Segment,
        sequence: &[u8],
        alignability: Option<&ChromosomeAlignability>,
    ) {
        let fragment = &segment.fragment;
        let bounds = fragment.interval;
        let five_prime_usable = self.filters.accepts(&fragment.five_prime);
        let three_prime_usable = self.filters.accepts(&fragment.three_prime);

        let (five_prime, three_prime) = match fragment.margins {
            Margins::Split {
                upstream,
                downstream,
            } => {
                let five_prime = if five_prime_usable {
                    self.scan(upstream, Direction::FromStart, sequence, alignability)
                } else {
                    Vec::new()
                };
                let three_prime = if three_prime_usable {
                    self.scan(downstream, Direction::FromEnd, sequence, alignability)
                } else {
                    Vec::new()
                };
                (five_prime, three_prime)
            }
            Margins::Single(margin) => {
                if five_prime_usable || three_prime_usable {
                    let placed = self.scan(margin, Direction::FromStart, sequence, alignability);
                    let mut reversed = placed.clone();
                    reversed.reverse();
                    (placed, reversed)
                } else {
                    (Vec::new(), Vec::new())
                }
            }
        };

        segment.five_prime_baits = five_prime
            .into_iter()
            .map(|(interval, composition)| Bait {
                interval,
                composition,
                shifted: interval.start != bounds.start,
            })
            .collect();
        segment.three_prime_baits = three_prime
            .into_iter()
            .map(|(interval, composition)| Bait {
                interval,
                composition,
                shifted: interval.end != bounds.end,
            })
            .collect();
    }

    /// Greedy placement inside `margin`; the first probe returned is the outermost one.
    fn scan(
        &self,
        margin: Interval,
        direction: Direction,
        sequence: &[u8],
        alignability: Option<&ChromosomeAlignability>,
    ) -> Vec<(Interval, Composition)> {
        let length = self.settings.probe_length;
        let mut placed = Vec::new();
        if length == 0 || margin.len() < length {
            return placed;
        }

        // Candidate offsets from the margin's outer edge, in bases.
        let last_offset = margin.len() - length;
        let mut offset = 0u64;
        while offset <= last_offset && placed.len() < self.settings.max_bait_count {
            let candidate = match direction {
                Direction::FromStart => {
                    let start = margin.start + offset;
                    Interval::new(start, start + length - 1)
                }
                Direction::FromEnd => {
                    let end = margin.end - offset;
                    Interval::new(end + 1 - length, end)
                }
            };
            let composition = composition_of(sequence, candidate, alignability);
            if self.filters.accepts(&composition) {
                placed.push((candidate, composition));
                offset += length;
            } else {
                offset += 1;
            }
        }

        if placed.len() < self.settings.min_bait_count {
            placed.clear();
        }
        placed
    }
}

/// The margin edge probes are laid from. Both directions move towards the fragment centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    FromStart,
    FromEnd,
}
