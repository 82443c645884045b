use crate::core::models::fragment::Interval;
use crate::core::models::gene::Strand;
use crate::core::models::viewpoint::Approach;
use std::f64::consts::SQRT_2;

/// Gaussian model of how much a fragment contributes to a viewpoint, centred on the TSS.
///
/// Offsets are measured in the gene's orientation: negative upstream, positive downstream.
/// Each side has its own standard deviation of one sixth of that side's bound, so the model
/// is a two-piece normal distribution whose halves each carry half of the mass. The simple
/// approach uses one symmetric distribution sized by the larger bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringModel {
    upstream_sigma: f64,
    downstream_sigma: f64,
}

impl ScoringModel {
    pub fn new(approach: Approach, upstream_bound: u64, downstream_bound: u64) -> Self {
        match approach {
            Approach::Simple => {
                let sigma = upstream_bound.max(downstream_bound) as f64 / 6.0;
                Self {
                    upstream_sigma: sigma,
                    downstream_sigma: sigma,
                }
            }
            Approach::Extended => Self {
                upstream_sigma: upstream_bound as f64 / 6.0,
                downstream_sigma: downstream_bound as f64 / 6.0,
            },
        }
    }

    pub fn upstream_sigma(&self) -> f64 {
        self.upstream_sigma
    }

    pub fn downstream_sigma(&self) -> f64 {
        self.downstream_sigma
    }

    /// Probability mass of the model between two offsets, `from < to`.
    pub fn mass(&self, from: f64, to: f64) -> f64 {
        if to <= from {
            return 0.0;
        }
        let mass = if from >= 0.0 {
            self.tail(from) - self.tail(to)
        } else if to <= 0.0 {
            self.tail(to) - self.tail(from)
        } else {
            (0.5 - self.tail(from)) + (0.5 - self.tail(to))
        };
        mass.max(0.0)
    }

    /// Mass beyond `offset` on its own side of the TSS.
    fn tail(&self, offset: f64) -> f64 {
        let sigma = self.sigma_for(offset);
        let distance = offset.abs();
        if sigma <= 0.0 {
            return if distance > 0.0 { 0.0 } else { 0.5 };
        }
        0.5 * erfc(distance / (sigma * SQRT_2))
    }

    fn sigma_for(&self, offset: f64) -> f64 {
        if offset < 0.0 {
            self.upstream_sigma
        } else {
            self.downstream_sigma
        }
    }

    /// Mass covered by the genomic `interval` relative to a TSS on the given strand. Every
    /// base stands for the unit interval around its position.
    pub fn coverage(&self, tss: u64, strand: Strand, interval: Interval) -> f64 {
        let tss = tss as f64;
        let (from, to) = match strand {
            Strand::Plus => (interval.start as f64 - tss, interval.end as f64 - tss),
            Strand::Minus => (tss - interval.end as f64, tss - interval.start as f64),
        };
        self.mass(from - 0.5, to + 0.5)
    }

    /// Share of the window's mass covered by `segments`, in `[0, 1]`. Segments are clipped to
    /// the window and must not overlap each other.
    pub fn score(
        &self,
        tss: u64,
        strand: Strand,
        window: Interval,
        segments: impl IntoIterator<Item = Interval>,
    ) -> f64 {
        let total = self.coverage(tss, strand, window);
        if total <= 0.0 {
            return 0.0;
        }
        let covered: f64 = segments
            .into_iter()
            .filter(|segment| window.overlaps(segment.start, segment.end))
            .map(|segment| {
                let clipped = Interval::new(
                    segment.start.max(window.start),
                    segment.end.min(window.end),
                );
                self.coverage(tss, strand, clipped)
            })
            .sum();
        (covered / total).clamp(0.0, 1.0)
    }
}

/// Complementary error function, Chebyshev approximation with a fractional error below
/// 1.2e-7 everywhere, so that far tails keep their relative precision.
fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    #[rustfmt::skip]
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
        + t * (0.374_091_96
        + t * (0.096_784_18
        + t * (-0.186_288_06
        + t * (0.278_868_07
        + t * (-1.135_203_98
        + t * (1.488_515_87
        + t * (-0.822_152_23
        + t * 0.170_872_77))))))));
    let r = t * poly.exp();
    if x >= 0.0 { r } else { 2.0 - r }
}
