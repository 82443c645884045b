use super::fragment::Interval;
use super::gene::Strand;
use super::ids::SegmentId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Strategy used to pick the candidate fragments of a viewpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Approach {
    /// The fragment containing the TSS and a fixed number of neighbouring fragments.
    #[default]
    Simple,
    /// Every fragment within user-defined distances upstream and downstream of the TSS.
    Extended,
}

impl FromStr for Approach {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Approach::Simple),
            "extended" => Ok(Approach::Extended),
            other => Err(format!(
                "unknown approach '{}', expected 'simple' or 'extended'",
                other
            )),
        }
    }
}

impl fmt::Display for Approach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Approach::Simple => write!(f, "simple"),
            Approach::Extended => write!(f, "extended"),
        }
    }
}

/// The fragments selected for enrichment around one transcription start site.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewPoint {
    pub target_name: String,
    pub accession: String,
    pub chromosome: String,
    pub strand: Strand,
    pub tss: u64,
    /// Genomic window the candidate fragments were drawn from.
    pub window: Interval,
    /// Extent of the window upstream of the TSS, in the gene's orientation.
    pub upstream_bound: u64,
    /// Extent of the window downstream of the TSS, in the gene's orientation.
    pub downstream_bound: u64,
    /// Active segments in ascending genomic order.
    pub segments: Vec<SegmentId>,
    pub score: f64,
    pub approach: Approach,
    pub patched: bool,
    /// The fragment containing the TSS is among the active segments.
    pub tss_fragment_selected: bool,
}

impl ViewPoint {
    /// A viewpoint without active segments is unresolved; it is reported but not counted.
    pub fn is_resolved(&self) -> bool {
        !self.segments.is_empty()
    }

    pub fn active_segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Short label for exports: `simple`, `extended` or `patched`.
    pub fn tag(&self) -> &'static str {
        match (self.approach, self.patched) {
            (Approach::Simple, true) => "patched",
            (Approach::Simple, false) => "simple",
            (Approach::Extended, _) => "extended",
        }
    }
}
