use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strand {
    Plus,
    Minus,
}

impl FromStr for Strand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" => Ok(Strand::Plus),
            "-" => Ok(Strand::Minus),
            other => Err(format!("invalid strand '{}'", other)),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Plus => write!(f, "+"),
            Strand::Minus => write!(f, "-"),
        }
    }
}

/// A target gene and the distinct transcription start sites of its transcripts.
///
/// Each TSS yields its own viewpoint, so a gene with alternative promoters produces
/// several independent viewpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GopherGene {
    pub symbol: String,
    pub accession: String,
    pub chromosome: String,
    pub strand: Strand,
    tss: BTreeSet<u64>,
}

impl GopherGene {
    pub fn new(symbol: &str, accession: &str, chromosome: &str, strand: Strand) -> Self {
        Self {
            symbol: symbol.to_string(),
            accession: accession.to_string(),
            chromosome: chromosome.to_string(),
            strand,
            tss: BTreeSet::new(),
        }
    }

    /// Records a 1-based TSS position. Returns `false` if it was already known.
    pub fn add_tss(&mut self, position: u64) -> bool {
        self.tss.insert(position)
    }

    /// TSS positions in ascending order, without duplicates.
    pub fn tss_positions(&self) -> impl Iterator<Item = u64> + '_ {
        self.tss.iter().copied()
    }

    pub fn tss_count(&self) -> usize {
        self.tss.len()
    }
}
