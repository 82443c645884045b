use super::cancel::CancellationToken;
use super::config::{DesignConfig, DigestConfig};
use super::progress::ProgressReporter;
use crate::core::io::alignability::{AlignabilityMap, ChromosomeAlignability};
use crate::core::io::fasta::IndexedFasta;

/// Configurations that know how to digest a genome.
pub trait ProvidesDigestSettings {
    fn digest_settings(&self) -> &DigestConfig;
}

impl ProvidesDigestSettings for DigestConfig {
    fn digest_settings(&self) -> &DigestConfig {
        self
    }
}

impl ProvidesDigestSettings for DesignConfig {
    fn digest_settings(&self) -> &DigestConfig {
        &self.digest
    }
}

/// Read-only inputs shared by every per-chromosome job of a run.
#[derive(Clone, Copy)]
pub struct PipelineContext<'a, C>
where
    C: ProvidesDigestSettings + Sync,
{
    pub genome: &'a IndexedFasta,
    pub alignability: Option<&'a AlignabilityMap>,
    pub reporter: &'a ProgressReporter<'a>,
    pub cancel: &'a CancellationToken,
    pub config: &'a C,
}

impl<'a, C> PipelineContext<'a, C>
where
    C: ProvidesDigestSettings + Sync,
{
    pub fn new(
        genome: &'a IndexedFasta,
        alignability: Option<&'a AlignabilityMap>,
        reporter: &'a ProgressReporter<'a>,
        cancel: &'a CancellationToken,
        config: &'a C,
    ) -> Self {
        Self {
            genome,
            alignability,
            reporter,
            cancel,
            config,
        }
    }

    pub fn alignability_for(&self, chromosome: &str) -> Option<&'a ChromosomeAlignability> {
        self.alignability.and_then(|map| map.chromosome(chromosome))
    }

    /// Number of chromosome jobs whose results are held in memory at once.
    pub fn batch_size(&self) -> usize {
        #[cfg(feature = "parallel")]
        let size = rayon::current_num_threads();

        #[cfg(not(feature = "parallel"))]
        let size = 1;

        size.max(1)
    }
}
