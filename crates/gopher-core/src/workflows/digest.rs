use crate::core::io::alignability::AlignabilityMap;
use crate::core::io::digest_table::{DigestTableWriter, Unselected};
use crate::core::io::fasta::IndexedFasta;
use crate::engine::cancel::CancellationToken;
use crate::engine::config::DigestConfig;
use crate::engine::context::PipelineContext;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks::digestion::{self, ChromosomeDigest};
use std::path::Path;
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Files read and written by a digestion run.
#[derive(Debug, Clone, Copy)]
pub struct DigestInputs<'a> {
    /// An indexed FASTA file; the `.fai` index must exist.
    pub genome: &'a Path,
    pub alignability: Option<&'a Path>,
    pub output: &'a Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DigestSummary {
    pub chromosomes: usize,
    pub genome_length: u64,
    pub cuts: u64,
    pub fragments: u64,
}

#[instrument(skip_all, name = "digest_workflow")]
pub fn run(
    inputs: &DigestInputs,
    config: &DigestConfig,
    reporter: &ProgressReporter,
    cancel: &CancellationToken,
) -> Result<DigestSummary, EngineError> {
    // === Phase 0: Load inputs ===
    reporter.report(Progress::PhaseStart {
        name: "Loading Inputs",
    });
    let genome = IndexedFasta::open(inputs.genome)?;
    let alignability = inputs.alignability.map(AlignabilityMap::load).transpose()?;
    info!(
        chromosomes = genome.len(),
        genome_length = genome.total_length(),
        enzymes = config.enzymes.len(),
        "Inputs loaded."
    );
    reporter.report(Progress::PhaseFinish);

    let context = PipelineContext::new(&genome, alignability.as_ref(), reporter, cancel, config);

    // === Phase 1: Digest every chromosome ===
    reporter.report(Progress::PhaseStart { name: "Digestion" });
    let names: Vec<&str> = genome.names().collect();
    reporter.report(Progress::TaskStart {
        total: names.len() as u64,
    });

    let mut writer = DigestTableWriter::create(inputs.output)?;
    let mut summary = DigestSummary {
        chromosomes: names.len(),
        genome_length: genome.total_length(),
        ..Default::default()
    };

    for batch in names.chunks(context.batch_size()) {
        cancel.check()?;

        #[cfg(not(feature = "parallel"))]
        let iterator = batch.iter();

        #[cfg(feature = "parallel")]
        let iterator = batch.par_iter();

        let results: Vec<Result<ChromosomeDigest, EngineError>> = iterator
            .map(|name| digestion::run(&context, name))
            .collect();

        for result in results {
            let digest = result?;
            writer.write_chromosome(&digest.fragments, &Unselected)?;
            summary.cuts += digest.cuts as u64;
            summary.fragments += digest.fragments.len() as u64;
            reporter.report(Progress::TaskIncrement);
        }
    }
    reporter.report(Progress::TaskFinish);

    cancel.check()?;
    writer.finish()?;
    reporter.report(Progress::PhaseFinish);

    info!(
        chromosomes = summary.chromosomes,
        cuts = summary.cuts,
        fragments = summary.fragments,
        "Digestion complete."
    );
    Ok(summary)
}
