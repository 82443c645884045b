use crate::core::digest::fragments::FragmentBuilder;
use crate::core::digest::scanner::RestrictionSiteScanner;
use crate::core::models::fragment::Fragment;
use crate::engine::context::{PipelineContext, ProvidesDigestSettings};
use crate::engine::error::EngineError;
use crate::engine::progress::Progress;
use tracing::{debug, instrument};

/// A digested chromosome together with its sequence.
#[derive(Debug, Clone)]
pub struct ChromosomeDigest {
    pub chromosome: String,
    pub sequence: Vec<u8>,
    pub fragments: Vec<Fragment>,
    /// Cut positions found, including positions cut by more than one enzyme.
    pub cuts: usize,
}

#[instrument(skip_all, name = "digestion_task", fields(chromosome = %chromosome))]
pub fn run<C>(context: &PipelineContext<C>, chromosome: &str) -> Result<ChromosomeDigest, EngineError>
where
    C: ProvidesDigestSettings + Sync,
{
    context.cancel.check()?;
    context.reporter.report(Progress::StatusUpdate {
        text: chromosome.to_string(),
    });
    let settings = context.config.digest_settings();

    let sequence = context.genome.fetch(chromosome)?;
    let scanner = RestrictionSiteScanner::new(settings.enzymes.clone());
    let digests = scanner.scan(&sequence);
    let fragments = FragmentBuilder::new(&settings.enzymes, settings.margin_size).build(
        chromosome,
        &sequence,
        &digests,
        context.alignability_for(chromosome),
    );

    debug!(
        length = sequence.len(),
        cuts = digests.len(),
        fragments = fragments.len(),
        "Chromosome digested."
    );
    Ok(ChromosomeDigest {
        chromosome: chromosome.to_string(),
        sequence,
        fragments,
        cuts: digests.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::fasta::IndexedFasta;
    use crate::engine::cancel::CancellationToken;
    use crate::engine::config::DigestConfigBuilder;
    use crate::core::models::enzyme::RestrictionEnzyme;
    use crate::engine::progress::ProgressReporter;
    use std::fs;
    use tempfile::TempDir;

    fn genome(dir: &TempDir) -> IndexedFasta {
        let path = dir.path().join("genome.fa");
        fs::write(&path, ">chr1\nCCAAGCTTGG\nAAGCTTCC\n>chr2\nGGGG\n").unwrap();
        IndexedFasta::open_or_index(&path).unwrap()
    }

    #[test]
    fn digests_one_chromosome_into_a_partition() {
        let dir = TempDir::new().unwrap();
        let genome = genome(&dir);
        let config = DigestConfigBuilder::new()
            .enzymes(vec![RestrictionEnzyme::builtin("HindIII").unwrap()])
            .margin_size(2)
            .build()
            .unwrap();
        let reporter = ProgressReporter::new();
        let cancel = CancellationToken::new();
        let context = PipelineContext::new(&genome, None, &reporter, &cancel, &config);

        let digest = run(&context, "chr1").unwrap();
        assert_eq!(digest.sequence.len(), 18);
        assert_eq!(digest.cuts, 2);
        let bounds: Vec<(u64, u64)> = digest
            .fragments
            .iter()
            .map(|f| (f.start(), f.end()))
            .collect();
        assert_eq!(bounds, vec![(1, 3), (4, 11), (12, 18)]);
    }

    #[test]
    fn cancelled_job_does_not_read_the_genome() {
        let dir = TempDir::new().unwrap();
        let genome = genome(&dir);
        let config = DigestConfigBuilder::new()
            .enzymes(vec![RestrictionEnzyme::builtin("HindIII").unwrap()])
            .build()
            .unwrap();
        let reporter = ProgressReporter::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let context = PipelineContext::new(&genome, None, &reporter, &cancel, &config);
        assert!(matches!(run(&context, "chr1"), Err(EngineError::Cancelled)));
    }
}
