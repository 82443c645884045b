use super::digestion::{self, ChromosomeDigest};
use crate::core::models::fragment::Fragment;
use crate::core::models::gene::GopherGene;
use crate::core::models::segment::Segment;
use crate::engine::baits::BaitPlacer;
use crate::engine::config::DesignConfig;
use crate::engine::context::PipelineContext;
use crate::engine::error::EngineError;
use crate::engine::viewpoint::{ViewpointBuilder, ViewpointDraft};
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// The design of one chromosome before its segments join the genome-wide index.
#[derive(Debug, Clone)]
pub struct ChromosomeDesign {
    pub chromosome: String,
    /// Every fragment of the chromosome, for the digest table.
    pub fragments: Vec<Fragment>,
    pub drafts: Vec<ViewpointDraft>,
    /// Baited active segments keyed by their index in `fragments`, ascending.
    pub segments: Vec<(usize, Segment)>,
}

/// Digests `chromosome`, builds the viewpoints of every TSS of `genes` on it and places
/// baits in each active segment once, however many viewpoints share it.
#[instrument(skip_all, name = "chromosome_design_task", fields(chromosome = %chromosome))]
pub fn run(
    context: &PipelineContext<DesignConfig>,
    chromosome: &str,
    genes: &[&GopherGene],
) -> Result<ChromosomeDesign, EngineError> {
    let ChromosomeDigest {
        sequence,
        fragments,
        ..
    } = digestion::run(context, chromosome)?;
    let config = context.config;

    let builder = ViewpointBuilder::new(config.filters, config.viewpoints);
    let mut drafts = Vec::new();
    for gene in genes {
        for tss in gene.tss_positions() {
            context.cancel.check()?;
            drafts.push(builder.build(gene, tss, &fragments));
        }
    }

    let active: BTreeSet<usize> = drafts
        .iter()
        .flat_map(|draft| draft.active_fragments.iter().copied())
        .collect();

    let placer = BaitPlacer::new(config.baits, config.filters);
    let alignability = context.alignability_for(chromosome);
    let segments: Vec<(usize, Segment)> = active
        .into_iter()
        .map(|index| {
            let mut segment = Segment::new(fragments[index].clone());
            placer.place(&mut segment, &sequence, alignability);
            (index, segment)
        })
        .collect();

    debug!(
        viewpoints = drafts.len(),
        active_segments = segments.len(),
        "Chromosome design finished."
    );
    Ok(ChromosomeDesign {
        chromosome: chromosome.to_string(),
        fragments,
        drafts,
        segments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::fasta::IndexedFasta;
    use crate::core::models::enzyme::RestrictionEnzyme;
    use crate::core::models::gene::Strand;
    use crate::core::models::viewpoint::Approach;
    use crate::engine::cancel::CancellationToken;
    use crate::engine::config::DesignConfigBuilder;
    use crate::engine::progress::ProgressReporter;
    use std::fs;
    use tempfile::TempDir;

    /// Three 200 bp fragments separated by HindIII sites, 40 % GC.
    fn chromosome() -> String {
        let block: String = "ACGTA".repeat(40);
        let mut sequence = String::new();
        sequence.push_str(&block[..197]);
        sequence.push_str("AAGCTT");
        sequence.push_str(&block[..194]);
        sequence.push_str("AAGCTT");
        sequence.push_str(&block[..197]);
        sequence
    }

    fn config() -> DesignConfig {
        DesignConfigBuilder::with_defaults()
            .enzymes(vec![RestrictionEnzyme::builtin("HindIII").unwrap()])
            .margin_size(60)
            .min_fragment_size(50)
            .probe_length(20)
            .approach(Approach::Simple)
            .tiling_factor(1)
            .build()
            .unwrap()
    }

    #[test]
    fn shared_fragments_become_one_segment() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("genome.fa");
        fs::write(&path, format!(">chr1\n{}\n", chromosome())).unwrap();
        let genome = IndexedFasta::open_or_index(&path).unwrap();
        let config = config();
        let reporter = ProgressReporter::new();
        let cancel = CancellationToken::new();
        let context = PipelineContext::new(&genome, None, &reporter, &cancel, &config);

        let mut gene = GopherGene::new("A", "NM_1", "chr1", Strand::Plus);
        gene.add_tss(300);
        gene.add_tss(320);

        let design = run(&context, "chr1", &[&gene]).unwrap();
        assert_eq!(design.fragments.len(), 3);
        assert_eq!(design.drafts.len(), 2);
        let indices: Vec<usize> = design.segments.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(design.segments.iter().all(|(_, s)| s.is_balanced()));
        assert!(design.drafts.iter().all(|d| d.viewpoint.patched));
    }
}
