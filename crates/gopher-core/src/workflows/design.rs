use crate::core::io::alignability::AlignabilityMap;
use crate::core::io::bed::{BedRecord, BedTrack};
use crate::core::io::digest_table::DigestTableWriter;
use crate::core::io::fasta::IndexedFasta;
use crate::core::io::refgene::{self, TranscriptFilter};
use crate::core::io::summary::{ViewpointSummary, write_viewpoint_summary};
use crate::core::models::fragment::{Interval, Margins};
use crate::core::models::gene::GopherGene;
use crate::core::models::ids::SegmentId;
use crate::core::models::viewpoint::ViewPoint;
use crate::engine::aggregate::{DesignAggregator, DesignStatistics};
use crate::engine::cancel::CancellationToken;
use crate::engine::config::DesignConfig;
use crate::engine::context::PipelineContext;
use crate::engine::error::EngineError;
use crate::engine::index::SegmentIndex;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks::chromosome_design::{self, ChromosomeDesign};
use crate::engine::viewpoint::ViewpointBuilder;
use itertools::Itertools;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Files read by a design run.
#[derive(Debug, Clone, Copy)]
pub struct DesignInputs<'a> {
    /// An indexed FASTA file; the `.fai` index must exist.
    pub genome: &'a Path,
    /// UCSC refGene-style transcript table.
    pub transcripts: &'a Path,
    /// Optional list of gene symbols, one per line; without it every gene is a target.
    pub targets: Option<&'a Path>,
    pub alignability: Option<&'a Path>,
    pub protein_coding_only: bool,
}

/// Where the exports of a design run are written: `<directory>/<prefix>_<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub directory: PathBuf,
    pub prefix: String,
}

impl OutputLayout {
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
        }
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{}_{}", self.prefix, name))
    }

    pub fn digest_table(&self) -> PathBuf {
        self.file("digests.tsv")
    }

    pub fn viewpoint_summary(&self) -> PathBuf {
        self.file("viewpoints.tsv")
    }

    pub fn statistics(&self) -> PathBuf {
        self.file("statistics.toml")
    }

    pub fn track(&self, name: &str) -> PathBuf {
        self.file(&format!("{}.bed", name))
    }
}

#[derive(Debug, Clone)]
pub struct DesignResult {
    /// One viewpoint per TSS, resolved or not, in genome order.
    pub viewpoints: Vec<ViewPoint>,
    pub index: SegmentIndex,
    pub statistics: DesignStatistics,
    /// Requested gene symbols without a usable transcript.
    pub unknown_targets: Vec<String>,
    pub outputs: Vec<PathBuf>,
}

#[instrument(skip_all, name = "design_workflow")]
pub fn run(
    inputs: &DesignInputs,
    config: &DesignConfig,
    layout: &OutputLayout,
    reporter: &ProgressReporter,
    cancel: &CancellationToken,
) -> Result<DesignResult, EngineError> {
    // === Phase 0: Load inputs ===
    reporter.report(Progress::PhaseStart {
        name: "Loading Inputs",
    });
    let genome = IndexedFasta::open(inputs.genome)?;
    let alignability = inputs.alignability.map(AlignabilityMap::load).transpose()?;
    let transcripts = refgene::read_transcripts(inputs.transcripts)?;
    let filter = TranscriptFilter {
        targets: inputs.targets.map(refgene::read_target_list).transpose()?,
        protein_coding_only: inputs.protein_coding_only,
    };
    let targets = refgene::collect_genes(&transcripts, &filter);
    for symbol in &targets.unknown_targets {
        warn!(gene = %symbol, "Target gene not found in the transcript table.");
    }
    if targets.genes.is_empty() {
        return Err(EngineError::Input(
            "no target gene has a transcript on the primary assembly".to_string(),
        ));
    }
    if !targets.unknown_targets.is_empty() {
        reporter.report(Progress::Message(format!(
            "{} target gene(s) not found in the transcript table",
            targets.unknown_targets.len()
        )));
    }
    info!(
        genes = targets.genes.len(),
        unknown_targets = targets.unknown_targets.len(),
        chromosomes = genome.len(),
        "Inputs loaded."
    );
    reporter.report(Progress::PhaseFinish);

    let context = PipelineContext::new(&genome, alignability.as_ref(), reporter, cancel, config);

    // === Phase 1: Per-chromosome design and merge ===
    let (viewpoints, index) = design_chromosomes(&context, &targets.genes, layout)?;

    // === Phase 2: Statistics and exports ===
    reporter.report(Progress::PhaseStart {
        name: "Writing Exports",
    });
    let statistics = DesignAggregator::new(config.baits.probe_length).summarize(&viewpoints, &index);
    let outputs = write_exports(&viewpoints, &index, &statistics, config, layout)?;
    reporter.report(Progress::PhaseFinish);

    info!(
        viewpoints = statistics.viewpoints,
        resolved_viewpoints = statistics.resolved_viewpoints,
        unique_fragments = statistics.unique_fragments,
        probes = statistics.placed_probes,
        "Design complete."
    );
    Ok(DesignResult {
        viewpoints,
        index,
        statistics,
        unknown_targets: targets.unknown_targets,
        outputs,
    })
}

/// Runs one job per chromosome and merges the results in genome order: segments enter the
/// index, viewpoints receive their segment ids and the chromosome's rows are appended to
/// the annotated digest table.
fn design_chromosomes(
    context: &PipelineContext<DesignConfig>,
    genes: &[GopherGene],
    layout: &OutputLayout,
) -> Result<(Vec<ViewPoint>, SegmentIndex), EngineError> {
    let reporter = context.reporter;
    reporter.report(Progress::PhaseStart {
        name: "Designing Viewpoints",
    });

    let mut by_chromosome: BTreeMap<&str, Vec<&GopherGene>> = BTreeMap::new();
    for gene in genes {
        by_chromosome
            .entry(gene.chromosome.as_str())
            .or_default()
            .push(gene);
    }
    let names: Vec<&str> = context.genome.names().collect();
    reporter.report(Progress::TaskStart {
        total: names.len() as u64,
    });

    let mut index = SegmentIndex::new();
    let mut viewpoints = Vec::new();
    let mut digest_table = DigestTableWriter::create(&layout.digest_table())?;

    for batch in names.chunks(context.batch_size()) {
        context.cancel.check()?;

        #[cfg(not(feature = "parallel"))]
        let iterator = batch.iter();

        #[cfg(feature = "parallel")]
        let iterator = batch.par_iter();

        let results: Vec<Result<ChromosomeDesign, EngineError>> = iterator
            .map(|&name| {
                let genes = by_chromosome.get(name).map_or(&[][..], Vec::as_slice);
                chromosome_design::run(context, name, genes)
            })
            .collect();

        for result in results {
            let design = result?;
            let ids: BTreeMap<usize, SegmentId> = design
                .segments
                .into_iter()
                .map(|(fragment, segment)| (fragment, index.insert(segment)))
                .collect();
            viewpoints.extend(design.drafts.into_iter().map(|draft| {
                let mut viewpoint = draft.viewpoint;
                viewpoint.segments = draft
                    .active_fragments
                    .iter()
                    .filter_map(|fragment| ids.get(fragment).copied())
                    .collect();
                viewpoint
            }));
            digest_table.write_chromosome(&design.fragments, &index)?;
            reporter.report(Progress::TaskIncrement);
        }
    }
    reporter.report(Progress::TaskFinish);

    let known: HashSet<&str> = names.iter().copied().collect();
    let builder = ViewpointBuilder::new(context.config.filters, context.config.viewpoints);
    for (chromosome, genes) in &by_chromosome {
        if known.contains(chromosome) {
            continue;
        }
        warn!(
            chromosome = %chromosome,
            genes = genes.len(),
            "Chromosome of target genes is missing from the genome."
        );
        reporter.report(Progress::Message(format!(
            "{} is not in the genome, {} gene(s) kept without fragments",
            chromosome,
            genes.len()
        )));
        for gene in genes {
            viewpoints.extend(
                gene.tss_positions()
                    .map(|tss| builder.build(gene, tss, &[]).viewpoint),
            );
        }
    }

    context.cancel.check()?;
    let rows = digest_table.finish()?;
    info!(
        viewpoints = viewpoints.len(),
        segments = index.len(),
        digest_rows = rows,
        "Viewpoints designed."
    );
    reporter.report(Progress::PhaseFinish);
    Ok((viewpoints, index))
}

fn write_exports(
    viewpoints: &[ViewPoint],
    index: &SegmentIndex,
    statistics: &DesignStatistics,
    config: &DesignConfig,
    layout: &OutputLayout,
) -> Result<Vec<PathBuf>, EngineError> {
    let mut outputs = vec![layout.digest_table()];

    for track in build_tracks(viewpoints, index) {
        let path = layout.track(&track.name);
        track.write(&path)?;
        outputs.push(path);
    }

    let summaries: Vec<ViewpointSummary> = viewpoints
        .iter()
        .map(|viewpoint| summarize_viewpoint(viewpoint, index))
        .collect();
    let summary_path = layout.viewpoint_summary();
    write_viewpoint_summary(&summary_path, &config.genome_build, &summaries)?;
    outputs.push(summary_path);

    let statistics_path = layout.statistics();
    statistics.write_toml(&statistics_path)?;
    outputs.push(statistics_path);

    Ok(outputs)
}

fn summarize_viewpoint(viewpoint: &ViewPoint, index: &SegmentIndex) -> ViewpointSummary {
    let segments = viewpoint.segments.iter().filter_map(|&id| index.get(id));
    let (active_length, probes) = segments.fold((0, 0), |(length, probes), segment| {
        let distinct = segment.all_baits().map(|bait| bait.interval).unique().count();
        (length + segment.interval().len(), probes + distinct)
    });
    ViewpointSummary {
        gene: viewpoint.target_name.clone(),
        accession: viewpoint.accession.clone(),
        chromosome: viewpoint.chromosome.clone(),
        tss: viewpoint.tss,
        window: viewpoint.window,
        approach: viewpoint.tag(),
        selected_fragments: viewpoint.active_segment_count(),
        score: viewpoint.score,
        active_length,
        probes,
        tss_fragment_selected: viewpoint.tss_fragment_selected,
    }
}

/// Viewpoint windows, selected fragments, their margins, TSS targets and probes.
fn build_tracks(viewpoints: &[ViewPoint], index: &SegmentIndex) -> Vec<BedTrack> {
    let mut windows = BedTrack::new("viewpoints", "Viewpoint windows").with_color("0,100,0");
    let mut targets = BedTrack::new("targets", "Target transcription start sites")
        .with_color("200,0,0");
    for viewpoint in viewpoints {
        let name = format!("{}_{}", viewpoint.target_name, viewpoint.tss);
        if viewpoint.is_resolved() {
            windows.push(
                BedRecord::new(&viewpoint.chromosome, viewpoint.window, name.clone())
                    .with_score((viewpoint.score * 1000.0).round() as u32)
                    .with_strand(viewpoint.strand),
            );
        }
        targets.push(
            BedRecord::new(
                &viewpoint.chromosome,
                Interval::new(viewpoint.tss, viewpoint.tss),
                name,
            )
            .with_strand(viewpoint.strand),
        );
    }

    let mut fragments =
        BedTrack::new("fragments", "Selected restriction fragments").with_color("0,0,200");
    let mut margins = BedTrack::new("margins", "Margins of selected fragments")
        .with_color("100,100,255");
    let mut probes = BedTrack::new("probes", "Capture probes").with_color("0,0,0");
    for (_, segment) in index.iter() {
        let chromosome = segment.chromosome();
        let interval = segment.interval();
        fragments.push(BedRecord::new(
            chromosome,
            interval,
            format!("{}:{}-{}", chromosome, interval.start, interval.end),
        ));
        match segment.fragment.margins {
            Margins::Split {
                upstream,
                downstream,
            } => {
                margins.push(BedRecord::new(chromosome, upstream, "5'"));
                margins.push(BedRecord::new(chromosome, downstream, "3'"));
            }
            Margins::Single(margin) => {
                margins.push(BedRecord::new(chromosome, margin, "5'/3'"));
            }
        }
        for bait in segment.all_baits().map(|bait| bait.interval).unique() {
            probes.push(BedRecord::new(
                chromosome,
                bait,
                format!("{}:{}-{}", chromosome, bait.start, bait.end),
            ));
        }
    }

    vec![windows, fragments, margins, targets, probes]
}
