use clap::{Args, Parser, Subcommand};
use gopherpp::core::models::viewpoint::Approach;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "The GOPHER++ developers",
    version,
    about = "GOPHER++ CLI - Design Capture Hi-C enrichment panels: digest a reference genome, select viewpoint fragments around transcription start sites and place capture probes.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for per-chromosome jobs.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the samtools-compatible `.fai` index of a FASTA file.
    Index(IndexArgs),
    /// List the restriction enzymes that can be selected by name.
    Enzymes(EnzymesArgs),
    /// Digest a genome and write the genome-wide digest table.
    Digest(DigestArgs),
    /// Design a complete Capture Hi-C panel for a set of target genes.
    Design(DesignArgs),
}

/// Arguments for the `index` subcommand.
#[derive(Args, Debug)]
pub struct IndexArgs {
    /// FASTA file to index; the index is written next to it with a `.fai` suffix.
    #[arg(required = true, value_name = "PATH")]
    pub fasta: PathBuf,
}

/// Arguments for the `enzymes` subcommand.
#[derive(Args, Debug)]
pub struct EnzymesArgs {
    /// List the enzymes of a tab-separated `name<TAB>site` table instead of the built-in ones.
    #[arg(long, value_name = "PATH")]
    pub enzyme_table: Option<PathBuf>,
}

/// Enzyme selection shared by `digest` and `design`.
#[derive(Args, Debug, Clone, Default)]
pub struct EnzymeArgs {
    /// Restriction enzymes by name, comma separated or repeated (e.g. 'DpnII,HindIII').
    #[arg(short, long = "enzyme", value_name = "NAME", value_delimiter = ',')]
    pub enzymes: Vec<String>,

    /// Resolve enzyme names against this table instead of the built-in catalogue.
    #[arg(long, value_name = "PATH")]
    pub enzyme_table: Option<PathBuf>,
}

/// Arguments for the `digest` subcommand.
#[derive(Args, Debug)]
pub struct DigestArgs {
    /// Indexed reference genome in FASTA format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub genome: PathBuf,

    /// Path of the digest table to write.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub enzymes: EnzymeArgs,

    /// Margin size in nucleotides used for the GC and repeat columns.
    #[arg(short, long, value_name = "INT")]
    pub margin_size: Option<u64>,

    /// Mean k-mer alignability track in bedGraph format.
    #[arg(long, value_name = "PATH")]
    pub alignability: Option<PathBuf>,
}

/// Arguments for the `design` subcommand.
#[derive(Args, Debug)]
pub struct DesignArgs {
    // --- Inputs ---
    /// Indexed reference genome in FASTA format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub genome: PathBuf,

    /// UCSC refGene-style transcript table.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub transcripts: PathBuf,

    /// File with one target gene symbol per line. Without it every gene is a target.
    #[arg(long, value_name = "PATH")]
    pub targets: Option<PathBuf>,

    /// Mean k-mer alignability track in bedGraph format.
    #[arg(long, value_name = "PATH")]
    pub alignability: Option<PathBuf>,

    /// Only use protein-coding (NM_) transcripts.
    #[arg(long)]
    pub protein_coding_only: bool,

    // --- Outputs ---
    /// Directory the exports are written to.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Prefix of every export file name.
    #[arg(short, long, default_value = "gopher", value_name = "NAME")]
    pub prefix: String,

    /// Path to a design configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub enzymes: EnzymeArgs,

    // --- Parameter Overrides ---
    /// Override the margin size in nucleotides.
    #[arg(short, long, value_name = "INT")]
    pub margin_size: Option<u64>,

    /// Override the minimum fragment size in nucleotides.
    #[arg(long, value_name = "INT")]
    pub min_fragment_size: Option<u64>,

    /// Override the viewpoint approach ('simple' or 'extended').
    #[arg(short, long, value_name = "APPROACH")]
    pub approach: Option<Approach>,

    /// Override the upstream size of extended viewpoints.
    #[arg(long, value_name = "INT")]
    pub upstream_size: Option<u64>,

    /// Override the downstream size of extended viewpoints.
    #[arg(long, value_name = "INT")]
    pub downstream_size: Option<u64>,

    /// Override the number of neighbouring fragments of simple viewpoints.
    #[arg(long, value_name = "INT")]
    pub tiling_factor: Option<usize>,

    /// Override the probe length in nucleotides.
    #[arg(long, value_name = "INT")]
    pub probe_length: Option<u64>,

    /// Override the maximum number of probes per margin.
    #[arg(long, value_name = "INT")]
    pub max_bait_count: Option<usize>,

    /// Override `filters.allow-single-margin` from the config file.
    #[command(flatten)]
    pub single_margin: SingleMargin,

    /// Override the genome build used in browser links (e.g. 'hg19').
    #[arg(long, value_name = "NAME")]
    pub genome_build: Option<String>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S baits.probe-length=100
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// A group to handle mutually exclusive boolean flags for single-margin fragments.
#[derive(Args, Debug, Clone, Copy, Default)]
#[group(required = false, multiple = false)]
pub struct SingleMargin {
    /// Accept fragments with only one usable margin.
    #[arg(long)]
    pub allow_single_margin: bool,
    /// Require both margins of a fragment to be usable.
    #[arg(long)]
    pub require_both_margins: bool,
}
