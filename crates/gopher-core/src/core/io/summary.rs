use super::output::{OutputError, fraction, write_atomic};
use crate::core::models::fragment::Interval;
use std::io::Write;
use std::path::Path;

const SUMMARY_HEADER: [&str; 12] = [
    "Gene",
    "Accession",
    "Position",
    "UCSC_URL",
    "Approach",
    "Selected_Fragments",
    "Score",
    "Viewpoint_Length",
    "Active_Length",
    "Probes",
    "TSS_Fragment_Selected",
    "Resolved",
];

/// One row of the per-viewpoint summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewpointSummary {
    pub gene: String,
    pub accession: String,
    pub chromosome: String,
    pub tss: u64,
    pub window: Interval,
    pub approach: &'static str,
    pub selected_fragments: usize,
    pub score: f64,
    /// Summed length of the active segments.
    pub active_length: u64,
    pub probes: usize,
    pub tss_fragment_selected: bool,
}

/// Link to the UCSC genome browser showing `interval`.
pub fn ucsc_url(genome_build: &str, chromosome: &str, interval: Interval) -> String {
    format!(
        "https://genome.ucsc.edu/cgi-bin/hgTracks?db={}&position={}%3A{}-{}",
        genome_build, chromosome, interval.start, interval.end
    )
}

pub fn write_viewpoint_summary(
    path: &Path,
    genome_build: &str,
    rows: &[ViewpointSummary],
) -> Result<(), OutputError> {
    write_atomic(path, |w| {
        writeln!(w, "{}", SUMMARY_HEADER.join("\t"))?;
        for row in rows {
            writeln!(
                w,
                "{}\t{}\t{}:{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                row.gene,
                row.accession,
                row.chromosome,
                row.tss,
                ucsc_url(genome_build, &row.chromosome, row.window),
                row.approach,
                row.selected_fragments,
                fraction(row.score),
                row.window.len(),
                row.active_length,
                row.probes,
                if row.tss_fragment_selected { "T" } else { "F" },
                if row.selected_fragments > 0 { "T" } else { "F" },
            )?;
        }
        Ok(())
    })
}
