use super::output::{AtomicFile, OutputError, fraction};
use crate::core::models::fragment::Fragment;
use std::io::Write;
use std::path::Path;

pub const DIGEST_TABLE_HEADER: [&str; 14] = [
    "Chromosome",
    "Fragment_Start_Position",
    "Fragment_End_Position",
    "Fragment_Number",
    "5'_Restriction_Site",
    "3'_Restriction_Site",
    "Length",
    "5'_GC_Content",
    "3'_GC_Content",
    "5'_Repeat_Content",
    "3'_Repeat_Content",
    "Selected",
    "5'_Probes",
    "3'_Probes",
];

/// Supplies the selection state of fragments for the `Selected` and probe columns.
pub trait FragmentAnnotator {
    /// Returns the 5' and 3' probe counts of the fragment starting at `start`, or `None` if
    /// the fragment was not selected.
    fn probe_counts(&self, chromosome: &str, start: u64) -> Option<(usize, usize)>;
}

/// Annotator for digests produced without a design: nothing is selected.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unselected;

impl FragmentAnnotator for Unselected {
    fn probe_counts(&self, _chromosome: &str, _start: u64) -> Option<(usize, usize)> {
        None
    }
}

/// Streams the digest table chromosome by chromosome into an atomically committed file.
pub struct DigestTableWriter {
    file: AtomicFile,
    rows: u64,
}

impl DigestTableWriter {
    pub fn create(path: &Path) -> Result<Self, OutputError> {
        let mut file = AtomicFile::create(path)?;
        writeln!(file, "{}", DIGEST_TABLE_HEADER.join("\t")).map_err(|e| io_error(path, e))?;
        Ok(Self { file, rows: 0 })
    }

    /// Appends the fragments of one chromosome, numbered from 1 in order.
    pub fn write_chromosome(
        &mut self,
        fragments: &[Fragment],
        annotator: &impl FragmentAnnotator,
    ) -> Result<(), OutputError> {
        for (index, fragment) in fragments.iter().enumerate() {
            let annotation = annotator.probe_counts(&fragment.chromosome, fragment.start());
            let (selected, five_prime_probes, three_prime_probes) = match annotation {
                Some((five, three)) => ("T", five, three),
                None => ("F", 0, 0),
            };
            writeln!(
                self.file,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                fragment.chromosome,
                fragment.start(),
                fragment.end(),
                index + 1,
                fragment.five_prime_site,
                fragment.three_prime_site,
                fragment.len(),
                fraction(fragment.five_prime.gc),
                fraction(fragment.three_prime.gc),
                fraction(fragment.five_prime.repeat),
                fraction(fragment.three_prime.repeat),
                selected,
                five_prime_probes,
                three_prime_probes,
            )
            .map_err(|e| io_error(self.file.path(), e))?;
            self.rows += 1;
        }
        Ok(())
    }

    /// Moves the finished table to its destination and returns the number of rows written.
    pub fn finish(self) -> Result<u64, OutputError> {
        let rows = self.rows;
        self.file.commit()?;
        Ok(rows)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> OutputError {
    OutputError::Io {
        path: path.to_string_lossy().to_string(),
        source,
    }
}
