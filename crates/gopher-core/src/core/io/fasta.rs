use super::output::{OutputError, write_atomic};
use bio::io::fasta;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FastaError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("FASTA file '{path}' is not indexed; run `gopher index` first")]
    MissingIndex { path: String },
    #[error("Malformed index '{path}': {source}")]
    MalformedIndex { path: String, source: csv::Error },
    #[error("Duplicate sequence name '{name}' in '{path}'")]
    DuplicateName { path: String, name: String },
    #[error("Inconsistent line length in sequence '{name}' of '{path}' at line {line}")]
    InconsistentLineLength {
        path: String,
        name: String,
        line: usize,
    },
    #[error("Sequence data before the first header in '{path}' at line {line}")]
    MissingHeader { path: String, line: usize },
    #[error("Empty sequence name in '{path}' at line {line}")]
    EmptyName { path: String, line: usize },
    #[error("Sequence '{0}' is not present in the index")]
    UnknownSequence(String),
    #[error("Range {start}-{end} lies outside sequence '{name}' of length {length}")]
    OutOfRange {
        name: String,
        start: u64,
        end: u64,
        length: u64,
    },
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// One line of a samtools `.fai` index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaiRecord {
    pub name: String,
    pub length: u64,
    /// Byte offset of the first base.
    pub offset: u64,
    pub line_bases: u64,
    /// Bytes per line, line terminator included.
    pub line_width: u64,
}

/// The `.fai` records of a FASTA file in file order.
///
/// `bio` reads indexes but does not build them, so this is the indexer behind
/// `gopher index`; everything downstream reads the saved file through [`IndexedFasta`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FastaIndex {
    records: Vec<FaiRecord>,
}

impl FastaIndex {
    /// Scans a FASTA file and computes its index.
    ///
    /// Every sequence line except the last of each record must have the same length;
    /// sequence names must be unique. Blank lines between a header and its first sequence
    /// line are skipped.
    pub fn build(path: &Path) -> Result<Self, FastaError> {
        let path_str = path.to_string_lossy().to_string();
        let file = File::open(path).map_err(|e| FastaError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        Self::build_from(BufReader::new(file), &path_str)
    }

    pub fn build_from(mut reader: impl BufRead, source_name: &str) -> Result<Self, FastaError> {
        let mut records: Vec<FaiRecord> = Vec::new();
        let mut names: HashSet<String> = HashSet::new();
        let mut short_line_seen = false;
        let mut offset = 0u64;
        let mut line_number = 0usize;
        let mut buffer = Vec::new();

        loop {
            buffer.clear();
            let width = reader
                .read_until(b'\n', &mut buffer)
                .map_err(|e| FastaError::Io {
                    path: source_name.to_string(),
                    source: e,
                })? as u64;
            if width == 0 {
                break;
            }
            line_number += 1;
            let line_start = offset;
            offset += width;
            let content = trim_line_end(&buffer);

            if let Some(header) = content.strip_prefix(b">") {
                let header = String::from_utf8_lossy(header);
                let name = header.split_whitespace().next().unwrap_or("").to_string();
                if name.is_empty() {
                    return Err(FastaError::EmptyName {
                        path: source_name.to_string(),
                        line: line_number,
                    });
                }
                if !names.insert(name.clone()) {
                    return Err(FastaError::DuplicateName {
                        path: source_name.to_string(),
                        name,
                    });
                }
                records.push(FaiRecord {
                    name,
                    length: 0,
                    offset,
                    line_bases: 0,
                    line_width: 0,
                });
                short_line_seen = false;
                continue;
            }

            let bases = content.len() as u64;
            let Some(record) = records.last_mut() else {
                if bases == 0 {
                    continue;
                }
                return Err(FastaError::MissingHeader {
                    path: source_name.to_string(),
                    line: line_number,
                });
            };

            match (record.line_bases, bases) {
                (0, 0) => continue,
                (0, _) => {
                    // The first sequence line fixes the record's geometry.
                    record.offset = line_start;
                    record.line_bases = bases;
                    record.line_width = width;
                }
                (_, 0) => short_line_seen = true,
                (line_bases, _) => {
                    if short_line_seen || bases > line_bases {
                        return Err(FastaError::InconsistentLineLength {
                            path: source_name.to_string(),
                            name: record.name.clone(),
                            line: line_number,
                        });
                    }
                    if bases < line_bases || width != record.line_width {
                        short_line_seen = true;
                    }
                }
            }
            record.length += bases;
        }

        Ok(Self { records })
    }

    /// Writes the index in samtools `.fai` format.
    pub fn write(&self, path: &Path) -> Result<(), FastaError> {
        write_atomic(path, |w| {
            let mut fai = csv::WriterBuilder::new()
                .delimiter(b'\t')
                .has_headers(false)
                .from_writer(w);
            for record in &self.records {
                fai.serialize(record)?;
            }
            fai.flush()
        })?;
        Ok(())
    }

    pub fn records(&self) -> &[FaiRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total number of bases over all sequences.
    pub fn total_length(&self) -> u64 {
        self.records.iter().map(|r| r.length).sum()
    }
}

/// Path of the `.fai` index belonging to a FASTA file.
pub fn index_path(fasta: &Path) -> PathBuf {
    let mut name = fasta.as_os_str().to_os_string();
    name.push(".fai");
    PathBuf::from(name)
}

/// A FASTA file opened through its index.
///
/// Every fetch opens its own reader, so one `IndexedFasta` can serve concurrent
/// per-chromosome jobs.
#[derive(Debug, Clone)]
pub struct IndexedFasta {
    path: PathBuf,
    index: fasta::Index,
    sequences: Vec<fasta::Sequence>,
    lengths: HashMap<String, u64>,
}

impl IndexedFasta {
    /// Opens a FASTA file that has already been indexed.
    pub fn open(path: &Path) -> Result<Self, FastaError> {
        let path_str = path.to_string_lossy().to_string();
        if !path.is_file() {
            return Err(FastaError::Io {
                path: path_str,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            });
        }
        let fai = index_path(path);
        let fai_str = fai.to_string_lossy().to_string();
        let file = match File::open(&fai) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FastaError::MissingIndex { path: path_str });
            }
            Err(e) => {
                return Err(FastaError::Io {
                    path: fai_str,
                    source: e,
                });
            }
        };
        let index = fasta::Index::new(file).map_err(|e| FastaError::MalformedIndex {
            path: fai_str.clone(),
            source: e,
        })?;
        Self::with_index(path, &fai_str, index)
    }

    /// Opens a FASTA file, building and saving its index first if it has none.
    pub fn open_or_index(path: &Path) -> Result<Self, FastaError> {
        match Self::open(path) {
            Err(FastaError::MissingIndex { .. }) => {
                FastaIndex::build(path)?.write(&index_path(path))?;
                Self::open(path)
            }
            other => other,
        }
    }

    fn with_index(path: &Path, fai: &str, index: fasta::Index) -> Result<Self, FastaError> {
        let sequences = index.sequences();
        let mut lengths = HashMap::with_capacity(sequences.len());
        for sequence in &sequences {
            if lengths.insert(sequence.name.clone(), sequence.len).is_some() {
                return Err(FastaError::DuplicateName {
                    path: fai.to_string(),
                    name: sequence.name.clone(),
                });
            }
        }
        Ok(Self {
            path: path.to_path_buf(),
            index,
            sequences,
            lengths,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sequence names in file order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sequences.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Total number of bases over all sequences.
    pub fn total_length(&self) -> u64 {
        self.sequences.iter().map(|s| s.len).sum()
    }

    pub fn sequence_length(&self, name: &str) -> Option<u64> {
        self.lengths.get(name).copied()
    }

    /// The whole sequence `name`, case preserved.
    pub fn fetch(&self, name: &str) -> Result<Vec<u8>, FastaError> {
        let length = self
            .sequence_length(name)
            .ok_or_else(|| FastaError::UnknownSequence(name.to_string()))?;
        if length == 0 {
            return Ok(Vec::new());
        }
        self.fetch_range(name, 1, length)
    }

    /// The 1-based inclusive range `[start, end]` of sequence `name`, case preserved.
    pub fn fetch_range(&self, name: &str, start: u64, end: u64) -> Result<Vec<u8>, FastaError> {
        let length = self
            .sequence_length(name)
            .ok_or_else(|| FastaError::UnknownSequence(name.to_string()))?;
        if start == 0 || start > end || end > length {
            return Err(FastaError::OutOfRange {
                name: name.to_string(),
                start,
                end,
                length,
            });
        }

        let io_error = |source| FastaError::Io {
            path: self.path.to_string_lossy().to_string(),
            source,
        };
        let file = File::open(&self.path).map_err(io_error)?;
        let mut reader = fasta::IndexedReader::with_index(file, self.index.clone());
        let mut sequence = Vec::with_capacity((end - start + 1) as usize);
        reader.fetch(name, start - 1, end).map_err(io_error)?;
        reader.read(&mut sequence).map_err(io_error)?;
        Ok(sequence)
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && matches!(line[end - 1], b'\n' | b'\r') {
        end -= 1;
    }
    &line[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    const FASTA: &str = ">chr1 first\nACGTA\nCGTAC\nGT\n>chr2\nggggg\nAAA\n";

    #[test]
    fn index_records_offsets_and_line_geometry() {
        let index = FastaIndex::build_from(Cursor::new(FASTA), "mem").unwrap();
        assert_eq!(
            index.records(),
            &[
                FaiRecord {
                    name: "chr1".to_string(),
                    length: 12,
                    offset: 12,
                    line_bases: 5,
                    line_width: 6,
                },
                FaiRecord {
                    name: "chr2".to_string(),
                    length: 8,
                    offset: 33,
                    line_bases: 5,
                    line_width: 6,
                },
            ]
        );
        assert_eq!(index.total_length(), 20);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = FastaIndex::build_from(Cursor::new(">a\nAC\n>a\nGT\n"), "mem");
        assert!(matches!(
            result,
            Err(FastaError::DuplicateName { name, .. }) if name == "a"
        ));
    }

    #[test]
    fn inconsistent_line_lengths_are_rejected() {
        let result = FastaIndex::build_from(Cursor::new(">a\nACGT\nAC\nACGT\n"), "mem");
        assert!(matches!(
            result,
            Err(FastaError::InconsistentLineLength { line: 4, .. })
        ));
        let result = FastaIndex::build_from(Cursor::new(">a\nACGT\nACGTA\n"), "mem");
        assert!(matches!(
            result,
            Err(FastaError::InconsistentLineLength { .. })
        ));
    }

    #[test]
    fn sequence_before_header_is_rejected() {
        let result = FastaIndex::build_from(Cursor::new("ACGT\n>a\nAC\n"), "mem");
        assert!(matches!(result, Err(FastaError::MissingHeader { line: 1, .. })));
    }

    #[test]
    fn unindexed_fasta_cannot_be_opened() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("genome.fa");
        fs::write(&path, FASTA).unwrap();
        assert!(matches!(
            IndexedFasta::open(&path),
            Err(FastaError::MissingIndex { .. })
        ));
    }

    #[test]
    fn fetch_reassembles_lines_and_keeps_case() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("genome.fa");
        fs::write(&path, FASTA).unwrap();

        let fasta = IndexedFasta::open_or_index(&path).unwrap();
        assert!(index_path(&path).is_file());
        assert_eq!(fasta.names().collect::<Vec<_>>(), vec!["chr1", "chr2"]);
        assert_eq!(fasta.fetch("chr1").unwrap(), b"ACGTACGTACGT");
        assert_eq!(fasta.fetch("chr2").unwrap(), b"gggggAAA");
        assert_eq!(fasta.fetch_range("chr1", 4, 7).unwrap(), b"TACG");
        assert_eq!(fasta.fetch_range("chr2", 5, 6).unwrap(), b"gA");
    }

    #[test]
    fn written_index_is_samtools_compatible() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("genome.fa");
        fs::write(&path, FASTA).unwrap();
        FastaIndex::build(&path)
            .unwrap()
            .write(&index_path(&path))
            .unwrap();

        assert_eq!(
            fs::read_to_string(index_path(&path)).unwrap(),
            "chr1\t12\t12\t5\t6\nchr2\t8\t33\t5\t6\n"
        );
        let reopened = IndexedFasta::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.total_length(), 20);
        assert_eq!(reopened.sequence_length("chr2"), Some(8));
    }

    #[test]
    fn blank_lines_after_a_header_do_not_shift_the_sequence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("genome.fa");
        fs::write(&path, ">chr1\n\nACGT\nAC\n>chr2\n\n\ngg\n").unwrap();

        let index = FastaIndex::build(&path).unwrap();
        assert_eq!(
            index.records()[0],
            FaiRecord {
                name: "chr1".to_string(),
                length: 6,
                offset: 7,
                line_bases: 4,
                line_width: 5,
            }
        );

        let fasta = IndexedFasta::open_or_index(&path).unwrap();
        assert_eq!(fasta.fetch("chr1").unwrap(), b"ACGTAC");
        assert_eq!(fasta.fetch("chr2").unwrap(), b"gg");
    }

    #[test]
    fn duplicate_names_in_a_saved_index_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("genome.fa");
        fs::write(&path, ">a\nAC\n").unwrap();
        fs::write(index_path(&path), "a\t2\t3\t2\t3\na\t2\t3\t2\t3\n").unwrap();
        assert!(matches!(
            IndexedFasta::open(&path),
            Err(FastaError::DuplicateName { name, .. }) if name == "a"
        ));
    }

    #[test]
    fn malformed_index_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("genome.fa");
        fs::write(&path, ">a\nAC\n").unwrap();
        fs::write(index_path(&path), "a\ttwo\t3\t2\t3\n").unwrap();
        assert!(matches!(
            IndexedFasta::open(&path),
            Err(FastaError::MalformedIndex { .. })
        ));
    }

    #[test]
    fn out_of_range_and_unknown_requests_fail() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("genome.fa");
        fs::write(&path, FASTA).unwrap();
        let fasta = IndexedFasta::open_or_index(&path).unwrap();
        assert!(matches!(
            fasta.fetch_range("chr1", 10, 13),
            Err(FastaError::OutOfRange { .. })
        ));
        assert!(matches!(
            fasta.fetch("chrM"),
            Err(FastaError::UnknownSequence(_))
        ));
    }

    #[test]
    fn windows_line_endings_are_supported() {
        let index = FastaIndex::build_from(Cursor::new(">a\r\nACG\r\nAC\r\n"), "mem").unwrap();
        let record = &index.records()[0];
        assert_eq!(record.length, 5);
        assert_eq!(record.line_bases, 3);
        assert_eq!(record.line_width, 5);
    }
}
