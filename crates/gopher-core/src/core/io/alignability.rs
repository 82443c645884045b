use crate::core::models::fragment::Interval;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlignabilityError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Malformed bedGraph record at '{path}' line {line}: {message}")]
    Parse {
        path: String,
        line: usize,
        message: String,
    },
    #[error("Overlapping bedGraph records on '{chromosome}' around position {position}")]
    Overlap { chromosome: String, position: u64 },
}

/// One bedGraph record converted to 1-based inclusive coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Block {
    start: u64,
    end: u64,
    value: f64,
}

/// Mean k-mer alignability values along one chromosome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChromosomeAlignability {
    blocks: Vec<Block>,
}

impl ChromosomeAlignability {
    /// Builds a track from 0-based half-open `(start, end, value)` records.
    pub fn from_records(
        chromosome: &str,
        records: impl IntoIterator<Item = (u64, u64, f64)>,
    ) -> Result<Self, AlignabilityError> {
        let mut blocks: Vec<Block> = records
            .into_iter()
            .filter(|(start, end, _)| end > start)
            .map(|(start, end, value)| Block {
                start: start + 1,
                end,
                value,
            })
            .collect();
        blocks.sort_by_key(|block| block.start);
        if let Some(pair) = blocks.windows(2).find(|pair| pair[1].start <= pair[0].end) {
            return Err(AlignabilityError::Overlap {
                chromosome: chromosome.to_string(),
                position: pair[1].start,
            });
        }
        Ok(Self { blocks })
    }

    /// Length-weighted mean over the covered positions of `interval`, or `None` if the track
    /// covers none of them.
    pub fn mean_over(&self, interval: Interval) -> Option<f64> {
        let first = self.blocks.partition_point(|block| block.end < interval.start);
        let mut covered = 0u64;
        let mut sum = 0.0;
        for block in self.blocks[first..]
            .iter()
            .take_while(|block| block.start <= interval.end)
        {
            let overlap = block.end.min(interval.end) - block.start.max(interval.start) + 1;
            covered += overlap;
            sum += overlap as f64 * block.value;
        }
        (covered > 0).then(|| sum / covered as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Genome-wide alignability, one track per chromosome.
#[derive(Debug, Clone, Default)]
pub struct AlignabilityMap {
    chromosomes: HashMap<String, ChromosomeAlignability>,
}

impl AlignabilityMap {
    /// Reads a bedGraph file (`chrom start end value`, whitespace separated). `track`,
    /// `browser` and `#` lines are ignored.
    pub fn load(path: &Path) -> Result<Self, AlignabilityError> {
        let path_str = path.to_string_lossy().to_string();
        let file = File::open(path).map_err(|e| AlignabilityError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        Self::read_from(BufReader::new(file), &path_str)
    }

    pub fn read_from(reader: impl BufRead, source_name: &str) -> Result<Self, AlignabilityError> {
        let mut records: HashMap<String, Vec<(u64, u64, f64)>> = HashMap::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| AlignabilityError::Io {
                path: source_name.to_string(),
                source: e,
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty()
                || trimmed.starts_with('#')
                || trimmed.starts_with("track")
                || trimmed.starts_with("browser")
            {
                continue;
            }

            let parse_error = |message: String| AlignabilityError::Parse {
                path: source_name.to_string(),
                line: index + 1,
                message,
            };
            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            let [chromosome, start, end, value, ..] = fields[..] else {
                return Err(parse_error(format!(
                    "expected 4 columns, found {}",
                    fields.len()
                )));
            };
            let start: u64 = start
                .parse()
                .map_err(|_| parse_error(format!("invalid start '{}'", start)))?;
            let end: u64 = end
                .parse()
                .map_err(|_| parse_error(format!("invalid end '{}'", end)))?;
            let value: f64 = value
                .parse()
                .map_err(|_| parse_error(format!("invalid value '{}'", value)))?;
            if end < start {
                return Err(parse_error(format!("end {} precedes start {}", end, start)));
            }
            records
                .entry(chromosome.to_string())
                .or_default()
                .push((start, end, value));
        }

        let chromosomes = records
            .into_iter()
            .map(|(chromosome, records)| {
                let track = ChromosomeAlignability::from_records(&chromosome, records)?;
                Ok((chromosome, track))
            })
            .collect::<Result<HashMap<_, _>, AlignabilityError>>()?;
        Ok(Self { chromosomes })
    }

    pub fn chromosome(&self, name: &str) -> Option<&ChromosomeAlignability> {
        self.chromosomes.get(name)
    }

    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }
}
