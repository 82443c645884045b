use super::output::{OutputError, write_atomic};
use crate::core::models::fragment::Interval;
use crate::core::models::gene::Strand;
use std::io::Write;
use std::path::Path;

/// One BED feature. Coordinates are stored 1-based inclusive and written 0-based half-open.
#[derive(Debug, Clone, PartialEq)]
pub struct BedRecord {
    pub chromosome: String,
    pub interval: Interval,
    pub name: String,
    pub score: Option<u32>,
    pub strand: Option<Strand>,
}

impl BedRecord {
    pub fn new(chromosome: &str, interval: Interval, name: impl Into<String>) -> Self {
        Self {
            chromosome: chromosome.to_string(),
            interval,
            name: name.into(),
            score: None,
            strand: None,
        }
    }

    pub fn with_strand(mut self, strand: Strand) -> Self {
        self.strand = Some(strand);
        self
    }

    pub fn with_score(mut self, score: u32) -> Self {
        self.score = Some(score.min(1000));
        self
    }
}

/// A named BED track with a UCSC `track` header line.
#[derive(Debug, Clone, PartialEq)]
pub struct BedTrack {
    pub name: String,
    pub description: String,
    /// `R,G,B` item colour.
    pub color: Option<&'static str>,
    pub records: Vec<BedRecord>,
}

impl BedTrack {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            color: None,
            records: Vec::new(),
        }
    }

    pub fn with_color(mut self, color: &'static str) -> Self {
        self.color = Some(color);
        self
    }

    pub fn push(&mut self, record: BedRecord) {
        self.records.push(record);
    }

    pub fn header(&self) -> String {
        let mut header = format!(
            "track name=\"{}\" description=\"{}\" visibility=2",
            self.name, self.description
        );
        if let Some(color) = self.color {
            header.push_str(&format!(" color={}", color));
        }
        header
    }

    /// Writes the track. Records are written in genomic order; the name, score and strand
    /// columns are emitted as far as any record needs them.
    pub fn write_to(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writeln!(writer, "{}", self.header())?;
        let with_strand = self.records.iter().any(|r| r.strand.is_some());
        let with_score = with_strand || self.records.iter().any(|r| r.score.is_some());

        let mut records: Vec<&BedRecord> = self.records.iter().collect();
        records.sort_by(|a, b| {
            a.chromosome
                .cmp(&b.chromosome)
                .then(a.interval.cmp(&b.interval))
        });
        for record in records {
            write!(
                writer,
                "{}\t{}\t{}\t{}",
                record.chromosome,
                record.interval.start - 1,
                record.interval.end,
                record.name
            )?;
            if with_score {
                write!(writer, "\t{}", record.score.unwrap_or(0))?;
            }
            if with_strand {
                match record.strand {
                    Some(strand) => write!(writer, "\t{}", strand)?,
                    None => write!(writer, "\t.")?,
                }
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    pub fn write(&self, path: &Path) -> Result<(), OutputError> {
        write_atomic(path, |w| self.write_to(w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_are_zero_based_and_sorted() {
        let mut track = BedTrack::new("fragments", "Selected fragments").with_color("0,0,255");
        track.push(BedRecord::new("chr2", Interval::new(1, 10), "b"));
        track.push(BedRecord::new("chr1", Interval::new(101, 200), "a"));

        let mut out = Vec::new();
        track.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "track name=\"fragments\" description=\"Selected fragments\" visibility=2 color=0,0,255"
        );
        assert_eq!(lines[1], "chr1\t100\t200\ta");
        assert_eq!(lines[2], "chr2\t0\t10\tb");
    }

    #[test]
    fn strand_column_implies_score_column() {
        let mut track = BedTrack::new("targets", "TSS");
        track.push(BedRecord::new("chr1", Interval::new(5, 5), "GENE").with_strand(Strand::Minus));
        track.push(BedRecord::new("chr1", Interval::new(9, 9), "OTHER"));

        let mut out = Vec::new();
        track.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "chr1\t4\t5\tGENE\t0\t-");
        assert_eq!(lines[2], "chr1\t8\t9\tOTHER\t0\t.");
    }

    #[test]
    fn scores_are_capped_for_browsers() {
        let record = BedRecord::new("chr1", Interval::new(1, 2), "x").with_score(5000);
        assert_eq!(record.score, Some(1000));
    }
}
