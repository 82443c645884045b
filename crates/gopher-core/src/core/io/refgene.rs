use crate::core::models::gene::{GopherGene, Strand};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TranscriptTableError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Malformed transcript record at '{path}' line {line}: {message}")]
    Parse {
        path: String,
        line: u64,
        message: String,
    },
}

/// The columns of a refGene row that matter for TSS extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptRecord {
    pub accession: String,
    pub chromosome: String,
    pub strand: Strand,
    /// 0-based transcript start, as stored in the table.
    pub tx_start: u64,
    /// Transcript end, which is also the 1-based position of its last base.
    pub tx_end: u64,
    pub symbol: String,
}

impl TranscriptRecord {
    /// 1-based position of the transcription start site.
    pub fn tss(&self) -> u64 {
        match self.strand {
            Strand::Plus => self.tx_start + 1,
            Strand::Minus => self.tx_end,
        }
    }

    /// Alternate haplotypes and unplaced contigs carry an underscore in their name.
    pub fn is_on_primary_assembly(&self) -> bool {
        !self.chromosome.contains('_')
    }

    pub fn is_protein_coding(&self) -> bool {
        self.accession.starts_with("NM_")
    }
}

/// Reads a UCSC refGene table. The leading `bin` column is optional.
pub fn read_transcripts(path: &Path) -> Result<Vec<TranscriptRecord>, TranscriptTableError> {
    let path_str = path.to_string_lossy().to_string();
    let file = std::fs::File::open(path).map_err(|e| TranscriptTableError::Io {
        path: path_str.clone(),
        source: e,
    })?;
    read_transcripts_from(file, &path_str)
}

pub fn read_transcripts_from(
    reader: impl Read,
    source_name: &str,
) -> Result<Vec<TranscriptRecord>, TranscriptTableError> {
    let mut rows = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut transcripts = Vec::new();
    for (index, row) in rows.records().enumerate() {
        let row = row.map_err(|e| TranscriptTableError::Csv {
            path: source_name.to_string(),
            source: e,
        })?;
        let line = row
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 1);
        let parse_error = |message: String| TranscriptTableError::Parse {
            path: source_name.to_string(),
            line,
            message,
        };

        // With the bin column the first field is numeric and the strand is the fourth field.
        let has_bin = row.len() >= 16 && row.get(0).is_some_and(|f| f.parse::<u32>().is_ok());
        let skip = usize::from(has_bin);
        let field = |i: usize| row.get(i + skip).map(str::trim);

        let (Some(accession), Some(chromosome), Some(strand), Some(start), Some(end)) =
            (field(0), field(1), field(2), field(3), field(4))
        else {
            return Err(parse_error(format!(
                "expected at least 5 columns, found {}",
                row.len()
            )));
        };
        let strand: Strand = strand.parse().map_err(parse_error)?;
        let tx_start: u64 = start
            .parse()
            .map_err(|_| parse_error(format!("invalid txStart '{}'", start)))?;
        let tx_end: u64 = end
            .parse()
            .map_err(|_| parse_error(format!("invalid txEnd '{}'", end)))?;
        if tx_end <= tx_start {
            return Err(parse_error(format!(
                "txEnd {} does not follow txStart {}",
                tx_end, tx_start
            )));
        }
        let symbol = field(11)
            .filter(|s| !s.is_empty())
            .unwrap_or(accession)
            .to_string();

        transcripts.push(TranscriptRecord {
            accession: accession.to_string(),
            chromosome: chromosome.to_string(),
            strand,
            tx_start,
            tx_end,
            symbol,
        });
    }
    Ok(transcripts)
}

/// Reads target gene symbols, one per line or separated by whitespace or commas.
pub fn read_target_list(path: &Path) -> Result<BTreeSet<String>, TranscriptTableError> {
    let content = std::fs::read_to_string(path).map_err(|e| TranscriptTableError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    Ok(parse_target_list(&content))
}

pub fn parse_target_list(content: &str) -> BTreeSet<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(|line| line.split(|c: char| c.is_whitespace() || c == ','))
        .filter(|symbol| !symbol.is_empty())
        .map(str::to_string)
        .collect()
}

/// Which transcripts contribute genes.
#[derive(Debug, Clone, Default)]
pub struct TranscriptFilter {
    /// Restrict to these gene symbols; `None` keeps every gene.
    pub targets: Option<BTreeSet<String>>,
    /// Keep only `NM_` accessions.
    pub protein_coding_only: bool,
}

/// Genes assembled from a transcript table.
#[derive(Debug, Clone, Default)]
pub struct TargetGenes {
    /// Sorted by chromosome, symbol, then strand.
    pub genes: Vec<GopherGene>,
    /// Requested symbols with no transcript on the primary assembly.
    pub unknown_targets: Vec<String>,
}

/// Groups transcripts into genes, keyed by chromosome, symbol and strand, collecting the
/// distinct TSS of every transcript.
///
/// A symbol with transcripts on both strands of one chromosome yields one gene per strand,
/// so every TSS keeps the orientation of the transcripts it came from.
pub fn collect_genes(transcripts: &[TranscriptRecord], filter: &TranscriptFilter) -> TargetGenes {
    let mut genes: BTreeMap<(String, String, Strand), GopherGene> = BTreeMap::new();
    let mut skipped = 0usize;
    for transcript in transcripts {
        if !transcript.is_on_primary_assembly()
            || (filter.protein_coding_only && !transcript.is_protein_coding())
        {
            skipped += 1;
            continue;
        }
        if let Some(targets) = &filter.targets {
            if !targets.contains(&transcript.symbol) {
                continue;
            }
        }
        genes
            .entry((
                transcript.chromosome.clone(),
                transcript.symbol.clone(),
                transcript.strand,
            ))
            .or_insert_with(|| {
                GopherGene::new(
                    &transcript.symbol,
                    &transcript.accession,
                    &transcript.chromosome,
                    transcript.strand,
                )
            })
            .add_tss(transcript.tss());
    }
    debug!(
        genes = genes.len(),
        skipped_transcripts = skipped,
        "Collected genes from transcript table"
    );

    let unknown_targets = match &filter.targets {
        Some(targets) => {
            let found: BTreeSet<&str> = genes.values().map(|g| g.symbol.as_str()).collect();
            targets
                .iter()
                .filter(|t| !found.contains(t.as_str()))
                .cloned()
                .collect()
        }
        None => Vec::new(),
    };

    TargetGenes {
        genes: genes.into_values().collect(),
        unknown_targets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFGENE: &str = "\
585\tNM_001\tchr1\t+\t999\t5000\t1100\t4000\t2\t999,3000,\t1500,5000,\t0\tGENEA\tcmpl\tcmpl\t0,0,
585\tNM_002\tchr1\t+\t1999\t5000\t2100\t4000\t1\t1999,\t5000,\t0\tGENEA\tcmpl\tcmpl\t0,
585\tNM_003\tchr1\t+\t999\t4800\t1100\t4000\t1\t999,\t4800,\t0\tGENEA\tcmpl\tcmpl\t0,
586\tNM_004\tchr2\t-\t10000\t20000\t11000\t19000\t1\t10000,\t20000,\t0\tGENEB\tcmpl\tcmpl\t0,
587\tNR_005\tchr2\t+\t100\t900\t900\t900\t1\t100,\t900,\t0\tLNC1\tnone\tnone\t-1,
588\tNM_006\tchr6_alt\t+\t100\t900\t200\t800\t1\t100,\t900,\t0\tGENEC\tcmpl\tcmpl\t0,
";

    #[test]
    fn tss_follows_strand() {
        let transcripts = read_transcripts_from(REFGENE.as_bytes(), "refGene.txt").unwrap();
        assert_eq!(transcripts.len(), 6);
        assert_eq!(transcripts[0].tss(), 1000);
        assert_eq!(transcripts[3].tss(), 20000);
        assert_eq!(transcripts[3].symbol, "GENEB");
    }

    #[test]
    fn bin_column_is_optional() {
        let without_bin: String = REFGENE
            .lines()
            .map(|line| line.split_once('\t').unwrap().1)
            .map(|line| format!("{}\n", line))
            .collect();
        let with = read_transcripts_from(REFGENE.as_bytes(), "a").unwrap();
        let without = read_transcripts_from(without_bin.as_bytes(), "b").unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn transcripts_group_into_genes_with_distinct_tss() {
        let transcripts = read_transcripts_from(REFGENE.as_bytes(), "refGene.txt").unwrap();
        let result = collect_genes(&transcripts, &TranscriptFilter::default());
        let symbols: Vec<&str> = result.genes.iter().map(|g| g.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["GENEA", "GENEB", "LNC1"]);

        let gene_a = &result.genes[0];
        assert_eq!(gene_a.accession, "NM_001");
        assert_eq!(gene_a.tss_positions().collect::<Vec<_>>(), vec![1000, 2000]);
    }

    #[test]
    fn filter_restricts_to_targets_and_reports_missing_ones() {
        let transcripts = read_transcripts_from(REFGENE.as_bytes(), "refGene.txt").unwrap();
        let filter = TranscriptFilter {
            targets: Some(parse_target_list("GENEB\nGENEC, MISSING\n")),
            protein_coding_only: true,
        };
        let result = collect_genes(&transcripts, &filter);
        assert_eq!(result.genes.len(), 1);
        assert_eq!(result.genes[0].symbol, "GENEB");
        assert_eq!(result.unknown_targets, vec!["GENEC", "MISSING"]);
    }

    #[test]
    fn opposite_strand_transcripts_form_separate_genes() {
        let text = "\
NM_010\tchr3\t+\t99\t900\t150\t800\t1\t99,\t900,\t0\tGENED\tcmpl\tcmpl\t0,
NM_011\tchr3\t-\t5000\t7000\t5100\t6900\t1\t5000,\t7000,\t0\tGENED\tcmpl\tcmpl\t0,
NM_012\tchr3\t+\t199\t900\t250\t800\t1\t199,\t900,\t0\tGENED\tcmpl\tcmpl\t0,
";
        let transcripts = read_transcripts_from(text.as_bytes(), "refGene.txt").unwrap();
        let result = collect_genes(&transcripts, &TranscriptFilter::default());
        assert_eq!(result.genes.len(), 2);

        let plus = &result.genes[0];
        assert_eq!(plus.strand, Strand::Plus);
        assert_eq!(plus.tss_positions().collect::<Vec<_>>(), vec![100, 200]);

        let minus = &result.genes[1];
        assert_eq!(minus.strand, Strand::Minus);
        assert_eq!(minus.accession, "NM_011");
        assert_eq!(minus.tss_positions().collect::<Vec<_>>(), vec![7000]);
    }

    #[test]
    fn non_coding_transcripts_can_be_excluded() {
        let transcripts = read_transcripts_from(REFGENE.as_bytes(), "refGene.txt").unwrap();
        let filter = TranscriptFilter {
            targets: None,
            protein_coding_only: true,
        };
        let result = collect_genes(&transcripts, &filter);
        assert!(result.genes.iter().all(|g| g.symbol != "LNC1"));
    }

    #[test]
    fn invalid_strand_is_a_parse_error() {
        let text = "NM_1\tchr1\t.\t10\t20\t10\t20\t1\t10,\t20,\t0\tX\tcmpl\tcmpl\t0,\n";
        let result = read_transcripts_from(text.as_bytes(), "refGene.txt");
        assert!(matches!(
            result,
            Err(TranscriptTableError::Parse { line: 1, .. })
        ));
    }
}
