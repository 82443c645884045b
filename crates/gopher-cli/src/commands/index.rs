use crate::cli::IndexArgs;
use crate::error::Result;
use gopherpp::core::io::fasta::{FastaIndex, index_path};
use gopherpp::engine::error::EngineError;
use tracing::info;

pub async fn run(args: IndexArgs) -> Result<()> {
    info!("Building FASTA index for {:?}", &args.fasta);
    let index = tokio::task::block_in_place(|| FastaIndex::build(&args.fasta))
        .map_err(EngineError::from)?;

    let path = index_path(&args.fasta);
    index.write(&path).map_err(EngineError::from)?;
    info!(
        sequences = index.len(),
        total_length = index.total_length(),
        "Index written."
    );

    println!(
        "✓ Indexed {} sequence(s), {} bp in total: {}",
        index.len(),
        index.total_length(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test(flavor = "multi_thread")]
    async fn writes_the_fai_next_to_the_fasta() {
        let dir = TempDir::new().unwrap();
        let fasta = dir.path().join("genome.fa");
        fs::write(&fasta, ">chr1\nACGT\nAC\n>chr2\nGGGG\n").unwrap();

        run(IndexArgs {
            fasta: fasta.clone(),
        })
        .await
        .unwrap();

        let fai = fs::read_to_string(index_path(&fasta)).unwrap();
        let lines: Vec<&str> = fai.lines().collect();
        assert_eq!(lines, vec!["chr1\t6\t6\t4\t5", "chr2\t4\t20\t4\t5"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn duplicate_names_fail_without_writing_an_index() {
        let dir = TempDir::new().unwrap();
        let fasta = dir.path().join("dup.fa");
        fs::write(&fasta, ">chr1\nACGT\n>chr1\nACGT\n").unwrap();

        let result = run(IndexArgs {
            fasta: fasta.clone(),
        })
        .await;
        assert!(result.is_err());
        assert!(!index_path(&fasta).exists());
    }
}
