//! # File I/O
//!
//! Readers for the design inputs and writers for its exports.
//!
//! - [`fasta`] - samtools-compatible `.fai` indexing and random access to FASTA sequences
//! - [`enzymes`] - Tab-separated restriction enzyme tables
//! - [`refgene`] - UCSC refGene-style transcript tables and target gene lists
//! - [`alignability`] - Mean k-mer alignability tracks in bedGraph format
//! - [`output`] - Atomic write-then-rename output files
//! - [`digest_table`] - The genome-wide digest table
//! - [`bed`] - BED tracks for genome browsers
//! - [`summary`] - Per-viewpoint summary table

pub mod alignability;
pub mod bed;
pub mod digest_table;
pub mod enzymes;
pub mod fasta;
pub mod output;
pub mod refgene;
pub mod summary;
