//! # Core Models Module
//!
//! Data structures describing a Capture Hi-C design.
//!
//! - [`enzyme`] - Restriction enzymes, their recognition sites and cut offsets
//! - [`digest`] - Individual cut positions produced by a scan
//! - [`fragment`] - Restriction fragments, their margins and margin composition
//! - [`segment`] - Fragments chosen for enrichment, with the baits placed in their margins
//! - [`gene`] - Target genes and their transcription start sites
//! - [`viewpoint`] - The set of segments selected around one transcription start site
//! - [`ids`] - Identifiers for segments stored in the segment index

pub mod digest;
pub mod enzyme;
pub mod fragment;
pub mod gene;
pub mod ids;
pub mod segment;
pub mod viewpoint;
