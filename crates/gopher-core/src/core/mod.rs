//! # Core Module
//!
//! Fundamental building blocks of a Capture Hi-C design.
//!
//! - **Data Models** ([`models`]) - Enzymes, digests, fragments, margins, segments, baits,
//!   genes and viewpoints
//! - **Digestion** ([`digest`]) - Restriction-site scanning, fragment construction and
//!   margin composition
//! - **File I/O** ([`io`]) - Indexed FASTA access, input tables and design exports

pub mod digest;
pub mod io;
pub mod models;
