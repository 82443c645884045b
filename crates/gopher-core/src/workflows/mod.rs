//! # Workflows Module
//!
//! Top-level entry points of GOPHER++. Each workflow loads its inputs, runs the
//! per-chromosome jobs, merges their results and commits its output files, reporting
//! progress along the way.
//!
//! - **Digestion Workflow** ([`digest`]) - The genome-wide digest table for a set of enzymes.
//! - **Design Workflow** ([`design`]) - Full panel design: viewpoints, segments, baits,
//!   statistics and all exports.
//!
//! Output files are written to temporary files and only renamed into place once complete,
//! so a failed or cancelled run leaves no partial output behind.

pub mod design;
pub mod digest;
