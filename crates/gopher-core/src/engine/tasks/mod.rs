//! Per-chromosome jobs.
//!
//! Each job reads one chromosome from the shared genome and returns private results; the
//! calling workflow merges them in chromosome order. Jobs never write to shared state, so
//! they can run on any number of worker threads.

pub mod chromosome_design;
pub mod digestion;
