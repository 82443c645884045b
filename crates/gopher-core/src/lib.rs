//! # GOPHER++ Core Library
//!
//! A library for designing Capture Hi-C enrichment panels. Given a reference genome, one or
//! more restriction enzymes and a set of target genes, it digests the genome into restriction
//! fragments, selects the fragments around every transcription start site that are suitable
//! for enrichment, places fixed-length probes ("baits") in their margins and summarises the
//! resulting panel.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Fragment`, `Segment`, `ViewPoint`,
//!   `GopherGene`), sequence composition, the restriction-site scanner and fragment builder, and
//!   file I/O for genomes, annotation tables and design exports.
//!
//! - **[`engine`]: The Logic Core.** Configuration, error handling, progress reporting and
//!   cancellation, together with the design algorithms: the `SegmentIndex`, the viewpoint
//!   builder and its scoring model, the bait placer and the design aggregator.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together into complete
//!   procedures, genome digestion and full panel design, that are run once per invocation.

pub mod core;
pub mod engine;
pub mod workflows;
