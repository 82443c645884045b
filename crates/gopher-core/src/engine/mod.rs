//! # Engine Module
//!
//! The design engine of GOPHER++: everything between a digested genome and a finished
//! Capture Hi-C panel.
//!
//! ## Overview
//!
//! For every transcription start site the engine picks the restriction fragments worth
//! enriching, scores how well they cover the neighbourhood of the TSS, places probes in
//! their margins and finally summarises the whole panel. Chromosomes are independent of each
//! other, so the work is split into per-chromosome jobs whose private results are merged by
//! a single writer.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Digestion, filter, viewpoint and bait parameters
//! - **Error Handling** ([`error`]) - The single domain error type and its broad kinds
//! - **Progress Monitoring** ([`progress`]) - Progress events published to a callback or channel
//! - **Cancellation** ([`cancel`]) - A shared token checked between jobs and viewpoints
//! - **Segment Index** ([`index`]) - The canonical, ordered store of active segments
//! - **Scoring** ([`scoring`]) - The TSS-centred Gaussian model behind viewpoint scores
//! - **Viewpoints** ([`viewpoint`]) - Candidate selection and filtering around a TSS
//! - **Baits** ([`baits`]) - Probe placement in usable margins
//! - **Statistics** ([`aggregate`]) - Panel-wide statistics with shared segments counted once

pub mod aggregate;
pub mod baits;
pub mod cancel;
pub mod config;
pub(crate) mod context;
pub mod error;
pub mod index;
pub mod progress;
pub mod scoring;
pub(crate) mod tasks;
pub mod viewpoint;
