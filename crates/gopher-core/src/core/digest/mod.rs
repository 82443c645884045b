//! Genome digestion.
//!
//! A chromosome is digested in two steps: the [`scanner`] finds every cut position of the
//! chosen enzymes, and the [`fragments`] builder turns the ordered cuts into restriction
//! fragments that partition the chromosome, annotating each fragment's margins with the
//! [`composition`] measures used to judge whether it can be enriched.

pub mod composition;
pub mod fragments;
pub mod scanner;
