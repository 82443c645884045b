use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::alignability::AlignabilityError;
use crate::core::io::enzymes::EnzymeTableError;
use crate::core::io::fasta::FastaError;
use crate::core::io::output::OutputError;
use crate::core::io::refgene::TranscriptTableError;
use crate::core::models::enzyme::EnzymeError;

/// Broad category of an [`EngineError`], for callers that only need to know who is at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid parameters or unknown enzymes; raised before any output is written.
    Configuration,
    /// Missing, unindexed or malformed input files.
    Input,
    /// Failure to read or write a file.
    Io,
    Cancelled,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Restriction enzyme error: {source}")]
    Enzyme {
        #[from]
        source: EnzymeError,
    },

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Reference genome error: {source}")]
    Genome {
        #[from]
        source: FastaError,
    },

    #[error("Enzyme table error: {source}")]
    EnzymeTable {
        #[from]
        source: EnzymeTableError,
    },

    #[error("Transcript table error: {source}")]
    Transcripts {
        #[from]
        source: TranscriptTableError,
    },

    #[error("Alignability map error: {source}")]
    Alignability {
        #[from]
        source: AlignabilityError,
    },

    #[error("Output error: {source}")]
    Output {
        #[from]
        source: OutputError,
    },

    #[error("Operation cancelled")]
    Cancelled,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Configuration(_)
            | EngineError::Config { .. }
            | EngineError::Enzyme { .. } => ErrorKind::Configuration,
            EngineError::EnzymeTable {
                source: EnzymeTableError::InvalidSite { .. },
            } => ErrorKind::Configuration,
            EngineError::Genome {
                source: FastaError::Io { .. } | FastaError::Output(_),
            }
            | EngineError::EnzymeTable {
                source: EnzymeTableError::Io { .. },
            }
            | EngineError::Transcripts {
                source: TranscriptTableError::Io { .. },
            }
            | EngineError::Alignability {
                source: AlignabilityError::Io { .. },
            }
            | EngineError::Output { .. } => ErrorKind::Io,
            EngineError::Input(_)
            | EngineError::Genome { .. }
            | EngineError::EnzymeTable { .. }
            | EngineError::Transcripts { .. }
            | EngineError::Alignability { .. } => ErrorKind::Input,
            EngineError::Cancelled => ErrorKind::Cancelled,
        }
    }
}
