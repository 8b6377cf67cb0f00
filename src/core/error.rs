//! Error types for sv-concord
//!
//! Defines all error types used throughout the library.

use crate::core::classify::VariantKind;
use crate::formats::sv::SvParseError;
use crate::formats::vcf::VcfParseError;
use std::fmt;
use thiserror::Error;

/// Location of a source record, reported alongside adapter errors so that
/// malformed inputs can be found in the input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLocus {
    /// Line number in the source file (1-based, 0 when unknown)
    pub line: usize,
    pub chrom: String,
    pub pos: u64,
    /// Record ID, or `.` when the ID column was empty
    pub id: String,
}

impl fmt::Display for RecordLocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record {} ({}:{}, line {})", self.id, self.chrom, self.pos, self.line)
    }
}

/// Main error type for sv-concord operations
#[derive(Debug, Error)]
pub enum SvError {
    /// A tag required by the classified variant kind is absent
    #[error("{locus}: missing {field} required for {kind} record")]
    MissingField {
        locus: RecordLocus,
        kind: VariantKind,
        field: &'static str,
    },

    /// A field is present but cannot be interpreted
    #[error("{locus}: {message}")]
    Parse { locus: RecordLocus, message: String },

    /// A VCF line could not be split into a record
    #[error("Invalid VCF record at line {line}: {source}")]
    InvalidRecord {
        line: usize,
        #[source]
        source: VcfParseError,
    },

    /// A flat breakend line could not be parsed
    #[error("Invalid breakend line {line}: {source}")]
    InvalidSvLine {
        line: usize,
        #[source]
        source: SvParseError,
    },

    /// SVTYPE with no canonicalization rule
    #[error("Unsupported variant kind: {0}")]
    UnsupportedVariantKind(String),

    /// Random-access fetch on a source without a position index
    #[error("No position index available for {0}")]
    IndexUnavailable(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SvError {
    /// Build a parse error for a record
    pub fn parse(locus: RecordLocus, message: impl Into<String>) -> Self {
        SvError::Parse {
            locus,
            message: message.into(),
        }
    }

    /// Locus of the offending record, when the error is tied to one
    pub fn locus(&self) -> Option<&RecordLocus> {
        match self {
            SvError::MissingField { locus, .. } | SvError::Parse { locus, .. } => Some(locus),
            _ => None,
        }
    }
}

/// Result type alias for sv-concord operations
pub type SvResult<T> = std::result::Result<T, SvError>;
