//! errors.rs - Custom error types for the blackline-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that a host can turn into status messages.
//! None of these errors leave the editor in a partially applied state.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// Failure reported by a document converter.
///
/// Kept separate from [`BlacklineError`] so that converter implementations
/// living outside this crate only need to produce this one type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConversionError {
    #[error("Unsupported file type '{0}'")]
    UnsupportedExtension(String),

    #[error("Document is not valid UTF-8 markup: {0}")]
    InvalidEncoding(String),

    #[error("Document contains disallowed content: {0}")]
    DisallowedContent(String),

    #[error("Document converter is unavailable: {0}")]
    Unavailable(String),
}

/// This enum represents all possible error types in the `blackline-core` library.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BlacklineError {
    #[error("Failed to compile detection rule '{0}': {1}")]
    RuleCompilationError(String, regex::Error),

    #[error("Rule '{0}': pattern length ({1}) exceeds maximum allowed ({2})")]
    PatternLengthExceeded(String, usize, usize),

    #[error("Document conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    #[error("No document is loaded")]
    NoDocument,

    #[error("Selection range {start}..{end} is outside the document text ({len} characters)")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },

    #[error("Cannot redact an empty span")]
    EmptySpan,

    #[error("Selection range {start}..{end} overlaps an existing redaction")]
    RangeOverlapsRedaction { start: usize, end: usize },

    #[error("Selected text does not match the document text at {start}..{end}")]
    SelectionMismatch { start: usize, end: usize },

    #[error("Candidate index {index} is out of range ({len} candidates)")]
    CandidateOutOfRange { index: usize, len: usize },

    #[error("No document to export")]
    EmptyExport,

    #[error("Failed to serialize audit record: {0}")]
    SerializationError(String),

    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("A critical system error occurred: {0}")]
    AnyhowWrapper(#[from] anyhow::Error),

    #[error("A fatal error occurred: {0}")]
    Fatal(String),
}
