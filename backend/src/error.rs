//! Error types for the Shopmigrate conversion pipeline.
//!
//! - [`ConvertError`] - Fatal conversion failures (the only errors the engine propagates)
//! - [`ServerError`] - HTTP layer errors
//!
//! Row-level problems (column mismatch, missing SKU, unresolved variant
//! references) are never errors: they are counted in the stats values
//! returned alongside a successful outcome.

use thiserror::Error;

// =============================================================================
// Conversion Errors (fatal)
// =============================================================================

/// Fatal conversion failures. Processing stops and nothing is returned.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Input was empty or contained only whitespace.
    #[error("The file is empty")]
    EmptyInput,

    /// Product files need a header line and at least one data line.
    #[error("The file needs a header row and at least one data row")]
    TooFewLines,

    /// No line within the scan window looked like a header row.
    #[error("No header row found in the first {scanned} non-blank lines")]
    HeaderNotFound { scanned: usize },

    /// A required identifying column could not be resolved.
    #[error("Required column '{0}' not found in header")]
    MissingColumn(&'static str),

    /// Failed to read the input file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Conversion failed on a fatal condition.
    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
