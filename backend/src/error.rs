//! Error types for the logbook import pipeline.
//!
//! One enum per layer:
//!
//! - [`DirectoryError`] - Airport dataset loading and manual registration
//! - [`IngestError`] - Turning uploaded bytes into rows
//! - [`ImportError`] - Top-level import orchestration
//! - [`LogbookError`] - Logbook operations (manual flights, lookups)
//! - [`ConfigError`] - Environment configuration
//! - [`ServerError`] - HTTP layer
//!
//! Resolution problems (unknown codes, rows without a route) are not errors:
//! they surface as missing airports and skipped-row counts in the import outcome.
//! `From` conversions let `?` cross layer boundaries.

use thiserror::Error;

// =============================================================================
// Airport Directory Errors
// =============================================================================

/// Errors while loading or extending the airport directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Failed to read the dataset file.
    #[error("Failed to read airport dataset: {0}")]
    IoError(#[from] std::io::Error),

    /// Dataset is not valid JSON or has the wrong shape.
    #[error("Invalid airport dataset: {0}")]
    JsonError(#[from] serde_json::Error),

    /// OurAirports CSV export is malformed.
    #[error("Invalid airports CSV: {0}")]
    CsvError(#[from] csv::Error),

    /// Every airport in the dataset was rejected.
    #[error("Airport dataset contains no usable airports ({rejected} rejected)")]
    NoAirports { rejected: usize },

    /// Manual airport failed validation.
    #[error("Invalid airport: {errors:?}")]
    InvalidAirport { errors: Vec<String> },
}

// =============================================================================
// Ingestion Errors
// =============================================================================

/// Errors while turning raw input into rows.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Content could not be decoded.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Delimited content is malformed.
    #[error("Invalid delimited content: {0}")]
    ParseError(String),

    /// Input holds no rows at all.
    #[error("Input is empty: no rows to import")]
    EmptyInput,

    /// Extension not handled by any ingestion path.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// PDF page rows are not in the expected JSON shape.
    #[error("Invalid page rows: {0}")]
    InvalidPages(#[from] serde_json::Error),
}

// =============================================================================
// Import Errors (top-level)
// =============================================================================

/// Top-level import errors.
///
/// Returned by [`crate::pipeline::import_bytes`] and friends. Only terminal
/// failures end up here; a file that yields no flights is a successful import
/// whose status asks for column mapping.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Ingestion error.
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// Directory error.
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Batch size of zero.
    #[error("Batch size must be at least 1")]
    InvalidBatchSize,
}

// =============================================================================
// Logbook Errors
// =============================================================================

/// Errors from logbook operations.
#[derive(Debug, Error)]
pub enum LogbookError {
    /// Code does not resolve to an airport.
    #[error("Unknown airport code: {0}")]
    UnknownAirport(String),

    /// No logbook with that name.
    #[error("Logbook not found: {0}")]
    NotFound(String),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Variable is set but does not parse.
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: String, value: String },
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Import error.
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Directory error.
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Logbook error.
    #[error("Logbook error: {0}")]
    Logbook(#[from] LogbookError),

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

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Result type for ingestion.
pub type IngestResult<T> = Result<T, IngestError>;

/// Result type for imports.
pub type ImportResult<T> = Result<T, ImportError>;

/// Result type for logbook operations.
pub type LogbookResult<T> = Result<T, LogbookError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // IngestError -> ImportError
        let ingest_err = IngestError::EmptyInput;
        let import_err: ImportError = ingest_err.into();
        assert!(import_err.to_string().contains("empty"));

        // DirectoryError -> ImportError -> ServerError
        let dir_err = DirectoryError::NoAirports { rejected: 3 };
        let import_err: ImportError = dir_err.into();
        let server_err: ServerError = import_err.into();
        assert!(server_err.to_string().contains("3 rejected"));
    }

    #[test]
    fn test_config_error_format() {
        let err = ConfigError::InvalidValue {
            name: "LOGMAP_PORT".into(),
            value: "eighty".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("LOGMAP_PORT"));
        assert!(msg.contains("eighty"));
    }

    #[test]
    fn test_invalid_airport_lists_messages() {
        let err = DirectoryError::InvalidAirport {
            errors: vec!["latitude out of range".into()],
        };
        assert!(err.to_string().contains("latitude out of range"));
    }
}
