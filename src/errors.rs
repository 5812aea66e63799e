//! Unified error types for `Pullsheet`.
//!
//! Row-level cleaning problems (a line item that cannot be parsed) are *data*, not
//! errors - they travel through the batch result as [`crate::core::clean::CleaningError`]
//! records so one bad row never aborts an upload. The variants here cover everything
//! that genuinely stops a run: infrastructure failures and reference-data mismatches,
//! each carrying enough context to tell staff what to fix.

use thiserror::Error;

/// Top-level error type for all fallible operations in the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the configuration problem
        message: String,
    },

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// CSV file could not be parsed
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// Report body could not be serialized or deserialized
    #[error("Report serialization error: {0}")]
    ReportBody(#[from] serde_json::Error),

    /// An order row carried a flavor label with no entry in the flavor mapping.
    /// This is a reference-data mismatch, not bad user input, so it aborts the batch.
    #[error("Unknown flavor label {raw_label:?} on order row {row}")]
    UnknownFlavor {
        /// The canonical raw flavor label that failed the lookup
        raw_label: String,
        /// Zero-based index of the offending row
        row: usize,
    },

    /// A meal referenced a protein key with no protein reference entry
    #[error("No protein reference entry for key {key:?}")]
    UnknownProtein {
        /// The normalized protein key that failed the lookup
        key: String,
    },

    /// The allocator referenced a flavor key with no flavor reference entry
    #[error("No flavor reference entry for key {key:?}")]
    UnknownFlavorKey {
        /// The flavor key that failed the lookup
        key: String,
    },

    /// A persisted order report was requested by an id that does not exist
    #[error("Order report not found: {id}")]
    ReportNotFound {
        /// Primary key of the missing report
        id: i64,
    },
}

// Convenience `Result` type
/// Crate-wide result alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
