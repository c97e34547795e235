//! CSV bulk-import pipeline
//!
//! Revenue files are semicolon-delimited, one header line, then 13 ordered
//! columns per row (see [`row::COLUMN_COUNT`]). Parsing is all-or-nothing:
//! any bad row aborts the whole batch before anything is persisted.

pub mod fields;
pub mod row;

use thiserror::Error;

pub use fields::FieldError;
pub use row::{map_row, COLUMN_COUNT};

/// Prefix for generated import batch identifiers
pub const BATCH_ID_PREFIX: &str = "LOTE-";

/// Errors raised by the import and rollback pipeline
#[derive(Debug, Error)]
pub enum ImportError {
    /// A data row has fewer columns than the fixed layout requires
    #[error("row {row}: expected at least {expected} columns, found {found}", expected = COLUMN_COUNT)]
    Structural { row: usize, found: usize },

    /// A field of a data row failed to parse or validate
    #[error("row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: FieldError,
    },

    /// Rollback requested for a batch with no matching records
    #[error("batch not found or already removed: {0}")]
    BatchNotFound(String),

    /// The uploaded file could not be read or decoded
    #[error("failed to read uploaded file: {0}")]
    Io(String),
}

/// Generate a batch identifier from the current time.
///
/// Millisecond timestamps can collide when two imports start in the same
/// millisecond; single-writer deployments make that theoretical.
pub fn generate_batch_id() -> String {
    format!("{}{}", BATCH_ID_PREFIX, chrono::Utc::now().timestamp_millis())
}
