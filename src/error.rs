//! Error types for healthlog

use thiserror::Error;

/// Errors that can occur while reading or writing the journal.
///
/// Derivation routines never fail on data content; missing or malformed
/// fields degrade to absent values. Only storage I/O and serialization
/// surface as errors.
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid date key (expected YYYY-MM-DD): {0}")]
    InvalidDateKey(String),
}
