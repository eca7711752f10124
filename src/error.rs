//! Error types for document conversion
//!
//! Malformed input never surfaces here: depth overflow, empty tables, missing
//! attributes and unresolved substitutions degrade locally and are reported as
//! warnings on the successful result. Only invalid configuration, I/O at the
//! edges, and faults caught while converting a single document become errors.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for conversion operations
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Error types for conversion operations
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Options failed validation before any conversion started
    #[error("Invalid conversion options: {0}")]
    InvalidOptions(String),

    /// Source markup could not be turned into a document tree
    #[error("Failed to parse source markup: {0}")]
    Parse(String),

    /// An internal fault escaped a single document's conversion
    #[error("Conversion of {document} failed: {message}")]
    Internal { document: String, message: String },

    /// The caller's wall-clock budget expired before the result arrived
    #[error("Conversion timed out after {0:?}")]
    Timeout(Duration),

    /// The blocking conversion task could not be joined
    #[error("Conversion task failed: {0}")]
    TaskJoin(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Options file was not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConvertError {
    /// Whether this error came from a fault inside one document rather than
    /// from the caller's setup.
    #[must_use]
    pub fn is_document_failure(&self) -> bool {
        matches!(self, ConvertError::Internal { .. } | ConvertError::Timeout(_))
    }

    /// Build an `Internal` error from a caught panic payload.
    pub(crate) fn from_panic(document: &str, payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        ConvertError::Internal {
            document: document.to_string(),
            message,
        }
    }
}
