//! Errors raised by submission stores.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    /// No open-data entry is registered under this uuid
    #[error("Open data entry not found: {0}")]
    OpenDataNotFound(String),

    /// The entry exists but has been switched off
    #[error("Open data entry is inactive: {0}")]
    OpenDataInactive(String),

    /// The form backing an entry does not exist
    #[error("Form not found: {0}")]
    FormNotFound(String),

    /// The form definition document could not be parsed
    #[error("Invalid form definition '{path}': {reason}")]
    InvalidForm { path: PathBuf, reason: String },

    /// One stored submission could not be parsed
    #[error("Invalid submission at {path}:{line}: {reason}")]
    InvalidSubmission {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    /// Check if this is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SourceError::OpenDataNotFound(_)
                | SourceError::OpenDataInactive(_)
                | SourceError::FormNotFound(_)
        )
    }

    /// Check if this is a client error (400-series)
    pub fn is_client_error(&self) -> bool {
        self.is_not_found()
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            SourceError::OpenDataNotFound(_) => "OPEN_DATA_NOT_FOUND",
            SourceError::OpenDataInactive(_) => "OPEN_DATA_INACTIVE",
            SourceError::FormNotFound(_) => "FORM_NOT_FOUND",
            SourceError::InvalidForm { .. } => "INVALID_FORM",
            SourceError::InvalidSubmission { .. } => "INVALID_SUBMISSION",
            SourceError::Io(_) => "IO_ERROR",
        }
    }
}
