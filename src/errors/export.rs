//! Errors raised while inferring schemas, flattening submissions and encoding rows.

use thiserror::Error;

use super::SourceError;

#[derive(Error, Debug)]
pub enum ExportError {
    /// A repeat group value was present but was not a list
    #[error("Submission {instance_id}: repeat group '{path}' does not hold a list")]
    MalformedRepeat { instance_id: i64, path: String },

    /// A repeat group element was not an object
    #[error("Submission {instance_id}: element {ordinal} of repeat group '{path}' is not an object")]
    MalformedRepeatElement {
        instance_id: i64,
        path: String,
        ordinal: u64,
    },

    /// The submission has no usable `_id`
    #[error("Submission is missing an integer _id")]
    MissingInstanceId,

    /// Row ids are built from non-negative instance ids only
    #[error("Submission _id {0} is negative")]
    NegativeInstanceId(i64),

    /// Requested table alias is not part of the schema
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Failure reading from the submission store
    #[error(transparent)]
    Source(#[from] SourceError),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    /// Check if this is a client error (400-series)
    pub fn is_client_error(&self) -> bool {
        match self {
            ExportError::UnknownTable(_) => true,
            ExportError::Source(err) => err.is_client_error(),
            _ => false,
        }
    }

    /// Check if this is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, ExportError::Source(err) if err.is_not_found())
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ExportError::MalformedRepeat { .. } => "MALFORMED_REPEAT",
            ExportError::MalformedRepeatElement { .. } => "MALFORMED_REPEAT",
            ExportError::MissingInstanceId => "MISSING_INSTANCE_ID",
            ExportError::NegativeInstanceId(_) => "INVALID_INSTANCE_ID",
            ExportError::UnknownTable(_) => "UNKNOWN_TABLE",
            ExportError::Source(err) => err.error_code(),
            ExportError::Serialization(_) => "SERIALIZATION_ERROR",
            ExportError::Csv(_) => "CSV_ERROR",
            ExportError::Io(_) => "IO_ERROR",
        }
    }
}
