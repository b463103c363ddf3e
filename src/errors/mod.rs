//! Domain-specific error types for the open-data connector
//!
//! # Error Categories
//!
//! - **ExportError**: schema inference, row flattening and output encoding
//! - **SourceError**: loading open-data entries, forms and submissions
//! - **ConfigError**: reading and validating the service configuration
//!
//! # Examples
//!
//! ```rust
//! use opendata::errors::{ExportError, SourceError};
//!
//! let err = ExportError::MalformedRepeat {
//!     instance_id: 7,
//!     path: "children".to_string(),
//! };
//! assert_eq!(err.error_code(), "MALFORMED_REPEAT");
//!
//! let err = SourceError::FormNotFound("tutorial".to_string());
//! assert!(err.is_not_found());
//! ```

pub mod config;
pub mod export;
pub mod source;

pub use config::ConfigError;
pub use export::ExportError;
pub use source::SourceError;

/// Result type alias for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type alias for submission source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type alias for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;
