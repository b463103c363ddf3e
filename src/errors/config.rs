//! Configuration loading errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Cannot read configuration '{path}': {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for the expected shape
    #[error("Invalid configuration '{path}': {source}")]
    Invalid {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// Two open-data entries share a uuid
    #[error("Duplicate open data uuid: {0}")]
    DuplicateUuid(uuid::Uuid),

    /// The data directory does not exist
    #[error("Data directory '{0}' does not exist")]
    MissingDataDir(PathBuf),
}
