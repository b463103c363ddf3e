use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::{ConfigError, ConfigResult};
use crate::source::{DirectorySource, OpenDataEntry};

/// ## Structure
/// Service configuration file (YAML).
///
/// ```text
/// ServiceConfig
///   ├── base_url: String          prefix for attachment download links
///   ├── data_dir: PathBuf         relative to the configuration file
///   └── open_data: Vec<OpenDataEntry>
///       ├── uuid
///       ├── name
///       ├── form                  directory name under data_dir
///       └── active
/// ```
///
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ServiceConfig {
    #[serde(default)]
    pub base_url: String,
    pub data_dir: PathBuf,
    #[serde(default)]
    pub open_data: Vec<OpenDataEntry>,
}

impl ServiceConfig {
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: ServiceConfig =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Invalid {
                path: path.to_path_buf(),
                source,
            })?;

        if config.data_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.data_dir = parent.join(&config.data_dir);
            }
        }
        config.validate()?;

        info!(
            "Loaded configuration from {} ({} open data entries)",
            path.display(),
            config.open_data.len()
        );
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.data_dir.is_dir() {
            return Err(ConfigError::MissingDataDir(self.data_dir.clone()));
        }

        let mut seen = HashSet::new();
        for entry in &self.open_data {
            if !seen.insert(entry.uuid) {
                return Err(ConfigError::DuplicateUuid(entry.uuid));
            }
        }
        Ok(())
    }

    pub fn source(&self) -> DirectorySource {
        DirectorySource::new(&self.data_dir, self.open_data.clone())
    }
}
