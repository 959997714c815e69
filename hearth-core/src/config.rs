//! Global hearth configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Global configuration at ~/.config/hearth/config.toml
///
/// Per-calendar configuration (feed url, color, sync frequency) lives in
/// the store's `calendars` table instead.
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct HearthConfig {
    /// Where the persisted tables live. Defaults to the platform data dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl HearthConfig {
    pub fn config_path() -> StoreResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| StoreError::Config("Could not determine config directory".into()))?
            .join("hearth");

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> StoreResult<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        toml::from_str(&content).map_err(|e| StoreError::Config(e.to_string()))
    }

    pub fn save(&self) -> StoreResult<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| StoreError::Config(e.to_string()))?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Resolved data directory for the persisted tables.
    pub fn data_path(&self) -> StoreResult<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|d| d.join("hearth"))
                .ok_or_else(|| StoreError::Config("Could not determine data directory".into())),
        }
    }
}
