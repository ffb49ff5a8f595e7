//! Status table persistence.
//!
//! The table is stored as YAML, one entry per (host, check) key. Saving uses
//! write-to-temp-then-rename so a crash never leaves a half-written table.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::StatusStore;
use crate::checks::StatusValue;
use crate::error::{Result, WreckingballError};

/// On-disk layout of the status table.
#[derive(Debug, Serialize, Deserialize)]
struct StatusTable {
    version: u32,
    #[serde(default)]
    statuses: Vec<StatusValue>,
}

impl StatusTable {
    const CURRENT_VERSION: u32 = 1;
}

impl StatusStore {
    /// Load a store from disk. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        let store = Self::new();
        if !path.exists() {
            tracing::debug!("No status table at {}, starting empty", path.display());
            return Ok(store);
        }

        let content = fs::read_to_string(path)?;
        let table: StatusTable =
            serde_yaml::from_str(&content).map_err(|e| WreckingballError::ConfigParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if table.version > StatusTable::CURRENT_VERSION {
            return Err(WreckingballError::ConfigParseError {
                path: path.to_path_buf(),
                message: format!("unsupported status table version {}", table.version),
            });
        }

        for value in table.statuses {
            store.put(value);
        }
        Ok(store)
    }

    /// Save the store to disk atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let table = StatusTable {
            version: StatusTable::CURRENT_VERSION,
            statuses: self.snapshot(),
        };
        let content = serde_yaml::to_string(&table).map_err(|e| {
            WreckingballError::ConfigValidationError {
                message: format!("Failed to serialize status table: {}", e),
            }
        })?;

        let temp_path = path.with_extension("yml.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        tracing::debug!("Saved {} statuses to {}", table.statuses.len(), path.display());
        Ok(())
    }
}
