//! Configuration file discovery and loading.

use crate::config::schema::WreckingballConfig;
use crate::error::{Result, WreckingballError};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding configuration and data files.
pub const CONFIG_DIR: &str = ".wreckingball";

/// Configuration file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.yml";

/// Locations of the files a project uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    /// Project root
    pub root: PathBuf,
    /// `.wreckingball/config.yml`
    pub config: PathBuf,
    /// Inventory file
    pub inventory: PathBuf,
    /// Status table file
    pub status_store: PathBuf,
}

impl ProjectPaths {
    /// Resolve file locations for a project and its configuration.
    ///
    /// Relative data paths are resolved against `.wreckingball/`.
    pub fn resolve(project_root: &Path, config: &WreckingballConfig) -> Self {
        let dir = project_root.join(CONFIG_DIR);
        Self {
            root: project_root.to_path_buf(),
            config: dir.join(CONFIG_FILE),
            inventory: dir.join(&config.settings.inventory),
            status_store: dir.join(&config.settings.status_store),
        }
    }
}

/// Path of the project config file.
pub fn config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Find the project root by walking up from `start`.
///
/// Looks for:
/// 1. `.wreckingball` directory (primary indicator)
/// 2. `.git` directory (fallback)
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(CONFIG_DIR).is_dir() {
            return Some(current);
        }

        if current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<WreckingballConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            WreckingballError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            WreckingballError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into a config.
///
/// An empty document yields the defaults.
pub fn parse_config(content: &str, source_path: &Path) -> Result<WreckingballConfig> {
    if content.trim().is_empty() {
        return Ok(WreckingballConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| WreckingballError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load config with optional path override.
///
/// Without an override, loads `.wreckingball/config.yml` under the project
/// root.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<WreckingballConfig> {
    match config_override {
        Some(path) => load_config_file(path),
        None => load_config_file(&config_path(project_root)),
    }
}
