//! Configuration loading, parsing, and validation for Wreckingball.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use wreckingball::config::{load_config, validate};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".wreckingball");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("config.yml"), "settings:\n  min_hardware_version: 14\n").unwrap();
//!
//! let config = load_config(temp.path(), None).unwrap();
//! validate(&config).unwrap();
//! assert_eq!(config.settings.min_hardware_version, 14);
//! ```
//!
//! # Configuration File Location
//!
//! `.wreckingball/config.yml` in the project root. Inventory and status
//! files live next to it unless the settings point elsewhere.

pub mod loader;
pub mod schema;
pub mod validator;

pub use schema::{KindClassification, Settings, WreckingballConfig};

pub use loader::{
    config_path, find_project_root, load_config, load_config_file, parse_config, ProjectPaths,
    CONFIG_DIR, CONFIG_FILE,
};

pub use validator::{validate, validate_config, ValidationError};
