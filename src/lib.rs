//! Wreckingball - Fleet compliance status and remediation.
//!
//! Wreckingball evaluates a fixed set of compliance checks against every
//! host in an inventory, keeps the last-known status of each (host, check)
//! pair, summarizes them on a dashboard and schedules remediation tasks for
//! hosts that are out of compliance.
//!
//! # Modules
//!
//! - [`checks`] - Status checks, status codes and the check registry
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`dashboard`] - Compliance counts and per-check host listings
//! - [`error`] - Error types and result aliases
//! - [`host`] - Host identity, snapshots and the inventory provider
//! - [`refresh`] - Scheduling re-evaluation of the fleet
//! - [`remediation`] - Validating and scheduling remediation tasks
//! - [`store`] - Last-known status table
//! - [`tasks`] - Task descriptors and the local task runner
//! - [`ui`] - Prompts, spinners, tables and terminal output
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use wreckingball::checks::{CheckKind, CheckRegistry, StatusCode};
//! use wreckingball::host::{HostId, HostSnapshot};
//! use wreckingball::store::StatusStore;
//!
//! let registry = CheckRegistry::with_builtins();
//! let store = StatusStore::new();
//!
//! let mut snapshot = HostSnapshot::new(HostId::new("1"), Utc::now());
//! snapshot.hardware_version = Some("vmx-10".to_string());
//!
//! let check = registry.get(CheckKind::HardwareVersion).unwrap();
//! store.put(check.evaluate(&snapshot));
//!
//! let value = store.get(&HostId::new("1"), CheckKind::HardwareVersion).unwrap();
//! assert_eq!(value.value, StatusCode::OutOfDate);
//! ```
//!
//! For file-based fleets, see the integration tests.

pub mod checks;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod host;
pub mod refresh;
pub mod remediation;
pub mod store;
pub mod tasks;
pub mod ui;

pub use error::{Result, WreckingballError};
