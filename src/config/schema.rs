//! Configuration schema definitions for Wreckingball.
//!
//! These structs map to `.wreckingball/config.yml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::checks::hardware_version::DEFAULT_MIN_HARDWARE_VERSION;
use crate::checks::{CheckKind, UnknownPolicy};
use crate::tasks::DEFAULT_MAX_QUEUED_TASKS;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WreckingballConfig {
    /// Global settings
    pub settings: Settings,

    /// Checks to register, in dashboard order
    pub checks: Vec<String>,

    /// Per-check classification overrides, keyed by check slug
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub classification: BTreeMap<String, KindClassification>,
}

impl Default for WreckingballConfig {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            checks: default_checks(),
            classification: BTreeMap::new(),
        }
    }
}

impl WreckingballConfig {
    /// How `unknown` results of a check are counted.
    pub fn unknown_policy(&self, kind: CheckKind) -> UnknownPolicy {
        self.classification
            .get(kind.slug())
            .map(|c| c.unknown)
            .unwrap_or_default()
    }
}

/// Global settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Hardware versions below this are out of date
    pub min_hardware_version: u32,

    /// Version remediation upgrades to (defaults to the minimum)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_hardware_version: Option<u32>,

    /// Inventory file, relative to `.wreckingball/`
    pub inventory: PathBuf,

    /// Status table file, relative to `.wreckingball/`
    pub status_store: PathBuf,

    /// Bound on tasks waiting in the local runner
    pub max_queued_tasks: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_hardware_version: DEFAULT_MIN_HARDWARE_VERSION,
            target_hardware_version: None,
            inventory: PathBuf::from("inventory.yml"),
            status_store: PathBuf::from("status.yml"),
            max_queued_tasks: DEFAULT_MAX_QUEUED_TASKS,
        }
    }
}

/// Classification override for one check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindClassification {
    /// How `unknown` results are counted
    pub unknown: UnknownPolicy,
}

fn default_checks() -> Vec<String> {
    CheckKind::ALL.iter().map(|k| k.slug().to_string()).collect()
}
