//! Host identity and provider-read facts.
//!
//! The core never talks to a hypervisor itself. It reads host identity
//! through a [`HostDirectory`] and point-in-time facts through a
//! [`SnapshotSource`]; a [`Provider`] additionally applies remediation
//! actions on behalf of a task runner.
//!
//! # Modules
//!
//! - [`inventory`] - YAML-backed inventory implementing all three traits

pub mod inventory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::Result;
use crate::tasks::RemediationAction;

pub use inventory::{Inventory, InventoryHost};

/// Stable identifier of a managed host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostId(pub String);

impl HostId {
    /// Create a new host ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for HostId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identity of one managed host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    /// Stable identifier.
    pub id: HostId,
    /// Display name, used for dashboard ordering.
    pub name: String,
    /// Provider reference (compute resource name).
    pub provider: String,
}

/// VM power state as reported by the hypervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    PoweredOn,
    PoweredOff,
    Suspended,
}

/// Guest tools installation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolsState {
    Running,
    NotRunning,
    NotInstalled,
}

/// Guest tools version status as reported by the hypervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolsVersionStatus {
    Current,
    NeedsUpgrade,
    TooOld,
    TooNew,
    Unmanaged,
    #[serde(other)]
    Unrecognized,
}

/// A point-in-time bundle of provider-read facts about one host.
///
/// Every field is optional; each status check interprets only what it
/// needs and reports `unknown` when its inputs are missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSnapshot {
    /// The host the facts were read from.
    pub host_id: HostId,

    /// When the facts were read. Becomes `evaluated_at` of every status
    /// derived from this snapshot.
    pub taken_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_state: Option<PowerState>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools_state: Option<ToolsState>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools_version_status: Option<ToolsVersionStatus>,

    /// Guest OS identifier configured on the VM.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<String>,

    /// Guest OS identifier matching the host's operating system.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_guest_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_hot_add: Option<bool>,

    /// Number of virtual CPUs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpus: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hypervisor_cores_per_socket: Option<u32>,

    /// CPU features exposed to the VM.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_features: Option<BTreeSet<String>>,

    /// CPU features offered by the hypervisor running the VM.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hypervisor_cpu_features: Option<BTreeSet<String>>,

    /// VM hardware version, e.g. `vmx-13`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hypervisor_max_hardware_version: Option<u32>,
}

impl HostSnapshot {
    /// Create an empty snapshot of a host taken at the given time.
    pub fn new(host_id: HostId, taken_at: DateTime<Utc>) -> Self {
        Self {
            host_id,
            taken_at,
            ..Default::default()
        }
    }

    /// Whether the VM is known to be powered on.
    pub fn is_powered_on(&self) -> bool {
        self.power_state == Some(PowerState::PoweredOn)
    }
}

/// Resolves host identity.
pub trait HostDirectory: Send + Sync {
    /// Look up a host by ID.
    fn host(&self, id: &HostId) -> Option<Host>;

    /// All known hosts.
    fn hosts(&self) -> Vec<Host>;
}

/// Reads provider facts for a host.
pub trait SnapshotSource: Send + Sync {
    /// Take a snapshot of the host.
    ///
    /// Fails with `SnapshotUnavailable` when the host is unreachable.
    fn snapshot(&self, id: &HostId) -> Result<HostSnapshot>;
}

/// Writes hypervisor state on behalf of a remediation task.
pub trait Provider: SnapshotSource {
    /// Apply a remediation action to a host.
    fn apply(&self, id: &HostId, action: &RemediationAction) -> Result<()>;
}
