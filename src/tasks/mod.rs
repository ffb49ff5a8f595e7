//! Task descriptors and the task runner contract.
//!
//! The core never executes long-running work itself. Orchestrators build a
//! [`TaskDescriptor`] and hand it to a [`TaskRunner`], which returns a
//! [`TaskHandle`] immediately and later writes results back through the
//! status store.
//!
//! # Modules
//!
//! - [`local`] - In-process runner used by the CLI and tests

pub mod local;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::checks::{CheckKind, StatusValue};
use crate::error::Result;
use crate::host::{Host, HostId};

pub use local::{
    ExecutionContext, LocalRunner, RefreshReport, RunnerProgress, SkippedHost, TaskOutcome,
    TaskResult, DEFAULT_MAX_QUEUED_TASKS,
};

/// Identifier assigned to a submitted task by its runner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a submitted task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHandle {
    pub id: TaskId,
    pub submitted_at: DateTime<Utc>,
}

/// Corrective action performed by a remediation task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RemediationAction {
    /// Upgrade the VM hardware version.
    UpgradeHardwareVersion { target: u32 },
    /// Set the VM guest id to the one matching the host's operating system.
    CorrectGuestOs,
    /// Turn CPU hot-add off.
    DisableCpuHotAdd,
    /// Power the VM off and on so it picks up new CPU features.
    PowerCycle,
}

impl RemediationAction {
    /// Whether the VM has to be powered off while the action runs.
    pub fn requires_power_off(&self) -> bool {
        // A power cycle is a restart, not a reconfiguration.
        !matches!(self, RemediationAction::PowerCycle)
    }

    /// Human-readable description.
    pub fn describe(&self) -> String {
        match self {
            RemediationAction::UpgradeHardwareVersion { target } => {
                format!("Upgrade hardware version to vmx-{}", target)
            }
            RemediationAction::CorrectGuestOs => "Correct guest operating system".to_string(),
            RemediationAction::DisableCpuHotAdd => "Disable CPU hot-add".to_string(),
            RemediationAction::PowerCycle => "Power cycle VM".to_string(),
        }
    }
}

/// Which hosts a refresh re-evaluates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshScope {
    All,
    Hosts(Vec<HostId>),
}

impl fmt::Display for RefreshScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshScope::All => write!(f, "all hosts"),
            RefreshScope::Hosts(hosts) if hosts.len() == 1 => write!(f, "host {}", hosts[0]),
            RefreshScope::Hosts(hosts) => write!(f, "{} hosts", hosts.len()),
        }
    }
}

/// Work handed to a task runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskDescriptor {
    /// Correct one non-compliant status of one host.
    Remediate {
        host: Host,
        check_kind: CheckKind,
        action: RemediationAction,
        /// The status the remediation was issued against.
        issued_against: StatusValue,
    },
    /// Re-evaluate every registered check for the hosts in scope.
    Refresh { scope: RefreshScope },
}

impl TaskDescriptor {
    /// Short human-readable summary.
    pub fn summary(&self) -> String {
        match self {
            TaskDescriptor::Remediate {
                host,
                check_kind,
                action,
                ..
            } => format!("{} on {} ({})", action.describe(), host.name, check_kind),
            TaskDescriptor::Refresh { scope } => format!("Refresh status of {}", scope),
        }
    }
}

/// Accepts task descriptors for asynchronous execution.
pub trait TaskRunner: Send + Sync {
    /// Submit a task.
    ///
    /// Fails with `TaskSubmission` when the runner rejects the task.
    /// Implementations must not retry internally.
    fn submit(&self, descriptor: TaskDescriptor) -> Result<TaskHandle>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_off_requirements() {
        assert!(RemediationAction::UpgradeHardwareVersion { target: 14 }.requires_power_off());
        assert!(RemediationAction::CorrectGuestOs.requires_power_off());
        assert!(RemediationAction::DisableCpuHotAdd.requires_power_off());
        assert!(!RemediationAction::PowerCycle.requires_power_off());
    }

    #[test]
    fn action_descriptions() {
        assert_eq!(
            RemediationAction::UpgradeHardwareVersion { target: 14 }.describe(),
            "Upgrade hardware version to vmx-14"
        );
        assert_eq!(RemediationAction::PowerCycle.describe(), "Power cycle VM");
    }

    #[test]
    fn refresh_scope_display() {
        assert_eq!(RefreshScope::All.to_string(), "all hosts");
        assert_eq!(
            RefreshScope::Hosts(vec!["h1".into()]).to_string(),
            "host h1"
        );
        assert_eq!(
            RefreshScope::Hosts(vec!["h1".into(), "h2".into()]).to_string(),
            "2 hosts"
        );
    }

    #[test]
    fn refresh_descriptor_summary() {
        let descriptor = TaskDescriptor::Refresh {
            scope: RefreshScope::All,
        };
        assert_eq!(descriptor.summary(), "Refresh status of all hosts");
    }

    #[test]
    fn action_serializes_with_tag() {
        let json = serde_json::to_string(&RemediationAction::UpgradeHardwareVersion { target: 14 })
            .unwrap();
        assert_eq!(json, r#"{"action":"upgrade_hardware_version","target":14}"#);
    }
}
