//! Compliance status checks.
//!
//! Each check evaluates a single host snapshot against one compliance
//! dimension and produces a [`StatusValue`]. Checks are registered in a
//! [`CheckRegistry`], which the dashboard and the orchestrators consult.
//!
//! # Modules
//!
//! - [`registry`] - Build-then-freeze registry of checks
//! - [`status`] - Status codes, classification and status values
//! - [`tools`], [`operatingsystem`], [`cpu_hot_add`], [`spectre_v2`],
//!   [`hardware_version`] - The built-in checks

pub mod cpu_hot_add;
pub mod hardware_version;
pub mod operatingsystem;
pub mod registry;
pub mod spectre_v2;
pub mod status;
pub mod tools;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, WreckingballError};
use crate::host::{Host, HostSnapshot};
use crate::tasks::{RemediationAction, TaskDescriptor};

pub use cpu_hot_add::CpuHotAddCheck;
pub use hardware_version::HardwareVersionCheck;
pub use operatingsystem::OperatingsystemCheck;
pub use registry::{CheckRegistry, CheckRegistryBuilder};
pub use spectre_v2::SpectreV2Check;
pub use status::{Classification, Severity, StatusCode, StatusValue, UnknownPolicy};
pub use tools::ToolsCheck;

/// The closed set of compliance dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CheckKind {
    #[serde(rename = "tools")]
    Tools,
    #[serde(rename = "os-compat")]
    OsCompat,
    #[serde(rename = "cpu-hot-add")]
    CpuHotAdd,
    #[serde(rename = "spectre-v2")]
    SpectreV2,
    #[serde(rename = "hardware-version")]
    HardwareVersion,
}

impl CheckKind {
    /// Every kind, in default registration order.
    pub const ALL: [CheckKind; 5] = [
        CheckKind::Tools,
        CheckKind::OsCompat,
        CheckKind::CpuHotAdd,
        CheckKind::SpectreV2,
        CheckKind::HardwareVersion,
    ];

    /// The stable slug used in configuration, storage and the CLI.
    pub fn slug(&self) -> &'static str {
        match self {
            CheckKind::Tools => "tools",
            CheckKind::OsCompat => "os-compat",
            CheckKind::CpuHotAdd => "cpu-hot-add",
            CheckKind::SpectreV2 => "spectre-v2",
            CheckKind::HardwareVersion => "hardware-version",
        }
    }

    /// Dense index into per-kind tables.
    pub fn index(&self) -> usize {
        match self {
            CheckKind::Tools => 0,
            CheckKind::OsCompat => 1,
            CheckKind::CpuHotAdd => 2,
            CheckKind::SpectreV2 => 3,
            CheckKind::HardwareVersion => 4,
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for CheckKind {
    type Err = WreckingballError;

    fn from_str(s: &str) -> Result<Self> {
        CheckKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| WreckingballError::UnknownKind {
                kind: s.to_string(),
            })
    }
}

/// A status check for one compliance dimension.
///
/// Implementations must be pure: `evaluate` only looks at the snapshot it
/// is given, so the same snapshot always yields the same status.
pub trait StatusCheck: Send + Sync {
    /// The dimension this check evaluates.
    fn kind(&self) -> CheckKind;

    /// Human-readable caption for dashboards.
    fn label(&self) -> &str;

    /// Every status code this check can produce.
    fn valid_values(&self) -> &[StatusCode];

    /// How `unknown` results are classified.
    fn unknown_policy(&self) -> UnknownPolicy {
        UnknownPolicy::Unknown
    }

    /// Evaluate a host snapshot.
    fn evaluate(&self, snapshot: &HostSnapshot) -> StatusValue;

    /// Whether non-compliant results of this check can be remediated.
    fn supports_remediation(&self) -> bool {
        false
    }

    /// The action a remediation task performs. Only called for remediable
    /// checks.
    fn remediation_action(&self) -> Option<RemediationAction> {
        None
    }

    /// Severity of a non-compliant code.
    fn severity_of(&self, _code: StatusCode) -> Severity {
        Severity::Error
    }

    /// Codes that count as non-compliant.
    fn non_compliant_values(&self) -> Vec<StatusCode> {
        self.valid_values()
            .iter()
            .copied()
            .filter(|code| self.classify(*code) == Classification::NonCompliant)
            .collect()
    }

    /// Classify a status code.
    fn classify(&self, code: StatusCode) -> Classification {
        match code {
            StatusCode::Ok | StatusCode::NotApplicable => Classification::Compliant,
            StatusCode::Unknown => self.unknown_policy().classify(),
            _ => Classification::NonCompliant,
        }
    }

    /// Display severity of a status code.
    fn severity(&self, code: StatusCode) -> Severity {
        match self.classify(code) {
            Classification::Compliant => Severity::Ok,
            Classification::Unknown => Severity::Warning,
            Classification::NonCompliant => self.severity_of(code),
        }
    }

    /// Build the remediation task for a host's current status.
    ///
    /// This is the single eligibility gate: it fails with `NotRemediable`
    /// when the check cannot remediate or the status is compliant.
    fn build_remediation_task(&self, host: &Host, current: &StatusValue) -> Result<TaskDescriptor> {
        let not_remediable = |reason: String| WreckingballError::NotRemediable {
            host: host.id.to_string(),
            kind: self.kind().to_string(),
            reason,
        };

        if !self.supports_remediation() {
            return Err(not_remediable(format!(
                "{} does not support remediation",
                self.label()
            )));
        }
        if current.check_kind != self.kind() || current.host_id != host.id {
            return Err(not_remediable(
                "status belongs to a different host or check".to_string(),
            ));
        }
        if self.classify(current.value) != Classification::NonCompliant {
            return Err(not_remediable(format!("status is {}", current.value)));
        }
        let action = self
            .remediation_action()
            .ok_or_else(|| not_remediable("no remediation action defined".to_string()))?;

        Ok(TaskDescriptor::Remediate {
            host: host.clone(),
            check_kind: self.kind(),
            action,
            issued_against: current.clone(),
        })
    }
}
