//! Guest tools check.

use super::{CheckKind, Severity, StatusCheck, StatusCode, StatusValue, UnknownPolicy};
use crate::host::{HostSnapshot, ToolsState, ToolsVersionStatus};

/// Checks that guest tools are installed, running and current.
///
/// Tools can only be upgraded from inside the guest, so this check does not
/// support remediation.
#[derive(Debug, Default)]
pub struct ToolsCheck {
    unknown_policy: UnknownPolicy,
}

impl ToolsCheck {
    pub fn new(unknown_policy: UnknownPolicy) -> Self {
        Self { unknown_policy }
    }
}

impl StatusCheck for ToolsCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Tools
    }

    fn label(&self) -> &str {
        "VMware Tools"
    }

    fn valid_values(&self) -> &[StatusCode] {
        &[
            StatusCode::Ok,
            StatusCode::OutOfDate,
            StatusCode::NotRunning,
            StatusCode::NotInstalled,
            StatusCode::Unknown,
            StatusCode::NotApplicable,
        ]
    }

    fn unknown_policy(&self) -> UnknownPolicy {
        self.unknown_policy
    }

    fn severity_of(&self, code: StatusCode) -> Severity {
        match code {
            StatusCode::NotInstalled => Severity::Error,
            _ => Severity::Warning,
        }
    }

    fn evaluate(&self, snapshot: &HostSnapshot) -> StatusValue {
        let (value, detail) = if snapshot.power_state.is_some() && !snapshot.is_powered_on() {
            (StatusCode::NotApplicable, "VM is not powered on")
        } else {
            match (snapshot.tools_state, snapshot.tools_version_status) {
                (Some(ToolsState::NotInstalled), _) => {
                    (StatusCode::NotInstalled, "Tools are not installed")
                }
                (Some(ToolsState::NotRunning), _) => {
                    (StatusCode::NotRunning, "Tools are not running")
                }
                (Some(ToolsState::Running), Some(version)) => match version {
                    ToolsVersionStatus::NeedsUpgrade | ToolsVersionStatus::TooOld => {
                        (StatusCode::OutOfDate, "Tools need to be upgraded")
                    }
                    ToolsVersionStatus::Current
                    | ToolsVersionStatus::TooNew
                    | ToolsVersionStatus::Unmanaged => (StatusCode::Ok, ""),
                    ToolsVersionStatus::Unrecognized => {
                        (StatusCode::Unknown, "Unrecognized tools version status")
                    }
                },
                (Some(ToolsState::Running), None) => {
                    (StatusCode::Unknown, "Tools version status not reported")
                }
                (None, _) => (StatusCode::Unknown, "Tools state not reported"),
            }
        };

        StatusValue::from_snapshot(snapshot, self.kind(), value, detail)
    }
}
