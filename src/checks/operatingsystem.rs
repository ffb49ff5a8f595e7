//! Guest operating system compatibility check.

use super::{CheckKind, StatusCheck, StatusCode, StatusValue, UnknownPolicy};
use crate::host::HostSnapshot;
use crate::tasks::RemediationAction;

/// Checks that the guest OS configured on the VM matches the host's
/// operating system.
#[derive(Debug, Default)]
pub struct OperatingsystemCheck {
    unknown_policy: UnknownPolicy,
}

impl OperatingsystemCheck {
    pub fn new(unknown_policy: UnknownPolicy) -> Self {
        Self { unknown_policy }
    }
}

impl StatusCheck for OperatingsystemCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::OsCompat
    }

    fn label(&self) -> &str {
        "Operating System"
    }

    fn valid_values(&self) -> &[StatusCode] {
        &[
            StatusCode::Ok,
            StatusCode::Mismatch,
            StatusCode::Unknown,
            StatusCode::NotApplicable,
        ]
    }

    fn unknown_policy(&self) -> UnknownPolicy {
        self.unknown_policy
    }

    fn supports_remediation(&self) -> bool {
        true
    }

    fn remediation_action(&self) -> Option<RemediationAction> {
        Some(RemediationAction::CorrectGuestOs)
    }

    fn evaluate(&self, snapshot: &HostSnapshot) -> StatusValue {
        let (value, detail) = match (&snapshot.expected_guest_id, &snapshot.guest_id) {
            (None, _) => (
                StatusCode::NotApplicable,
                "Operating system has no guest id mapping".to_string(),
            ),
            (Some(_), None) => (
                StatusCode::Unknown,
                "Guest id not reported".to_string(),
            ),
            (Some(expected), Some(actual)) if expected == actual => (StatusCode::Ok, String::new()),
            (Some(expected), Some(actual)) => (
                StatusCode::Mismatch,
                format!("VM is configured as '{}', expected '{}'", actual, expected),
            ),
        };

        StatusValue::from_snapshot(snapshot, self.kind(), value, detail)
    }
}
