//! VM hardware version check.

use regex::Regex;
use std::sync::LazyLock;

use super::{CheckKind, StatusCheck, StatusCode, StatusValue, UnknownPolicy};
use crate::host::HostSnapshot;
use crate::tasks::RemediationAction;

static VMX_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^vmx-(\d+)$").expect("VMX_VERSION must compile"));

/// Default minimum hardware version.
pub const DEFAULT_MIN_HARDWARE_VERSION: u32 = 13;

/// Parse a hardware version string such as `vmx-13`.
pub fn parse_hardware_version(version: &str) -> Option<u32> {
    VMX_VERSION
        .captures(version.trim())
        .and_then(|caps| caps[1].parse().ok())
}

/// Checks that the VM hardware version is not older than a configured
/// minimum.
#[derive(Debug)]
pub struct HardwareVersionCheck {
    min_version: u32,
    target_version: u32,
    unknown_policy: UnknownPolicy,
}

impl HardwareVersionCheck {
    /// Create a check. Upgrades go to `target_version`, or to the minimum
    /// when no target is given.
    pub fn new(min_version: u32, target_version: Option<u32>, unknown_policy: UnknownPolicy) -> Self {
        Self {
            min_version,
            target_version: target_version.unwrap_or(min_version).max(min_version),
            unknown_policy,
        }
    }

    pub fn min_version(&self) -> u32 {
        self.min_version
    }

    pub fn target_version(&self) -> u32 {
        self.target_version
    }
}

impl Default for HardwareVersionCheck {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_HARDWARE_VERSION, None, UnknownPolicy::Unknown)
    }
}

impl StatusCheck for HardwareVersionCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::HardwareVersion
    }

    fn label(&self) -> &str {
        "Hardware Version"
    }

    fn valid_values(&self) -> &[StatusCode] {
        &[StatusCode::Ok, StatusCode::OutOfDate, StatusCode::Unknown]
    }

    fn unknown_policy(&self) -> UnknownPolicy {
        self.unknown_policy
    }

    fn supports_remediation(&self) -> bool {
        true
    }

    fn remediation_action(&self) -> Option<RemediationAction> {
        Some(RemediationAction::UpgradeHardwareVersion {
            target: self.target_version,
        })
    }

    fn evaluate(&self, snapshot: &HostSnapshot) -> StatusValue {
        let parsed = snapshot.hardware_version.as_deref().map(|v| (v, parse_hardware_version(v)));

        let (value, detail) = match parsed {
            None => (
                StatusCode::Unknown,
                "Hardware version not reported".to_string(),
            ),
            Some((raw, None)) => (
                StatusCode::Unknown,
                format!("Unrecognized hardware version '{}'", raw),
            ),
            Some((raw, Some(version))) if version < self.min_version => {
                // Out of date only while the upgrade target is reachable.
                match snapshot.hypervisor_max_hardware_version {
                    Some(max) if max < self.target_version => (
                        StatusCode::Ok,
                        format!(
                            "{} is older than vmx-{} but the hypervisor supports at most vmx-{}",
                            raw, self.min_version, max
                        ),
                    ),
                    _ => (
                        StatusCode::OutOfDate,
                        format!("{} is older than vmx-{}", raw, self.min_version),
                    ),
                }
            }
            Some(_) => (StatusCode::Ok, String::new()),
        };

        StatusValue::from_snapshot(snapshot, self.kind(), value, detail)
    }
}
