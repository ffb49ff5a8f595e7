//! Spectre variant 2 mitigation check.
//!
//! A VM only sees new CPU features after a full power cycle, so a patched
//! hypervisor can still run VMs without the mitigation.

use super::{CheckKind, StatusCheck, StatusCode, StatusValue, UnknownPolicy};
use crate::host::HostSnapshot;
use crate::tasks::RemediationAction;

/// CPU features required for the mitigation.
pub const MITIGATION_FEATURES: [&str; 3] = ["cpuid.IBRS", "cpuid.IBPB", "cpuid.STIBP"];

#[derive(Debug, Default)]
pub struct SpectreV2Check {
    unknown_policy: UnknownPolicy,
}

impl SpectreV2Check {
    pub fn new(unknown_policy: UnknownPolicy) -> Self {
        Self { unknown_policy }
    }
}

impl StatusCheck for SpectreV2Check {
    fn kind(&self) -> CheckKind {
        CheckKind::SpectreV2
    }

    fn label(&self) -> &str {
        "Spectre v2 Guest Mitigation"
    }

    fn valid_values(&self) -> &[StatusCode] {
        &[
            StatusCode::Ok,
            StatusCode::Missing,
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
        Some(RemediationAction::PowerCycle)
    }

    fn evaluate(&self, snapshot: &HostSnapshot) -> StatusValue {
        let (value, detail) = match (&snapshot.hypervisor_cpu_features, &snapshot.cpu_features) {
            (None, _) => (
                StatusCode::Unknown,
                "Hypervisor CPU features not reported".to_string(),
            ),
            (Some(offered), _)
                if !MITIGATION_FEATURES
                    .iter()
                    .all(|feature| offered.contains(*feature)) =>
            {
                (
                    StatusCode::NotApplicable,
                    "Hypervisor does not offer the mitigation".to_string(),
                )
            }
            (Some(_), None) => (
                StatusCode::Unknown,
                "VM CPU features not reported".to_string(),
            ),
            (Some(_), Some(exposed)) => {
                let missing: Vec<&str> = MITIGATION_FEATURES
                    .iter()
                    .copied()
                    .filter(|feature| !exposed.contains(*feature))
                    .collect();
                if missing.is_empty() {
                    (StatusCode::Ok, String::new())
                } else {
                    (
                        StatusCode::Missing,
                        format!("VM lacks {}; power cycle required", missing.join(", ")),
                    )
                }
            }
        };

        StatusValue::from_snapshot(snapshot, self.kind(), value, detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeSet;

    fn features(names: &[&str]) -> Option<BTreeSet<String>> {
        Some(names.iter().map(|s| s.to_string()).collect())
    }

    fn snapshot(
        hypervisor: Option<BTreeSet<String>>,
        vm: Option<BTreeSet<String>>,
    ) -> HostSnapshot {
        let mut snapshot = HostSnapshot::new(
            "vm4".into(),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        );
        snapshot.hypervisor_cpu_features = hypervisor;
        snapshot.cpu_features = vm;
        snapshot
    }

    #[test]
    fn exposed_features_are_ok() {
        let status = SpectreV2Check::default()
            .evaluate(&snapshot(features(&MITIGATION_FEATURES), features(&MITIGATION_FEATURES)));
        assert_eq!(status.value, StatusCode::Ok);
    }

    #[test]
    fn missing_features_are_reported() {
        let status = SpectreV2Check::default().evaluate(&snapshot(
            features(&MITIGATION_FEATURES),
            features(&["cpuid.IBRS"]),
        ));
        assert_eq!(status.value, StatusCode::Missing);
        assert!(status.detail.contains("cpuid.IBPB"));
        assert!(status.detail.contains("cpuid.STIBP"));
        assert!(!status.detail.contains("cpuid.IBRS,"));
    }

    #[test]
    fn unpatched_hypervisor_is_not_applicable() {
        let status = SpectreV2Check::default()
            .evaluate(&snapshot(features(&["cpuid.SSE2"]), features(&[])));
        assert_eq!(status.value, StatusCode::NotApplicable);
    }

    #[test]
    fn missing_data_is_unknown() {
        let check = SpectreV2Check::default();
        assert_eq!(check.evaluate(&snapshot(None, None)).value, StatusCode::Unknown);
        assert_eq!(
            check
                .evaluate(&snapshot(features(&MITIGATION_FEATURES), None))
                .value,
            StatusCode::Unknown
        );
    }

    #[test]
    fn remediation_is_a_power_cycle() {
        assert_eq!(
            SpectreV2Check::default().remediation_action(),
            Some(RemediationAction::PowerCycle)
        );
    }
}
