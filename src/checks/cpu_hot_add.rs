//! CPU hot-add check.
//!
//! Enabling CPU hot-add disables vNUMA. For VMs that fit into a single
//! hypervisor socket this is harmless; wider VMs lose NUMA locality.

use super::{CheckKind, StatusCheck, StatusCode, StatusValue, UnknownPolicy};
use crate::host::HostSnapshot;
use crate::tasks::RemediationAction;

#[derive(Debug, Default)]
pub struct CpuHotAddCheck {
    unknown_policy: UnknownPolicy,
}

impl CpuHotAddCheck {
    pub fn new(unknown_policy: UnknownPolicy) -> Self {
        Self { unknown_policy }
    }
}

impl StatusCheck for CpuHotAddCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::CpuHotAdd
    }

    fn label(&self) -> &str {
        "CPU Hot Plug"
    }

    fn valid_values(&self) -> &[StatusCode] {
        &[
            StatusCode::Ok,
            StatusCode::PerformanceDegraded,
            StatusCode::Unknown,
        ]
    }

    fn unknown_policy(&self) -> UnknownPolicy {
        self.unknown_policy
    }

    fn supports_remediation(&self) -> bool {
        true
    }

    fn remediation_action(&self) -> Option<RemediationAction> {
        Some(RemediationAction::DisableCpuHotAdd)
    }

    fn evaluate(&self, snapshot: &HostSnapshot) -> StatusValue {
        let (value, detail) = match (
            snapshot.cpu_hot_add,
            snapshot.cpus,
            snapshot.hypervisor_cores_per_socket,
        ) {
            (Some(false), _, _) => (StatusCode::Ok, String::new()),
            (Some(true), Some(cpus), Some(cores)) if cpus > cores => (
                StatusCode::PerformanceDegraded,
                format!(
                    "CPU hot-add disables vNUMA for {} vCPUs on {} cores per socket",
                    cpus, cores
                ),
            ),
            (Some(true), Some(_), Some(_)) => (StatusCode::Ok, String::new()),
            (None, _, _) => (
                StatusCode::Unknown,
                "CPU hot-add setting not reported".to_string(),
            ),
            (Some(true), _, _) => (
                StatusCode::Unknown,
                "CPU topology not reported".to_string(),
            ),
        };

        StatusValue::from_snapshot(snapshot, self.kind(), value, detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn snapshot(hot_add: Option<bool>, cpus: Option<u32>, cores: Option<u32>) -> HostSnapshot {
        let mut snapshot = HostSnapshot::new(
            "vm3".into(),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        );
        snapshot.cpu_hot_add = hot_add;
        snapshot.cpus = cpus;
        snapshot.hypervisor_cores_per_socket = cores;
        snapshot
    }

    #[test]
    fn disabled_hot_add_is_ok() {
        let status = CpuHotAddCheck::default().evaluate(&snapshot(Some(false), Some(32), Some(8)));
        assert_eq!(status.value, StatusCode::Ok);
    }

    #[test]
    fn wide_vm_with_hot_add_is_degraded() {
        let status = CpuHotAddCheck::default().evaluate(&snapshot(Some(true), Some(16), Some(8)));
        assert_eq!(status.value, StatusCode::PerformanceDegraded);
        assert!(status.detail.contains("16 vCPUs"));
    }

    #[test]
    fn vm_fitting_one_socket_is_ok() {
        let status = CpuHotAddCheck::default().evaluate(&snapshot(Some(true), Some(8), Some(8)));
        assert_eq!(status.value, StatusCode::Ok);
    }

    #[test]
    fn missing_topology_is_unknown() {
        let check = CpuHotAddCheck::default();
        assert_eq!(
            check.evaluate(&snapshot(Some(true), None, Some(8))).value,
            StatusCode::Unknown
        );
        assert_eq!(
            check.evaluate(&snapshot(None, Some(4), Some(8))).value,
            StatusCode::Unknown
        );
    }

    #[test]
    fn remediation_disables_hot_add() {
        let check = CpuHotAddCheck::default();
        assert!(check.supports_remediation());
        assert_eq!(
            check.remediation_action(),
            Some(RemediationAction::DisableCpuHotAdd)
        );
        assert_eq!(
            check.non_compliant_values(),
            vec![StatusCode::PerformanceDegraded]
        );
    }
}
