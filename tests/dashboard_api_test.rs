//! Integration tests for the dashboard over an evaluated fleet.

use chrono::{Duration, TimeZone, Utc};
use wreckingball::checks::{CheckKind, CheckRegistry, Severity, StatusCode, StatusValue};
use wreckingball::dashboard::Dashboard;
use wreckingball::host::{HostId, HostSnapshot, Inventory, InventoryHost};
use wreckingball::store::{PutOutcome, StatusStore};

fn hardware_host(id: &str, name: &str, version: Option<&str>) -> InventoryHost {
    let mut snapshot = HostSnapshot::default();
    snapshot.hardware_version = version.map(str::to_string);
    snapshot.hypervisor_max_hardware_version = Some(14);
    InventoryHost::new(id, name, snapshot)
}

/// Five hosts: two current, two out of date and one unreported.
fn evaluated_fleet() -> (CheckRegistry, StatusStore, Inventory) {
    let registry = CheckRegistry::with_builtins();
    let inventory = Inventory::new(vec![
        hardware_host("1", "web01", Some("vmx-13")),
        hardware_host("2", "Web02", Some("vmx-14")),
        hardware_host("3", "db01", Some("vmx-10")),
        hardware_host("4", "app01", Some("vmx-8")),
        hardware_host("5", "batch01", None),
    ])
    .unwrap();

    let store = StatusStore::new();
    let check = registry.get(CheckKind::HardwareVersion).unwrap();
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    for id in ["1", "2", "3", "4", "5"] {
        let mut snapshot = inventory.facts(&HostId::new(id)).unwrap();
        snapshot.host_id = HostId::new(id);
        snapshot.taken_at = at;
        store.put(check.evaluate(&snapshot));
    }
    (registry, store, inventory)
}

#[test]
fn summary_counts_each_bucket() {
    let (registry, store, inventory) = evaluated_fleet();
    let dashboard = Dashboard::new(&registry, &store, &inventory);

    let summary = dashboard.summary();
    let counts = summary.get(CheckKind::HardwareVersion).unwrap();
    assert_eq!(counts.compliant, 2);
    assert_eq!(counts.non_compliant, 2);
    assert_eq!(counts.unknown, 1);
    assert_eq!(counts.total(), 5);

    // Checks without values still appear with zero counts.
    assert_eq!(summary.checks.len(), 5);
    assert_eq!(summary.get(CheckKind::Tools).unwrap().total(), 0);
}

#[test]
fn out_of_date_listing_is_sorted_by_name() {
    let (registry, store, inventory) = evaluated_fleet();
    let dashboard = Dashboard::new(&registry, &store, &inventory);

    let rows = dashboard
        .hosts_for("hardware-version", Some(StatusCode::OutOfDate))
        .unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.host_name.as_str()).collect();
    assert_eq!(names, vec!["app01", "db01"]);
    assert!(rows.iter().all(|r| r.severity == Severity::Error));
}

#[test]
fn unfiltered_listing_ignores_case() {
    let (registry, store, inventory) = evaluated_fleet();
    let dashboard = Dashboard::new(&registry, &store, &inventory);

    let rows = dashboard.hosts_for("hardware-version", None).unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.host_name.as_str()).collect();
    assert_eq!(names, vec!["app01", "batch01", "db01", "web01", "Web02"]);
}

#[test]
fn unknown_kind_is_rejected() {
    let (registry, store, inventory) = evaluated_fleet();
    let dashboard = Dashboard::new(&registry, &store, &inventory);
    assert!(dashboard.hosts_for("disk-space", None).is_err());
}

#[test]
fn host_severity_is_worst_over_checks() {
    let (registry, store, inventory) = evaluated_fleet();
    let dashboard = Dashboard::new(&registry, &store, &inventory);

    assert_eq!(dashboard.host_severity(&HostId::new("1")), Severity::Ok);
    assert_eq!(dashboard.host_severity(&HostId::new("3")), Severity::Error);
    assert_eq!(dashboard.host_severity(&HostId::new("5")), Severity::Warning);
}

#[test]
fn stale_evaluation_does_not_change_dashboard() {
    let (registry, store, inventory) = evaluated_fleet();
    let current = store
        .get(&HostId::new("3"), CheckKind::HardwareVersion)
        .unwrap();

    let stale = StatusValue::new(
        HostId::new("3"),
        CheckKind::HardwareVersion,
        StatusCode::Ok,
        current.evaluated_at - Duration::hours(1),
        "",
    );
    assert_eq!(store.put(stale), PutOutcome::Stale);

    let dashboard = Dashboard::new(&registry, &store, &inventory);
    let counts = dashboard.summary();
    assert_eq!(
        counts.get(CheckKind::HardwareVersion).unwrap().non_compliant,
        2
    );
}
