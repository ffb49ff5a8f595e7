//! Integration tests for scheduling fleet refreshes.

use std::fs;

use tempfile::TempDir;
use wreckingball::checks::{CheckKind, CheckRegistry, StatusCode};
use wreckingball::config::{load_config, ProjectPaths};
use wreckingball::host::{HostId, Inventory};
use wreckingball::refresh::Refresher;
use wreckingball::store::StatusStore;
use wreckingball::tasks::{ExecutionContext, LocalRunner, RefreshScope, TaskResult};
use wreckingball::WreckingballError;

const CONFIG: &str = r#"
settings:
  min_hardware_version: 14
checks: [hardware-version, tools]
"#;

const INVENTORY: &str = r#"
hosts:
  - id: "1"
    name: web01
    snapshot:
      power_state: powered_on
      tools_state: running
      tools_version_status: needs_upgrade
      hardware_version: vmx-13
  - id: "2"
    name: db01
    snapshot:
      power_state: powered_off
      hardware_version: vmx-14
  - id: "3"
    name: app01
    reachable: false
"#;

fn setup_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join(".wreckingball");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.yml"), CONFIG).unwrap();
    fs::write(dir.join("inventory.yml"), INVENTORY).unwrap();
    temp
}

#[test]
fn refresh_from_project_files() {
    let temp = setup_project();
    let config = load_config(temp.path(), None).unwrap();
    let paths = ProjectPaths::resolve(temp.path(), &config);
    let registry = CheckRegistry::from_config(&config).unwrap();
    let inventory = Inventory::load(&paths.inventory).unwrap();
    let store = StatusStore::load(&paths.status_store).unwrap();

    let runner = LocalRunner::default();
    let handle = Refresher::new(&registry, &runner)
        .schedule_refresh(RefreshScope::All)
        .unwrap();
    assert_eq!(runner.pending(), 1);

    let outcomes = runner.run_pending(&ExecutionContext {
        registry: &registry,
        writeback: &store,
        provider: &inventory,
        directory: &inventory,
    });
    assert_eq!(outcomes[0].handle.id, handle.id);
    let TaskResult::Refreshed(report) = &outcomes[0].result else {
        panic!("expected a refresh report");
    };
    assert_eq!(report.evaluated, 2);
    assert_eq!(report.written, 4);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].host_id, HostId::new("3"));

    let get = |id: &str, kind| store.get(&HostId::new(id), kind).map(|v| v.value);
    assert_eq!(get("1", CheckKind::HardwareVersion), Some(StatusCode::OutOfDate));
    assert_eq!(get("1", CheckKind::Tools), Some(StatusCode::OutOfDate));
    assert_eq!(get("2", CheckKind::HardwareVersion), Some(StatusCode::Ok));
    assert_eq!(get("2", CheckKind::Tools), Some(StatusCode::NotApplicable));
    assert_eq!(get("1", CheckKind::SpectreV2), None);

    store.save(&paths.status_store).unwrap();
    let reloaded = StatusStore::load(&paths.status_store).unwrap();
    assert_eq!(reloaded.len(), 4);
}

#[test]
fn refresh_of_selected_hosts_only_touches_them() {
    let temp = setup_project();
    let config = load_config(temp.path(), None).unwrap();
    let paths = ProjectPaths::resolve(temp.path(), &config);
    let registry = CheckRegistry::from_config(&config).unwrap();
    let inventory = Inventory::load(&paths.inventory).unwrap();
    let store = StatusStore::new();

    let runner = LocalRunner::default();
    Refresher::new(&registry, &runner)
        .schedule_refresh(RefreshScope::Hosts(vec![HostId::new("2")]))
        .unwrap();
    runner.run_pending(&ExecutionContext {
        registry: &registry,
        writeback: &store,
        provider: &inventory,
        directory: &inventory,
    });

    assert!(store.values_for_host(&HostId::new("1")).is_empty());
    assert_eq!(store.values_for_host(&HostId::new("2")).len(), 2);
}

#[test]
fn empty_host_selection_is_rejected() {
    let registry = CheckRegistry::with_builtins();
    let runner = LocalRunner::default();
    let result = Refresher::new(&registry, &runner).schedule_refresh(RefreshScope::Hosts(vec![]));

    assert!(matches!(
        result,
        Err(WreckingballError::ConfigValidationError { .. })
    ));
    assert_eq!(runner.pending(), 0);
}
