//! Loading the fleet a command operates on.

use std::path::Path;

use crate::checks::CheckRegistry;
use crate::config::{load_config, validate, ProjectPaths, WreckingballConfig, CONFIG_DIR, CONFIG_FILE};
use crate::dashboard::Dashboard;
use crate::error::{Result, WreckingballError};
use crate::host::{HostDirectory, HostId, Inventory};
use crate::store::StatusStore;
use crate::tasks::{ExecutionContext, LocalRunner};
use crate::ui::UserInterface;

/// Configuration, checks, inventory and status table of one project.
pub struct Fleet {
    pub config: WreckingballConfig,
    pub paths: ProjectPaths,
    pub registry: CheckRegistry,
    pub store: StatusStore,
    pub inventory: Inventory,
}

impl Fleet {
    /// Load and validate everything a command needs.
    pub fn load(project_root: &Path, config_override: Option<&Path>) -> Result<Self> {
        let config = load_config(project_root, config_override)?;
        validate(&config)?;

        let registry = CheckRegistry::from_config(&config)?;
        let paths = ProjectPaths::resolve(project_root, &config);
        let store = StatusStore::load(&paths.status_store)?;
        let inventory = Inventory::load(&paths.inventory)?;

        tracing::debug!(
            "Loaded {} checks, {} hosts, {} statuses",
            registry.len(),
            inventory.len(),
            store.len()
        );

        Ok(Self {
            config,
            paths,
            registry,
            store,
            inventory,
        })
    }

    pub fn dashboard(&self) -> Dashboard<'_> {
        Dashboard::new(&self.registry, &self.store, &self.inventory)
    }

    /// A runner bounded by the configured queue size.
    pub fn runner(&self) -> LocalRunner {
        LocalRunner::new(self.config.settings.max_queued_tasks)
    }

    pub fn execution_context(&self) -> ExecutionContext<'_> {
        ExecutionContext {
            registry: &self.registry,
            writeback: &self.store,
            provider: &self.inventory,
            directory: &self.inventory,
        }
    }

    /// Drop statuses of hosts that left the inventory.
    pub fn prune_retired_hosts(&self) -> usize {
        let mut retired: Vec<HostId> = self
            .store
            .snapshot()
            .into_iter()
            .map(|value| value.host_id)
            .filter(|id| self.inventory.host(id).is_none())
            .collect();
        retired.sort();
        retired.dedup();

        for id in &retired {
            let removed = self.store.remove_host(id);
            tracing::debug!("Removed {} statuses of retired host {}", removed, id);
        }
        retired.len()
    }

    pub fn save_store(&self) -> Result<()> {
        self.store.save(&self.paths.status_store)
    }

    pub fn save_inventory(&self) -> Result<()> {
        self.inventory.save(&self.paths.inventory)
    }
}

/// Load the fleet, reporting a missing configuration to the user.
///
/// Returns `None` when no configuration exists.
pub fn load_fleet(
    ui: &mut dyn UserInterface,
    project_root: &Path,
    config_override: Option<&Path>,
) -> Result<Option<Fleet>> {
    match Fleet::load(project_root, config_override) {
        Ok(fleet) => Ok(Some(fleet)),
        Err(WreckingballError::ConfigNotFound { path }) => {
            ui.error(&format!(
                "No configuration found at {}. Create {}/{} first.",
                path.display(),
                CONFIG_DIR,
                CONFIG_FILE
            ));
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{CheckKind, StatusCode, StatusValue};
    use crate::ui::MockUI;
    use chrono::{TimeZone, Utc};
    use std::fs;
    use tempfile::TempDir;

    fn setup_project(config: &str, inventory: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(CONFIG_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(CONFIG_FILE), config).unwrap();
        fs::write(dir.join("inventory.yml"), inventory).unwrap();
        temp
    }

    const INVENTORY: &str = r#"
hosts:
  - id: "1"
    name: web01
    snapshot:
      hardware_version: vmx-10
"#;

    #[test]
    fn load_reports_missing_config() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        let fleet = load_fleet(&mut ui, temp.path(), None).unwrap();
        assert!(fleet.is_none());
        assert!(ui.has_error("No configuration found"));
    }

    #[test]
    fn load_builds_fleet() {
        let temp = setup_project("checks: [tools, hardware-version]\n", INVENTORY);
        let fleet = Fleet::load(temp.path(), None).unwrap();
        assert_eq!(fleet.registry.len(), 2);
        assert_eq!(fleet.inventory.len(), 1);
        assert!(fleet.store.is_empty());
    }

    #[test]
    fn load_rejects_invalid_config() {
        let temp = setup_project("settings:\n  max_queued_tasks: 0\n", INVENTORY);
        let result = Fleet::load(temp.path(), None);
        assert!(matches!(
            result,
            Err(WreckingballError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn load_rejects_unknown_check() {
        let temp = setup_project("checks: [tools, disk-space]\n", INVENTORY);
        let result = Fleet::load(temp.path(), None);
        assert!(matches!(result, Err(WreckingballError::UnknownKind { .. })));
    }

    #[test]
    fn prune_removes_hosts_missing_from_inventory() {
        let temp = setup_project("", INVENTORY);
        let fleet = Fleet::load(temp.path(), None).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for id in ["1", "2"] {
            fleet.store.put(StatusValue::new(
                HostId::new(id),
                CheckKind::Tools,
                StatusCode::Ok,
                at,
                "",
            ));
        }

        assert_eq!(fleet.prune_retired_hosts(), 1);
        assert!(fleet.store.get(&HostId::new("1"), CheckKind::Tools).is_some());
        assert!(fleet.store.get(&HostId::new("2"), CheckKind::Tools).is_none());
    }

    #[test]
    fn save_store_round_trips() {
        let temp = setup_project("", INVENTORY);
        let fleet = Fleet::load(temp.path(), None).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        fleet.store.put(StatusValue::new(
            HostId::new("1"),
            CheckKind::Tools,
            StatusCode::NotRunning,
            at,
            "",
        ));
        fleet.save_store().unwrap();

        let reloaded = Fleet::load(temp.path(), None).unwrap();
        assert_eq!(
            reloaded
                .store
                .get(&HostId::new("1"), CheckKind::Tools)
                .map(|v| v.value),
            Some(StatusCode::NotRunning)
        );
    }
}
