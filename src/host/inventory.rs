//! YAML-backed host inventory.
//!
//! Stands in for the hypervisor API: each entry carries the host's identity
//! and the facts a provider read would return. Remediation actions mutate
//! those facts the way the hypervisor would.
//!
//! ```yaml
//! hosts:
//!   - id: "42"
//!     name: web01.example.com
//!     provider: vcenter-prod
//!     snapshot:
//!       power_state: powered_on
//!       hardware_version: vmx-10
//!       hypervisor_max_hardware_version: 14
//! ```

use anyhow::anyhow;
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::{Host, HostDirectory, HostId, HostSnapshot, PowerState, Provider, SnapshotSource};
use crate::error::{Result, WreckingballError};
use crate::tasks::RemediationAction;

/// One inventory entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryHost {
    pub id: HostId,
    pub name: String,
    #[serde(default)]
    pub provider: String,
    /// Unreachable hosts fail snapshot reads.
    #[serde(default = "default_reachable", skip_serializing_if = "is_true")]
    pub reachable: bool,
    #[serde(default)]
    pub snapshot: HostSnapshot,
}

fn default_reachable() -> bool {
    true
}

fn is_true(b: &bool) -> bool {
    *b
}

impl InventoryHost {
    /// Create a reachable entry with the given facts.
    pub fn new(id: &str, name: &str, snapshot: HostSnapshot) -> Self {
        Self {
            id: HostId::new(id),
            name: name.to_string(),
            provider: String::new(),
            reachable: true,
            snapshot,
        }
    }

    fn host(&self) -> Host {
        Host {
            id: self.id.clone(),
            name: self.name.clone(),
            provider: self.provider.clone(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct InventoryFile {
    #[serde(default)]
    hosts: Vec<InventoryHost>,
}

/// File-backed fleet inventory.
#[derive(Debug, Default)]
pub struct Inventory {
    hosts: RwLock<Vec<InventoryHost>>,
}

impl Inventory {
    /// Create an inventory from entries.
    ///
    /// Fails with `ConfigValidationError` on duplicate host IDs.
    pub fn new(hosts: Vec<InventoryHost>) -> Result<Self> {
        let mut seen = HashSet::new();
        for host in &hosts {
            if !seen.insert(host.id.clone()) {
                return Err(WreckingballError::ConfigValidationError {
                    message: format!("Duplicate host id '{}' in inventory", host.id),
                });
            }
        }
        Ok(Self {
            hosts: RwLock::new(hosts),
        })
    }

    /// Load an inventory file. A missing file is an empty fleet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No inventory at {}, fleet is empty", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let file: InventoryFile =
            serde_yaml::from_str(&content).map_err(|e| WreckingballError::ConfigParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Self::new(file.hosts)
    }

    /// Save the inventory atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = InventoryFile {
            hosts: self.hosts.read().clone(),
        };
        let content = serde_yaml::to_string(&file).map_err(|e| {
            WreckingballError::ConfigValidationError {
                message: format!("Failed to serialize inventory: {}", e),
            }
        })?;
        let temp_path = path.with_extension("yml.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Number of hosts.
    pub fn len(&self) -> usize {
        self.hosts.read().len()
    }

    /// Whether the inventory is empty.
    pub fn is_empty(&self) -> bool {
        self.hosts.read().is_empty()
    }

    /// Mark a host reachable or unreachable.
    pub fn set_reachable(&self, id: &HostId, reachable: bool) -> Result<()> {
        let mut hosts = self.hosts.write();
        let entry = hosts
            .iter_mut()
            .find(|h| &h.id == id)
            .ok_or_else(|| WreckingballError::HostNotFound {
                host: id.to_string(),
            })?;
        entry.reachable = reachable;
        Ok(())
    }

    /// Raw facts recorded for a host, without stamping a read time.
    pub fn facts(&self, id: &HostId) -> Option<HostSnapshot> {
        self.hosts
            .read()
            .iter()
            .find(|h| &h.id == id)
            .map(|h| h.snapshot.clone())
    }
}

impl HostDirectory for Inventory {
    fn host(&self, id: &HostId) -> Option<Host> {
        self.hosts.read().iter().find(|h| &h.id == id).map(|h| h.host())
    }

    fn hosts(&self) -> Vec<Host> {
        self.hosts.read().iter().map(|h| h.host()).collect()
    }
}

impl SnapshotSource for Inventory {
    fn snapshot(&self, id: &HostId) -> Result<HostSnapshot> {
        let hosts = self.hosts.read();
        let entry = hosts
            .iter()
            .find(|h| &h.id == id)
            .ok_or_else(|| WreckingballError::HostNotFound {
                host: id.to_string(),
            })?;

        if !entry.reachable {
            return Err(WreckingballError::SnapshotUnavailable {
                host: id.to_string(),
                message: format!("provider '{}' is unreachable", entry.provider),
            });
        }

        let mut snapshot = entry.snapshot.clone();
        snapshot.host_id = id.clone();
        snapshot.taken_at = Utc::now();
        Ok(snapshot)
    }
}

impl Provider for Inventory {
    fn apply(&self, id: &HostId, action: &RemediationAction) -> Result<()> {
        let mut hosts = self.hosts.write();
        let entry = hosts
            .iter_mut()
            .find(|h| &h.id == id)
            .ok_or_else(|| WreckingballError::HostNotFound {
                host: id.to_string(),
            })?;

        if !entry.reachable {
            return Err(WreckingballError::SnapshotUnavailable {
                host: id.to_string(),
                message: format!("provider '{}' is unreachable", entry.provider),
            });
        }

        let facts = &mut entry.snapshot;
        let previous_power = facts.power_state;
        if action.requires_power_off() {
            tracing::info!("Powering off {} for: {}", entry.name, action.describe());
            facts.power_state = Some(PowerState::PoweredOff);
        }

        match action {
            RemediationAction::UpgradeHardwareVersion { target } => {
                if let Some(max) = facts.hypervisor_max_hardware_version {
                    if max < *target {
                        facts.power_state = previous_power;
                        return Err(anyhow!(
                            "hypervisor of {} supports at most vmx-{}, cannot upgrade to vmx-{}",
                            entry.name,
                            max,
                            target
                        )
                        .into());
                    }
                }
                facts.hardware_version = Some(format!("vmx-{}", target));
            }
            RemediationAction::CorrectGuestOs => {
                let Some(expected) = facts.expected_guest_id.clone() else {
                    facts.power_state = previous_power;
                    return Err(anyhow!(
                        "operating system of {} has no guest id mapping",
                        entry.name
                    )
                    .into());
                };
                facts.guest_id = Some(expected);
            }
            RemediationAction::DisableCpuHotAdd => {
                facts.cpu_hot_add = Some(false);
            }
            RemediationAction::PowerCycle => {
                tracing::info!("Power cycling {}", entry.name);
                facts.cpu_features = facts.hypervisor_cpu_features.clone();
            }
        }

        facts.power_state = match action {
            RemediationAction::PowerCycle => Some(PowerState::PoweredOn),
            _ => previous_power,
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn host(id: &str, name: &str) -> InventoryHost {
        let mut snapshot = HostSnapshot::default();
        snapshot.power_state = Some(PowerState::PoweredOn);
        snapshot.hardware_version = Some("vmx-10".to_string());
        snapshot.hypervisor_max_hardware_version = Some(14);
        InventoryHost::new(id, name, snapshot)
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = Inventory::new(vec![host("1", "a"), host("1", "b")]);
        assert!(matches!(
            result,
            Err(WreckingballError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn directory_lookups() {
        let inventory = Inventory::new(vec![host("1", "web01"), host("2", "db01")]).unwrap();
        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory.host(&"2".into()).unwrap().name, "db01");
        assert!(inventory.host(&"3".into()).is_none());
        assert_eq!(inventory.hosts().len(), 2);
    }

    #[test]
    fn snapshot_stamps_host_and_time() {
        let inventory = Inventory::new(vec![host("1", "web01")]).unwrap();
        let before = Utc::now();
        let snapshot = inventory.snapshot(&"1".into()).unwrap();
        assert_eq!(snapshot.host_id.as_str(), "1");
        assert!(snapshot.taken_at >= before);
    }

    #[test]
    fn unreachable_host_snapshot_fails() {
        let inventory = Inventory::new(vec![host("1", "web01")]).unwrap();
        inventory.set_reachable(&"1".into(), false).unwrap();
        assert!(matches!(
            inventory.snapshot(&"1".into()),
            Err(WreckingballError::SnapshotUnavailable { .. })
        ));
    }

    #[test]
    fn unknown_host_snapshot_fails() {
        let inventory = Inventory::default();
        assert!(matches!(
            inventory.snapshot(&"nope".into()),
            Err(WreckingballError::HostNotFound { .. })
        ));
    }

    #[test]
    fn upgrade_hardware_version() {
        let inventory = Inventory::new(vec![host("1", "web01")]).unwrap();
        inventory
            .apply(
                &"1".into(),
                &RemediationAction::UpgradeHardwareVersion { target: 13 },
            )
            .unwrap();
        let facts = inventory.facts(&"1".into()).unwrap();
        assert_eq!(facts.hardware_version.as_deref(), Some("vmx-13"));
        assert_eq!(facts.power_state, Some(PowerState::PoweredOn));
    }

    #[test]
    fn upgrade_beyond_hypervisor_fails_without_changes() {
        let inventory = Inventory::new(vec![host("1", "web01")]).unwrap();
        let result = inventory.apply(
            &"1".into(),
            &RemediationAction::UpgradeHardwareVersion { target: 19 },
        );
        assert!(result.is_err());
        let facts = inventory.facts(&"1".into()).unwrap();
        assert_eq!(facts.hardware_version.as_deref(), Some("vmx-10"));
        assert_eq!(facts.power_state, Some(PowerState::PoweredOn));
    }

    #[test]
    fn correct_guest_os_requires_mapping() {
        let inventory = Inventory::new(vec![host("1", "web01")]).unwrap();
        assert!(inventory
            .apply(&"1".into(), &RemediationAction::CorrectGuestOs)
            .is_err());
    }

    #[test]
    fn power_cycle_exposes_hypervisor_features() {
        let mut entry = host("1", "web01");
        entry.snapshot.hypervisor_cpu_features =
            Some(["cpuid.IBRS".to_string()].into_iter().collect());
        let inventory = Inventory::new(vec![entry]).unwrap();
        inventory
            .apply(&"1".into(), &RemediationAction::PowerCycle)
            .unwrap();
        let facts = inventory.facts(&"1".into()).unwrap();
        assert!(facts.cpu_features.unwrap().contains("cpuid.IBRS"));
    }

    #[test]
    fn load_and_save_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("inventory.yml");
        fs::write(
            &path,
            r#"
hosts:
  - id: "1"
    name: web01.example.com
    provider: vcenter
    snapshot:
      cpu_hot_add: true
  - id: "2"
    name: db01.example.com
    reachable: false
"#,
        )
        .unwrap();

        let inventory = Inventory::load(&path).unwrap();
        assert_eq!(inventory.len(), 2);
        assert!(inventory.snapshot(&"2".into()).is_err());

        inventory
            .apply(&"1".into(), &RemediationAction::DisableCpuHotAdd)
            .unwrap();
        inventory.save(&path).unwrap();

        let reloaded = Inventory::load(&path).unwrap();
        assert_eq!(
            reloaded.facts(&"1".into()).unwrap().cpu_hot_add,
            Some(false)
        );
        assert!(reloaded.snapshot(&"2".into()).is_err());
    }

    #[test]
    fn load_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let inventory = Inventory::load(&temp.path().join("missing.yml")).unwrap();
        assert!(inventory.is_empty());
    }
}
