//! Remediate command implementation.
//!
//! The `wreckingball remediate <host> <check>` command validates and
//! schedules one remediation task, then runs it.

use std::path::{Path, PathBuf};

use crate::cli::args::RemediateArgs;
use crate::error::{Result, WreckingballError};
use crate::host::HostId;
use crate::remediation::Remediator;
use crate::tasks::TaskResult;
use crate::ui::{Prompt, UserInterface};

use super::context::load_fleet;
use super::dispatcher::{Command, CommandResult};

/// The remediate command implementation.
pub struct RemediateCommand {
    project_root: PathBuf,
    config: Option<PathBuf>,
    args: RemediateArgs,
}

impl RemediateCommand {
    /// Create a new remediate command.
    pub fn new(project_root: &Path, config: Option<&Path>, args: RemediateArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config: config.map(Path::to_path_buf),
            args,
        }
    }
}

impl Command for RemediateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(fleet) = load_fleet(ui, &self.project_root, self.config.as_deref())? else {
            return Ok(CommandResult::failure(2));
        };

        let runner = fleet.runner();
        let remediator = Remediator::new(&fleet.registry, &fleet.store, &fleet.inventory, &runner);

        let host_id = HostId::new(self.args.host.as_str());
        let preview = match remediator.prepare(&host_id, &self.args.kind) {
            Ok(preview) => preview,
            Err(
                e @ (WreckingballError::HostNotFound { .. }
                | WreckingballError::UnknownKind { .. }
                | WreckingballError::NotRemediable { .. }),
            ) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(1));
            }
            Err(e) => return Err(e),
        };

        let host = preview.request.host().clone();
        let check = fleet.registry.get(preview.request.check_kind())?;
        let current = preview.request.requested_value();

        ui.show_header(&format!("Remediate {}", check.label()));
        ui.message(&format!("  Host:    {} ({})", host.name, host.id));
        ui.message(&format!("  Status:  {}", current.value.label()));
        ui.message(&format!("  Action:  {}", preview.action.describe()));
        if preview.requires_power_off {
            ui.warning(&format!(
                "{} will be powered off while the action runs",
                host.name
            ));
        }

        if self.args.dry_run {
            ui.message("");
            ui.message("Dry run, nothing scheduled.");
            return Ok(CommandResult::success());
        }

        if !self.args.yes {
            let prompt = Prompt::confirm(
                "remediate",
                format!("Remediate {} on {}?", check.label(), host.name),
                false,
            );
            if !ui.confirm(&prompt)? {
                ui.message("Aborted.");
                return Ok(CommandResult::failure(1));
            }
        }

        let handle = match remediator.submit(preview.request) {
            Ok(handle) => handle,
            Err(e @ WreckingballError::TaskSubmission { .. }) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(1));
            }
            Err(e) => return Err(e),
        };
        ui.success(&format!(
            "Remediation task {} successfully scheduled",
            handle.id
        ));

        let mut spinner = ui.start_spinner(&format!("Running {}", handle.id));
        let outcomes = runner.run_pending(&fleet.execution_context());
        let mut failed = false;
        for outcome in &outcomes {
            match &outcome.result {
                TaskResult::Remediated { value, applied: true } => {
                    spinner.finish_success(&format!(
                        "{} on {} is now {}",
                        check.label(),
                        host.name,
                        value.value.label()
                    ));
                }
                TaskResult::Remediated { value, applied: false } => {
                    spinner.finish_success(&format!(
                        "{} on {} evaluated to {}",
                        check.label(),
                        host.name,
                        value.value.label()
                    ));
                    ui.warning("A newer status was already stored; it was kept");
                }
                TaskResult::Failed { message } => {
                    failed = true;
                    spinner.finish_error(&format!("{} failed: {}", outcome.summary, message));
                }
                TaskResult::Refreshed(_) => {}
            }
        }

        fleet.save_store()?;
        fleet.save_inventory()?;

        if failed {
            ui.error("Remediation failed");
            return Ok(CommandResult::failure(1));
        }
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{CheckKind, StatusCode, StatusValue};
    use crate::store::StatusStore;
    use crate::ui::MockUI;
    use chrono::{TimeZone, Utc};
    use std::fs;
    use tempfile::TempDir;

    const INVENTORY: &str = r#"
hosts:
  - id: "1"
    name: web01
    snapshot:
      power_state: powered_on
      hardware_version: vmx-10
      hypervisor_max_hardware_version: 14
  - id: "2"
    name: db01
    snapshot:
      power_state: powered_on
      hardware_version: vmx-14
      hypervisor_max_hardware_version: 14
"#;

    fn setup_fleet() -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".wreckingball");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.yml"), "").unwrap();
        fs::write(dir.join("inventory.yml"), INVENTORY).unwrap();

        let store = StatusStore::new();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        store.put(StatusValue::new(
            HostId::new("1"),
            CheckKind::HardwareVersion,
            StatusCode::OutOfDate,
            at,
            "vmx-10",
        ));
        store.put(StatusValue::new(
            HostId::new("2"),
            CheckKind::HardwareVersion,
            StatusCode::Ok,
            at,
            "vmx-14",
        ));
        store.save(&dir.join("status.yml")).unwrap();
        temp
    }

    fn args(host: &str, yes: bool, dry_run: bool) -> RemediateArgs {
        RemediateArgs {
            host: host.to_string(),
            kind: "hardware-version".to_string(),
            yes,
            dry_run,
        }
    }

    fn stored_value(temp: &TempDir, host: &str) -> Option<StatusCode> {
        StatusStore::load(&temp.path().join(".wreckingball").join("status.yml"))
            .unwrap()
            .get(&HostId::new(host), CheckKind::HardwareVersion)
            .map(|v| v.value)
    }

    #[test]
    fn remediates_out_of_date_host() {
        let temp = setup_fleet();
        let cmd = RemediateCommand::new(temp.path(), None, args("1", true, false));
        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_success("successfully scheduled"));
        assert!(ui.has_warning("powered off"));
        assert_eq!(stored_value(&temp, "1"), Some(StatusCode::Ok));
    }

    #[test]
    fn dry_run_schedules_nothing() {
        let temp = setup_fleet();
        let cmd = RemediateCommand::new(temp.path(), None, args("1", false, true));
        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_message("Dry run"));
        assert!(ui.prompts_shown().is_empty());
        assert_eq!(stored_value(&temp, "1"), Some(StatusCode::OutOfDate));
    }

    #[test]
    fn declined_prompt_aborts() {
        let temp = setup_fleet();
        let cmd = RemediateCommand::new(temp.path(), None, args("1", false, false));
        let mut ui = MockUI::new();
        ui.set_confirm_response("remediate", false);
        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_message("Aborted"));
        assert_eq!(ui.prompts_shown(), &["remediate".to_string()]);
        assert_eq!(stored_value(&temp, "1"), Some(StatusCode::OutOfDate));
    }

    #[test]
    fn compliant_host_is_not_remediable() {
        let temp = setup_fleet();
        let cmd = RemediateCommand::new(temp.path(), None, args("2", true, false));
        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("can not be remediated"));
        assert!(ui.successes().is_empty());
    }

    #[test]
    fn unknown_host_fails() {
        let temp = setup_fleet();
        let cmd = RemediateCommand::new(temp.path(), None, args("99", true, false));
        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("Host not found: 99"));
    }
}
