//! Status command implementation.
//!
//! The `wreckingball status` command shows compliance counts per check.

use std::path::{Path, PathBuf};

use crate::cli::args::StatusArgs;
use crate::error::Result;
use crate::ui::UserInterface;

use super::context::load_fleet;
use super::dispatcher::{Command, CommandResult};
use super::display;

/// The status command implementation.
pub struct StatusCommand {
    project_root: PathBuf,
    config: Option<PathBuf>,
    args: StatusArgs,
}

impl StatusCommand {
    /// Create a new status command.
    pub fn new(project_root: &Path, config: Option<&Path>, args: StatusArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config: config.map(Path::to_path_buf),
            args,
        }
    }
}

impl Command for StatusCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(fleet) = load_fleet(ui, &self.project_root, self.config.as_deref())? else {
            return Ok(CommandResult::failure(2));
        };

        let summary = fleet.dashboard().summary();

        if self.args.json {
            ui.message(&serde_json::to_string_pretty(&summary).map_err(anyhow::Error::from)?);
            return Ok(CommandResult::success());
        }

        ui.show_header("Fleet compliance");
        let theme = display::theme();
        ui.message(&display::summary_table(&summary, &theme).render());
        ui.message("");

        if fleet.store.is_empty() {
            ui.message("No status recorded yet. Run 'wreckingball refresh' first.");
        } else if summary.total_non_compliant() > 0 {
            ui.warning(&format!(
                "{} non-compliant statuses. Run 'wreckingball hosts <check> --non-compliant' for details.",
                summary.total_non_compliant()
            ));
        } else {
            ui.success("All recorded statuses are compliant");
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{CheckKind, StatusCode, StatusValue};
    use crate::host::HostId;
    use crate::store::StatusStore;
    use crate::ui::MockUI;
    use chrono::{TimeZone, Utc};
    use std::fs;
    use tempfile::TempDir;

    fn setup_project(config: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".wreckingball");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.yml"), config).unwrap();
        fs::write(
            dir.join("inventory.yml"),
            "hosts:\n  - id: \"1\"\n    name: web01\n  - id: \"2\"\n    name: db01\n",
        )
        .unwrap();
        temp
    }

    fn record(temp: &TempDir, values: &[(&str, CheckKind, StatusCode)]) {
        let store = StatusStore::new();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for (id, kind, code) in values {
            store.put(StatusValue::new(HostId::new(*id), *kind, *code, at, ""));
        }
        store
            .save(&temp.path().join(".wreckingball").join("status.yml"))
            .unwrap();
    }

    #[test]
    fn status_without_config_fails() {
        let temp = TempDir::new().unwrap();
        let cmd = StatusCommand::new(temp.path(), None, StatusArgs::default());
        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();
        assert_eq!(result.exit_code, 2);
        assert!(ui.has_error("No configuration found"));
    }

    #[test]
    fn status_with_empty_store_suggests_refresh() {
        let temp = setup_project("");
        let cmd = StatusCommand::new(temp.path(), None, StatusArgs::default());
        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();
        assert!(result.success);
        assert_eq!(ui.headers(), &["Fleet compliance".to_string()]);
        assert!(ui.has_message("wreckingball refresh"));
    }

    #[test]
    fn status_warns_about_non_compliant_values() {
        let temp = setup_project("");
        record(
            &temp,
            &[
                ("1", CheckKind::Tools, StatusCode::Ok),
                ("2", CheckKind::Tools, StatusCode::NotRunning),
            ],
        );
        let cmd = StatusCommand::new(temp.path(), None, StatusArgs::default());
        let mut ui = MockUI::new();
        cmd.execute(&mut ui).unwrap();
        assert!(ui.has_warning("1 non-compliant statuses"));
    }

    #[test]
    fn status_reports_all_compliant() {
        let temp = setup_project("");
        record(&temp, &[("1", CheckKind::Tools, StatusCode::Ok)]);
        let cmd = StatusCommand::new(temp.path(), None, StatusArgs::default());
        let mut ui = MockUI::new();
        cmd.execute(&mut ui).unwrap();
        assert!(ui.has_success("All recorded statuses are compliant"));
    }

    #[test]
    fn status_json_lists_registered_checks() {
        let temp = setup_project("checks: [hardware-version]\n");
        record(&temp, &[("1", CheckKind::HardwareVersion, StatusCode::OutOfDate)]);
        let cmd = StatusCommand::new(temp.path(), None, StatusArgs { json: true });
        let mut ui = MockUI::new();
        cmd.execute(&mut ui).unwrap();

        let json: serde_json::Value = serde_json::from_str(&ui.messages()[0]).unwrap();
        let checks = json["checks"].as_array().unwrap();
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0]["kind"], "hardware-version");
        assert_eq!(checks[0]["counts"]["non_compliant"], 1);
    }
}
