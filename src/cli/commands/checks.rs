//! Checks command implementation.
//!
//! The `wreckingball checks` command lists the registered status checks.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::checks::{CheckKind, CheckRegistry, Classification, StatusCode};
use crate::cli::args::ChecksArgs;
use crate::error::Result;
use crate::ui::{Table, UserInterface};

use super::context::load_fleet;
use super::dispatcher::{Command, CommandResult};

/// One registered check.
#[derive(Debug, Serialize)]
struct CheckInfo {
    kind: CheckKind,
    label: String,
    remediable: bool,
    unknown_counts_as: Classification,
    valid_values: Vec<StatusCode>,
    non_compliant_values: Vec<StatusCode>,
}

fn describe_checks(registry: &CheckRegistry) -> Vec<CheckInfo> {
    registry
        .iter()
        .map(|check| CheckInfo {
            kind: check.kind(),
            label: check.label().to_string(),
            remediable: check.supports_remediation(),
            unknown_counts_as: check.classify(StatusCode::Unknown),
            valid_values: check.valid_values().to_vec(),
            non_compliant_values: check.non_compliant_values(),
        })
        .collect()
}

fn classification_label(classification: Classification) -> &'static str {
    match classification {
        Classification::Compliant => "compliant",
        Classification::NonCompliant => "non-compliant",
        Classification::Unknown => "unknown",
    }
}

/// The checks command implementation.
pub struct ChecksCommand {
    project_root: PathBuf,
    config: Option<PathBuf>,
    args: ChecksArgs,
}

impl ChecksCommand {
    /// Create a new checks command.
    pub fn new(project_root: &Path, config: Option<&Path>, args: ChecksArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config: config.map(Path::to_path_buf),
            args,
        }
    }
}

impl Command for ChecksCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(fleet) = load_fleet(ui, &self.project_root, self.config.as_deref())? else {
            return Ok(CommandResult::failure(2));
        };

        let checks = describe_checks(&fleet.registry);

        if self.args.json {
            ui.message(&serde_json::to_string_pretty(&checks).map_err(anyhow::Error::from)?);
            return Ok(CommandResult::success());
        }

        ui.show_header("Status checks");
        let mut table = Table::new(&["Check", "Label", "Remediable", "Unknown counts as"]);
        for check in &checks {
            table.add_row(vec![
                check.kind.slug().to_string(),
                check.label.clone(),
                if check.remediable { "yes" } else { "no" }.to_string(),
                classification_label(check.unknown_counts_as).to_string(),
            ]);
        }
        ui.message(&table.render());

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn setup_project(config: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".wreckingball");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.yml"), config).unwrap();
        temp
    }

    #[test]
    fn lists_builtin_checks_in_order() {
        let checks = describe_checks(&CheckRegistry::with_builtins());
        let kinds: Vec<CheckKind> = checks.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, CheckKind::ALL.to_vec());
    }

    #[test]
    fn hardware_version_is_remediable() {
        let checks = describe_checks(&CheckRegistry::with_builtins());
        let hw = checks
            .iter()
            .find(|c| c.kind == CheckKind::HardwareVersion)
            .unwrap();
        assert!(hw.remediable);
        assert!(hw.non_compliant_values.contains(&StatusCode::OutOfDate));
    }

    #[test]
    fn json_reflects_classification_override() {
        let temp = setup_project(
            "checks: [tools]\nclassification:\n  tools:\n    unknown: non_compliant\n",
        );
        let cmd = ChecksCommand::new(temp.path(), None, ChecksArgs { json: true });
        let mut ui = MockUI::new();
        cmd.execute(&mut ui).unwrap();

        let json: serde_json::Value = serde_json::from_str(&ui.messages()[0]).unwrap();
        assert_eq!(json[0]["kind"], "tools");
        assert_eq!(json[0]["unknown_counts_as"], "non_compliant");
    }

    #[test]
    fn table_output() {
        let temp = setup_project("");
        let cmd = ChecksCommand::new(temp.path(), None, ChecksArgs::default());
        let mut ui = MockUI::new();
        assert!(cmd.execute(&mut ui).unwrap().success);
        assert!(ui.has_message("hardware-version"));
    }
}
