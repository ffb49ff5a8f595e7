//! Hosts command implementation.
//!
//! The `wreckingball hosts <check>` command lists hosts with a recorded
//! status for one check.

use std::path::{Path, PathBuf};

use crate::checks::CheckKind;
use crate::cli::args::HostsArgs;
use crate::error::{Result, WreckingballError};
use crate::ui::UserInterface;

use super::context::load_fleet;
use super::dispatcher::{Command, CommandResult};
use super::display;

/// The hosts command implementation.
pub struct HostsCommand {
    project_root: PathBuf,
    config: Option<PathBuf>,
    args: HostsArgs,
}

impl HostsCommand {
    /// Create a new hosts command.
    pub fn new(project_root: &Path, config: Option<&Path>, args: HostsArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config: config.map(Path::to_path_buf),
            args,
        }
    }
}

impl Command for HostsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(fleet) = load_fleet(ui, &self.project_root, self.config.as_deref())? else {
            return Ok(CommandResult::failure(2));
        };

        let dashboard = fleet.dashboard();
        let rows = if self.args.non_compliant {
            dashboard.non_compliant_hosts(&self.args.kind)
        } else {
            dashboard.hosts_for(&self.args.kind, self.args.status)
        };
        let rows = match rows {
            Ok(rows) => rows,
            Err(e @ WreckingballError::UnknownKind { .. }) => {
                let available: Vec<&str> = fleet.registry.all().iter().map(CheckKind::slug).collect();
                ui.error(&format!("{} (available: {})", e, available.join(", ")));
                return Ok(CommandResult::failure(1));
            }
            Err(e) => return Err(e),
        };

        if self.args.json {
            ui.message(&serde_json::to_string_pretty(&rows).map_err(anyhow::Error::from)?);
            return Ok(CommandResult::success());
        }

        let check = fleet.registry.lookup(&self.args.kind)?;
        ui.show_header(check.label());

        if rows.is_empty() {
            ui.message("No hosts match.");
        } else {
            let theme = display::theme();
            ui.message(&display::hosts_table(&rows, &theme).render());
            ui.message(&format!("{} hosts", rows.len()));
        }

        Ok(CommandResult::success())
    }
}
