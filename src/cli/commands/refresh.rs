//! Refresh command implementation.
//!
//! The `wreckingball refresh` command re-evaluates every registered check
//! for the whole fleet or for selected hosts.

use std::path::{Path, PathBuf};

use crate::cli::args::RefreshArgs;
use crate::error::{Result, WreckingballError};
use crate::host::HostId;
use crate::refresh::Refresher;
use crate::tasks::{RefreshScope, RunnerProgress, TaskResult};
use crate::ui::UserInterface;

use super::context::load_fleet;
use super::dispatcher::{Command, CommandResult};

/// The refresh command implementation.
pub struct RefreshCommand {
    project_root: PathBuf,
    config: Option<PathBuf>,
    args: RefreshArgs,
}

impl RefreshCommand {
    /// Create a new refresh command.
    pub fn new(project_root: &Path, config: Option<&Path>, args: RefreshArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config: config.map(Path::to_path_buf),
            args,
        }
    }

    fn scope(&self) -> RefreshScope {
        if self.args.hosts.is_empty() {
            RefreshScope::All
        } else {
            RefreshScope::Hosts(self.args.hosts.iter().map(|h| HostId::new(h.as_str())).collect())
        }
    }
}

impl Command for RefreshCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(fleet) = load_fleet(ui, &self.project_root, self.config.as_deref())? else {
            return Ok(CommandResult::failure(2));
        };

        let scope = self.scope();
        let full_refresh = scope == RefreshScope::All;
        let runner = fleet.runner();

        let handle = match Refresher::new(&fleet.registry, &runner).schedule_refresh(scope.clone()) {
            Ok(handle) => handle,
            Err(
                e @ (WreckingballError::ConfigValidationError { .. }
                | WreckingballError::TaskSubmission { .. }),
            ) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(1));
            }
            Err(e) => return Err(e),
        };
        ui.message(&format!("Refresh task {} scheduled for {}", handle.id, scope));

        let mut spinner = ui.start_spinner(&format!("Refreshing {}", scope));
        let outcomes = runner.run_pending_with_progress(&fleet.execution_context(), |progress| {
            if let RunnerProgress::HostRefreshed { host } = progress {
                spinner.set_message(&format!("Refreshed {}", host.name));
            }
        });

        let mut skipped = Vec::new();
        for outcome in outcomes {
            match outcome.result {
                TaskResult::Refreshed(report) => {
                    spinner.finish_success(&format!(
                        "Refreshed {} hosts, {} statuses updated, {} skipped",
                        report.evaluated,
                        report.written,
                        report.skipped.len()
                    ));
                    skipped.extend(report.skipped);
                }
                TaskResult::Failed { message } => {
                    spinner.finish_error(&format!("{} failed: {}", outcome.summary, message));
                }
                TaskResult::Remediated { .. } => {}
            }
        }

        for host in &skipped {
            ui.warning(&format!("Skipped {}: {}", host.host_id, host.reason));
        }

        if full_refresh {
            let retired = fleet.prune_retired_hosts();
            if retired > 0 {
                ui.message(&format!("Removed statuses of {} retired hosts", retired));
            }
        }

        fleet.save_store()?;
        Ok(CommandResult::success())
    }
}
