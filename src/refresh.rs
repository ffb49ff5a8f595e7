//! Refresh orchestration.
//!
//! A refresh asks the task runner to re-evaluate every registered check for
//! the hosts in scope. Each call is an independent submission.

use crate::checks::CheckRegistry;
use crate::error::{Result, WreckingballError};
use crate::tasks::{RefreshScope, TaskDescriptor, TaskHandle, TaskRunner};

/// Submits refresh tasks.
pub struct Refresher<'a> {
    registry: &'a CheckRegistry,
    runner: &'a dyn TaskRunner,
}

impl<'a> Refresher<'a> {
    pub fn new(registry: &'a CheckRegistry, runner: &'a dyn TaskRunner) -> Self {
        Self { registry, runner }
    }

    /// Submit one refresh task for the scope.
    ///
    /// An empty host list is rejected before submission.
    pub fn schedule_refresh(&self, scope: RefreshScope) -> Result<TaskHandle> {
        if let RefreshScope::Hosts(hosts) = &scope {
            if hosts.is_empty() {
                return Err(WreckingballError::ConfigValidationError {
                    message: "refresh scope names no hosts".to_string(),
                });
            }
        }
        if self.registry.is_empty() {
            return Err(WreckingballError::ConfigValidationError {
                message: "no status checks are registered".to_string(),
            });
        }

        let description = scope.to_string();
        let handle = self
            .runner
            .submit(TaskDescriptor::Refresh { scope })
            .map_err(|e| match e {
                WreckingballError::TaskSubmission { .. } => e,
                other => WreckingballError::TaskSubmission {
                    message: other.to_string(),
                },
            })?;

        tracing::info!(
            "Refresh task {} submitted for {} ({} checks)",
            handle.id,
            description,
            self.registry.len()
        );
        Ok(handle)
    }
}
