//! In-process task runner.
//!
//! [`LocalRunner`] queues submitted tasks and executes them when
//! [`LocalRunner::run_pending`] drains the queue. Results flow back through
//! the [`Writeback`] contract exactly as they would from a remote engine.

use chrono::Utc;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{RefreshScope, RemediationAction, TaskDescriptor, TaskHandle, TaskId, TaskRunner};
use crate::checks::{CheckKind, CheckRegistry, StatusValue};
use crate::error::{Result, WreckingballError};
use crate::host::{Host, HostDirectory, HostId, Provider, SnapshotSource};
use crate::store::{PutOutcome, Writeback};

/// Default bound on queued tasks.
pub const DEFAULT_MAX_QUEUED_TASKS: usize = 64;

/// Everything a task needs while it executes.
pub struct ExecutionContext<'a> {
    pub registry: &'a CheckRegistry,
    pub writeback: &'a dyn Writeback,
    pub provider: &'a dyn Provider,
    pub directory: &'a dyn HostDirectory,
}

/// Progress events emitted while draining the queue.
#[derive(Debug)]
pub enum RunnerProgress<'a> {
    /// A task is about to run.
    TaskStarting {
        handle: &'a TaskHandle,
        summary: String,
    },
    /// A host was evaluated during a refresh.
    HostRefreshed { host: &'a Host },
    /// A task finished.
    TaskFinished { outcome: &'a TaskOutcome },
}

/// A host a refresh could not evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedHost {
    pub host_id: HostId,
    pub reason: String,
}

/// What a refresh task did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Hosts whose snapshot was evaluated.
    pub evaluated: usize,
    /// Values that changed the store.
    pub written: usize,
    /// Values discarded because a newer one was stored.
    pub stale: usize,
    /// Hosts that were not evaluated.
    pub skipped: Vec<SkippedHost>,
}

impl RefreshReport {
    fn record(&mut self, outcome: PutOutcome) {
        if outcome.is_applied() {
            self.written += 1;
        } else {
            self.stale += 1;
        }
    }
}

/// Result of one executed task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskResult {
    Refreshed(RefreshReport),
    Remediated {
        /// The re-evaluated status after the action ran.
        value: StatusValue,
        /// False when a newer stored value kept this one out of the store.
        applied: bool,
    },
    Failed {
        message: String,
    },
}

impl TaskResult {
    pub fn is_success(&self) -> bool {
        !matches!(self, TaskResult::Failed { .. })
    }
}

/// A finished task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutcome {
    pub handle: TaskHandle,
    pub summary: String,
    pub result: TaskResult,
}

/// Queue-and-drain task runner.
pub struct LocalRunner {
    queue: Mutex<VecDeque<(TaskHandle, TaskDescriptor)>>,
    max_queued: usize,
    sequence: AtomicU64,
}

impl LocalRunner {
    /// Create a runner that holds at most `max_queued` tasks.
    pub fn new(max_queued: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            max_queued,
            sequence: AtomicU64::new(0),
        }
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Execute every queued task in submission order.
    pub fn run_pending(&self, ctx: &ExecutionContext<'_>) -> Vec<TaskOutcome> {
        self.run_pending_with_progress(ctx, |_| {})
    }

    /// Execute every queued task with a progress callback.
    pub fn run_pending_with_progress<F>(
        &self,
        ctx: &ExecutionContext<'_>,
        mut on_progress: F,
    ) -> Vec<TaskOutcome>
    where
        F: FnMut(RunnerProgress<'_>),
    {
        let mut outcomes = Vec::new();
        // Pop one at a time so tasks submitted meanwhile still run in order.
        while let Some((handle, descriptor)) = self.next() {
            on_progress(RunnerProgress::TaskStarting {
                handle: &handle,
                summary: descriptor.summary(),
            });

            let summary = descriptor.summary();
            let result = match descriptor {
                TaskDescriptor::Refresh { scope } => {
                    TaskResult::Refreshed(refresh(ctx, &scope, &mut on_progress))
                }
                TaskDescriptor::Remediate {
                    host,
                    check_kind,
                    action,
                    ..
                } => match remediate(ctx, &host, check_kind, &action) {
                    Ok((value, outcome)) => TaskResult::Remediated {
                        value,
                        applied: outcome.is_applied(),
                    },
                    Err(e) => {
                        tracing::warn!("Task {} failed: {}", handle.id, e);
                        TaskResult::Failed {
                            message: e.to_string(),
                        }
                    }
                },
            };

            let outcome = TaskOutcome {
                handle,
                summary,
                result,
            };
            on_progress(RunnerProgress::TaskFinished { outcome: &outcome });
            outcomes.push(outcome);
        }
        outcomes
    }

    fn next(&self) -> Option<(TaskHandle, TaskDescriptor)> {
        self.queue.lock().pop_front()
    }

    fn next_id(&self) -> TaskId {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        TaskId::new(format!("task_{}_{}", Utc::now().timestamp_millis(), seq))
    }
}

impl Default for LocalRunner {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_QUEUED_TASKS)
    }
}

impl TaskRunner for LocalRunner {
    fn submit(&self, descriptor: TaskDescriptor) -> Result<TaskHandle> {
        let mut queue = self.queue.lock();
        if queue.len() >= self.max_queued {
            return Err(WreckingballError::TaskSubmission {
                message: format!("task queue is full ({} tasks)", self.max_queued),
            });
        }

        let handle = TaskHandle {
            id: self.next_id(),
            submitted_at: Utc::now(),
        };
        tracing::debug!("Queued task {}: {}", handle.id, descriptor.summary());
        queue.push_back((handle.clone(), descriptor));
        Ok(handle)
    }
}

fn refresh<F>(ctx: &ExecutionContext<'_>, scope: &RefreshScope, on_progress: &mut F) -> RefreshReport
where
    F: FnMut(RunnerProgress<'_>),
{
    let mut report = RefreshReport::default();

    let hosts: Vec<Host> = match scope {
        RefreshScope::All => ctx.directory.hosts(),
        RefreshScope::Hosts(ids) => ids
            .iter()
            .filter_map(|id| match ctx.directory.host(id) {
                Some(host) => Some(host),
                None => {
                    tracing::warn!("Skipping unknown host {}", id);
                    report.skipped.push(SkippedHost {
                        host_id: id.clone(),
                        reason: "not in inventory".to_string(),
                    });
                    None
                }
            })
            .collect(),
    };

    for host in &hosts {
        let snapshot = match ctx.provider.snapshot(&host.id) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", host.name, e);
                report.skipped.push(SkippedHost {
                    host_id: host.id.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        for check in ctx.registry.iter() {
            let value = check.evaluate(&snapshot);
            tracing::debug!("{} {} = {}", host.name, value.check_kind, value.value);
            report.record(ctx.writeback.writeback(value));
        }
        report.evaluated += 1;
        on_progress(RunnerProgress::HostRefreshed { host });
    }

    tracing::info!(
        "Refreshed {} hosts ({} values written, {} skipped)",
        report.evaluated,
        report.written,
        report.skipped.len()
    );
    report
}

fn remediate(
    ctx: &ExecutionContext<'_>,
    host: &Host,
    kind: CheckKind,
    action: &RemediationAction,
) -> Result<(StatusValue, PutOutcome)> {
    let check = ctx.registry.get(kind)?;

    tracing::info!("{} on {}", action.describe(), host.name);
    ctx.provider.apply(&host.id, action)?;

    let snapshot = ctx.provider.snapshot(&host.id)?;
    let value = check.evaluate(&snapshot);
    let outcome = ctx.writeback.writeback(value.clone());
    if outcome.is_applied() {
        tracing::info!("{} of {} is now {}", kind, host.name, value.value);
    } else {
        tracing::warn!(
            "{} of {} evaluated to {} but a newer status is already stored",
            kind,
            host.name,
            value.value
        );
    }
    Ok((value, outcome))
}
