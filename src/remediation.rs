//! Remediation orchestration.
//!
//! A remediation request moves through `Requested -> Validated -> Submitted`
//! or ends `Rejected`. The states are types: [`Remediator::prepare`] either
//! rejects or yields a validated [`RemediationRequest`], and
//! [`Remediator::submit`] consumes it.

use crate::checks::{CheckKind, CheckRegistry, StatusCheck, StatusValue};
use crate::error::{Result, WreckingballError};
use crate::host::{Host, HostDirectory, HostId};
use crate::store::StatusStore;
use crate::tasks::{RemediationAction, TaskDescriptor, TaskHandle, TaskRunner};

/// A validated remediation request, ready for submission.
///
/// Only constructed when the check supports remediation and the current
/// status is non-compliant.
#[derive(Debug, Clone, PartialEq)]
pub struct RemediationRequest {
    host: Host,
    check_kind: CheckKind,
    action: RemediationAction,
    requested_value: StatusValue,
}

impl RemediationRequest {
    /// Validate a request through the check's remediation gate.
    pub fn new(check: &dyn StatusCheck, host: &Host, current: &StatusValue) -> Result<Self> {
        match check.build_remediation_task(host, current)? {
            TaskDescriptor::Remediate {
                host,
                check_kind,
                action,
                issued_against,
            } => Ok(Self {
                host,
                check_kind,
                action,
                requested_value: issued_against,
            }),
            TaskDescriptor::Refresh { .. } => Err(WreckingballError::NotRemediable {
                host: host.id.to_string(),
                kind: check.kind().to_string(),
                reason: "check produced a refresh task".to_string(),
            }),
        }
    }

    /// The host being remediated.
    pub fn host(&self) -> &Host {
        &self.host
    }

    /// The check being remediated.
    pub fn check_kind(&self) -> CheckKind {
        self.check_kind
    }

    /// The non-compliant status the request was issued against.
    pub fn requested_value(&self) -> &StatusValue {
        &self.requested_value
    }

    /// The action the task will perform.
    pub fn action(&self) -> RemediationAction {
        self.action
    }

    fn into_descriptor(self) -> TaskDescriptor {
        TaskDescriptor::Remediate {
            host: self.host,
            check_kind: self.check_kind,
            action: self.action,
            issued_against: self.requested_value,
        }
    }
}

/// What a remediation would do, shown before it is scheduled.
#[derive(Debug, Clone, PartialEq)]
pub struct RemediationPreview {
    pub request: RemediationRequest,
    pub action: RemediationAction,
    /// Whether the VM is powered off while the action runs.
    pub requires_power_off: bool,
}

/// Validates remediation requests and submits them to a task runner.
pub struct Remediator<'a> {
    registry: &'a CheckRegistry,
    store: &'a StatusStore,
    directory: &'a dyn HostDirectory,
    runner: &'a dyn TaskRunner,
}

impl<'a> Remediator<'a> {
    pub fn new(
        registry: &'a CheckRegistry,
        store: &'a StatusStore,
        directory: &'a dyn HostDirectory,
        runner: &'a dyn TaskRunner,
    ) -> Self {
        Self {
            registry,
            store,
            directory,
            runner,
        }
    }

    /// Validate a remediation without submitting it.
    ///
    /// Fails with `HostNotFound`, `UnknownKind` or `NotRemediable`.
    pub fn prepare(&self, host_id: &HostId, kind: &str) -> Result<RemediationPreview> {
        let host = self
            .directory
            .host(host_id)
            .ok_or_else(|| WreckingballError::HostNotFound {
                host: host_id.to_string(),
            })?;
        let check = self.registry.lookup(kind)?;

        let current = self.store.get(host_id, check.kind()).ok_or_else(|| {
            WreckingballError::NotRemediable {
                host: host_id.to_string(),
                kind: check.kind().to_string(),
                reason: "no status recorded".to_string(),
            }
        })?;

        let request = match RemediationRequest::new(check, &host, &current) {
            Ok(request) => request,
            Err(e) => {
                tracing::info!("Rejected remediation of {} on {}: {}", check.kind(), host.name, e);
                return Err(e);
            }
        };
        tracing::debug!(
            "Validated remediation of {} on {} ({})",
            check.kind(),
            host.name,
            current.value
        );

        let action = request.action();
        Ok(RemediationPreview {
            request,
            action,
            requires_power_off: action.requires_power_off(),
        })
    }

    /// Submit a validated request. Exactly one task is submitted.
    ///
    /// Runner failures surface as `TaskSubmission` and are not retried.
    pub fn submit(&self, request: RemediationRequest) -> Result<TaskHandle> {
        let host = request.host().name.clone();
        let kind = request.check_kind();

        let handle = self
            .runner
            .submit(request.into_descriptor())
            .map_err(|e| match e {
                WreckingballError::TaskSubmission { .. } => e,
                other => WreckingballError::TaskSubmission {
                    message: other.to_string(),
                },
            })?;

        tracing::info!("Remediation task {} submitted for {} on {}", handle.id, kind, host);
        Ok(handle)
    }

    /// Validate and submit a remediation.
    pub fn schedule(&self, host_id: &HostId, kind: &str) -> Result<TaskHandle> {
        let preview = self.prepare(host_id, kind)?;
        self.submit(preview.request)
    }
}
