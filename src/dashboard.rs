//! Fleet compliance dashboard.
//!
//! Read-only aggregation over the status store: per-check compliance counts
//! and per-check host listings.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::checks::{CheckKind, CheckRegistry, Classification, Severity, StatusCheck, StatusCode};
use crate::error::Result;
use crate::host::{HostDirectory, HostId};
use crate::store::StatusStore;

/// Compliance counts for one check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub compliant: usize,
    pub non_compliant: usize,
    pub unknown: usize,
}

impl StatusCounts {
    /// Number of hosts with a recorded value.
    pub fn total(&self) -> usize {
        self.compliant + self.non_compliant + self.unknown
    }

    fn record(&mut self, classification: Classification) {
        match classification {
            Classification::Compliant => self.compliant += 1,
            Classification::NonCompliant => self.non_compliant += 1,
            Classification::Unknown => self.unknown += 1,
        }
    }
}

/// Dashboard entry for one registered check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub kind: CheckKind,
    pub label: String,
    pub counts: StatusCounts,
}

/// Counts for every registered check, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub checks: Vec<CheckSummary>,
}

impl Summary {
    /// Counts for one kind, if it is registered.
    pub fn get(&self, kind: CheckKind) -> Option<&StatusCounts> {
        self.checks
            .iter()
            .find(|c| c.kind == kind)
            .map(|c| &c.counts)
    }

    /// Non-compliant values across all checks.
    pub fn total_non_compliant(&self) -> usize {
        self.checks.iter().map(|c| c.counts.non_compliant).sum()
    }
}

/// One host in a per-check listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostStatusRow {
    pub host_id: HostId,
    pub host_name: String,
    pub value: StatusCode,
    pub severity: Severity,
    pub detail: String,
    pub evaluated_at: DateTime<Utc>,
}

/// Read-only view over the status store.
pub struct Dashboard<'a> {
    registry: &'a CheckRegistry,
    store: &'a StatusStore,
    directory: &'a dyn HostDirectory,
}

impl<'a> Dashboard<'a> {
    pub fn new(
        registry: &'a CheckRegistry,
        store: &'a StatusStore,
        directory: &'a dyn HostDirectory,
    ) -> Self {
        Self {
            registry,
            store,
            directory,
        }
    }

    /// Compliance counts for every registered check.
    ///
    /// Checks without recorded values report zero counts.
    pub fn summary(&self) -> Summary {
        let checks = self
            .registry
            .iter()
            .map(|check| {
                let mut counts = StatusCounts::default();
                for (_, value) in self.store.query(check.kind(), None) {
                    counts.record(check.classify(value.value));
                }
                CheckSummary {
                    kind: check.kind(),
                    label: check.label().to_string(),
                    counts,
                }
            })
            .collect();
        Summary { checks }
    }

    /// Hosts with a recorded value for a check, optionally only those with
    /// one status code.
    ///
    /// Sorted by host name, case-insensitively, then by host ID. Fails with
    /// `UnknownKind` when the check is not registered.
    pub fn hosts_for(&self, kind: &str, filter: Option<StatusCode>) -> Result<Vec<HostStatusRow>> {
        let check = self.registry.lookup(kind)?;
        Ok(self.rows(check, filter, |_| true))
    }

    /// Hosts whose value for a check is non-compliant.
    pub fn non_compliant_hosts(&self, kind: &str) -> Result<Vec<HostStatusRow>> {
        let check = self.registry.lookup(kind)?;
        Ok(self.rows(check, None, |code| {
            check.classify(code) == Classification::NonCompliant
        }))
    }

    /// Worst severity over every registered check of one host.
    pub fn host_severity(&self, host_id: &HostId) -> Severity {
        self.registry
            .iter()
            .filter_map(|check| {
                self.store
                    .get(host_id, check.kind())
                    .map(|value| check.severity(value.value))
            })
            .max()
            .unwrap_or(Severity::Ok)
    }

    fn rows<F>(&self, check: &dyn StatusCheck, filter: Option<StatusCode>, keep: F) -> Vec<HostStatusRow>
    where
        F: Fn(StatusCode) -> bool,
    {
        let mut rows: Vec<HostStatusRow> = self
            .store
            .query(check.kind(), filter)
            .into_iter()
            .filter(|(_, value)| keep(value.value))
            .map(|(host_id, value)| {
                let host_name = self
                    .directory
                    .host(&host_id)
                    .map(|host| host.name)
                    .unwrap_or_else(|| host_id.to_string());
                HostStatusRow {
                    host_id,
                    host_name,
                    value: value.value,
                    severity: check.severity(value.value),
                    detail: value.detail,
                    evaluated_at: value.evaluated_at,
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            a.host_name
                .to_lowercase()
                .cmp(&b.host_name.to_lowercase())
                .then_with(|| a.host_id.cmp(&b.host_id))
        });
        rows
    }
}
