//! Status types produced by checks.
//!
//! Each evaluation produces a [`StatusValue`] carrying one [`StatusCode`].
//! The owning check decides how that code is classified.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::CheckKind;
use crate::host::{HostId, HostSnapshot};

/// Outcome code of a single check evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    Ok,
    OutOfDate,
    NotRunning,
    NotInstalled,
    Mismatch,
    PerformanceDegraded,
    Missing,
    Unknown,
    NotApplicable,
}

impl StatusCode {
    const ALL: [StatusCode; 9] = [
        StatusCode::Ok,
        StatusCode::OutOfDate,
        StatusCode::NotRunning,
        StatusCode::NotInstalled,
        StatusCode::Mismatch,
        StatusCode::PerformanceDegraded,
        StatusCode::Missing,
        StatusCode::Unknown,
        StatusCode::NotApplicable,
    ];

    /// Machine-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCode::Ok => "ok",
            StatusCode::OutOfDate => "out_of_date",
            StatusCode::NotRunning => "not_running",
            StatusCode::NotInstalled => "not_installed",
            StatusCode::Mismatch => "mismatch",
            StatusCode::PerformanceDegraded => "performance_degraded",
            StatusCode::Missing => "missing",
            StatusCode::Unknown => "unknown",
            StatusCode::NotApplicable => "not_applicable",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::OutOfDate => "Out of date",
            StatusCode::NotRunning => "Not running",
            StatusCode::NotInstalled => "Not installed",
            StatusCode::Mismatch => "Mismatch",
            StatusCode::PerformanceDegraded => "Performance degraded",
            StatusCode::Missing => "Missing",
            StatusCode::Unknown => "Unknown",
            StatusCode::NotApplicable => "Not applicable",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StatusCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        StatusCode::ALL
            .into_iter()
            .find(|code| code.as_str() == normalized)
            .ok_or_else(|| format!("unknown status value: {}", s))
    }
}

/// Dashboard bucket of a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Compliant,
    NonCompliant,
    Unknown,
}

/// How a check counts `unknown` results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownPolicy {
    /// Report unknown results in their own bucket.
    #[default]
    Unknown,
    /// Count unknown results as violations.
    NonCompliant,
}

impl UnknownPolicy {
    /// The classification this policy gives to `unknown`.
    pub fn classify(&self) -> Classification {
        match self {
            UnknownPolicy::Unknown => Classification::Unknown,
            UnknownPolicy::NonCompliant => Classification::NonCompliant,
        }
    }
}

/// Display severity, mirroring a host's global status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Ok,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Ok => write!(f, "ok"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// The last-known evaluation result for one (host, check) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusValue {
    pub host_id: HostId,
    pub check_kind: CheckKind,
    pub value: StatusCode,
    pub evaluated_at: DateTime<Utc>,
    /// Free-form diagnostic text.
    #[serde(default)]
    pub detail: String,
}

impl StatusValue {
    /// Create a status value.
    pub fn new(
        host_id: HostId,
        check_kind: CheckKind,
        value: StatusCode,
        evaluated_at: DateTime<Utc>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            host_id,
            check_kind,
            value,
            evaluated_at,
            detail: detail.into(),
        }
    }

    /// Create a status value for the host and time of a snapshot.
    pub fn from_snapshot(
        snapshot: &HostSnapshot,
        check_kind: CheckKind,
        value: StatusCode,
        detail: impl Into<String>,
    ) -> Self {
        Self::new(
            snapshot.host_id.clone(),
            check_kind,
            value,
            snapshot.taken_at,
            detail,
        )
    }

    /// Whether two values describe the same outcome, ignoring when they
    /// were evaluated.
    pub fn same_outcome(&self, other: &StatusValue) -> bool {
        self.host_id == other.host_id
            && self.check_kind == other.check_kind
            && self.value == other.value
            && self.detail == other.detail
    }
}
