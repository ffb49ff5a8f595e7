//! Last-known status per (host, check).
//!
//! The [`StatusStore`] holds at most one [`StatusValue`] per key. Values are
//! partitioned by check kind, so dashboard queries only touch one
//! partition, and each partition is sharded by host so writers to
//! different hosts rarely share a lock.
//!
//! Writes to the same key are ordered by `evaluated_at`, never by arrival:
//! an older evaluation finishing late does not replace a newer one.
//!
//! # Modules
//!
//! - [`persist`] - YAML persistence of the keyed status table

pub mod persist;

use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::checks::{CheckKind, StatusCode, StatusValue};
use crate::host::HostId;

const SHARDS: usize = 16;

/// Result of a [`StatusStore::put`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// No value was stored for the key before.
    Inserted,
    /// The stored value was replaced.
    Replaced,
    /// The stored value is newer; nothing changed.
    Stale,
}

impl PutOutcome {
    /// Whether the store changed.
    pub fn is_applied(&self) -> bool {
        !matches!(self, PutOutcome::Stale)
    }
}

/// Receives evaluation results from task runners.
pub trait Writeback: Send + Sync {
    fn writeback(&self, value: StatusValue) -> PutOutcome;
}

struct Partition {
    shards: [RwLock<HashMap<HostId, StatusValue>>; SHARDS],
}

impl Partition {
    fn new() -> Self {
        Self {
            shards: std::array::from_fn(|_| RwLock::new(HashMap::new())),
        }
    }

    fn shard(&self, host_id: &HostId) -> &RwLock<HashMap<HostId, StatusValue>> {
        let mut hasher = DefaultHasher::new();
        host_id.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % SHARDS]
    }
}

/// Concurrent in-memory status table.
pub struct StatusStore {
    partitions: [Partition; CheckKind::ALL.len()],
}

impl StatusStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            partitions: std::array::from_fn(|_| Partition::new()),
        }
    }

    fn partition(&self, kind: CheckKind) -> &Partition {
        &self.partitions[kind.index()]
    }

    /// Get the current value for a host and check.
    pub fn get(&self, host_id: &HostId, kind: CheckKind) -> Option<StatusValue> {
        self.partition(kind).shard(host_id).read().get(host_id).cloned()
    }

    /// Store a value unless a newer one is already stored.
    ///
    /// Equal timestamps overwrite, so re-applying the same evaluation is
    /// idempotent.
    pub fn put(&self, value: StatusValue) -> PutOutcome {
        let shard = self.partition(value.check_kind).shard(&value.host_id);
        let mut map = shard.write();
        match map.get(&value.host_id) {
            Some(existing) if existing.evaluated_at > value.evaluated_at => {
                tracing::debug!(
                    "Ignoring stale {} status for {} ({} < {})",
                    value.check_kind,
                    value.host_id,
                    value.evaluated_at,
                    existing.evaluated_at
                );
                PutOutcome::Stale
            }
            Some(_) => {
                map.insert(value.host_id.clone(), value);
                PutOutcome::Replaced
            }
            None => {
                map.insert(value.host_id.clone(), value);
                PutOutcome::Inserted
            }
        }
    }

    /// All recorded values for a check, optionally only those with one
    /// status code. Sorted by host ID.
    pub fn query(&self, kind: CheckKind, filter: Option<StatusCode>) -> Vec<(HostId, StatusValue)> {
        let mut rows: Vec<(HostId, StatusValue)> = Vec::new();
        for shard in &self.partition(kind).shards {
            let map = shard.read();
            rows.extend(
                map.iter()
                    .filter(|(_, value)| filter.map_or(true, |code| value.value == code))
                    .map(|(host_id, value)| (host_id.clone(), value.clone())),
            );
        }
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }

    /// Number of hosts with a recorded value for a check.
    pub fn count(&self, kind: CheckKind) -> usize {
        self.partition(kind)
            .shards
            .iter()
            .map(|shard| shard.read().len())
            .sum()
    }

    /// Every recorded value of one host, in kind order.
    pub fn values_for_host(&self, host_id: &HostId) -> Vec<StatusValue> {
        CheckKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(host_id, kind))
            .collect()
    }

    /// Drop every value recorded for a host. Returns how many were removed.
    pub fn remove_host(&self, host_id: &HostId) -> usize {
        self.partitions
            .iter()
            .filter(|partition| partition.shard(host_id).write().remove(host_id).is_some())
            .count()
    }

    /// Total number of stored values.
    pub fn len(&self) -> usize {
        CheckKind::ALL.into_iter().map(|kind| self.count(kind)).sum()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every stored value, sorted by kind then host.
    pub fn snapshot(&self) -> Vec<StatusValue> {
        CheckKind::ALL
            .into_iter()
            .flat_map(|kind| self.query(kind, None).into_iter().map(|(_, value)| value))
            .collect()
    }
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Writeback for StatusStore {
    fn writeback(&self, value: StatusValue) -> PutOutcome {
        let host_id = value.host_id.clone();
        let kind = value.check_kind;
        let outcome = self.put(value);
        if !outcome.is_applied() {
            tracing::warn!("Discarded stale {} status for host {}", kind, host_id);
        }
        outcome
    }
}
