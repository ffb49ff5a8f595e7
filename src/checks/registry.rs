//! Status check registry.
//!
//! Checks are registered once at startup through a [`CheckRegistryBuilder`]
//! and then frozen into a [`CheckRegistry`]. The frozen registry has no
//! mutating methods, so it can be shared behind an `Arc` and read without
//! locking.

use std::fmt;

use super::{
    CheckKind, CpuHotAddCheck, HardwareVersionCheck, OperatingsystemCheck, SpectreV2Check,
    StatusCheck, ToolsCheck,
};
use crate::config::WreckingballConfig;
use crate::error::{Result, WreckingballError};

/// Collects checks before the registry is frozen.
#[derive(Default)]
pub struct CheckRegistryBuilder {
    checks: Vec<Box<dyn StatusCheck>>,
}

impl CheckRegistryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a check.
    ///
    /// Fails with `DuplicateKind` if a check for the same kind is already
    /// registered.
    pub fn register(&mut self, check: Box<dyn StatusCheck>) -> Result<&mut Self> {
        if self.checks.iter().any(|c| c.kind() == check.kind()) {
            return Err(WreckingballError::DuplicateKind {
                kind: check.kind().to_string(),
            });
        }
        tracing::debug!("Registered status check '{}'", check.kind());
        self.checks.push(check);
        Ok(self)
    }

    /// Freeze the registry.
    pub fn build(self) -> CheckRegistry {
        let mut index = [None; CheckKind::ALL.len()];
        for (position, check) in self.checks.iter().enumerate() {
            index[check.kind().index()] = Some(position);
        }
        CheckRegistry {
            checks: self.checks,
            index,
        }
    }
}

/// Immutable registry of status checks, in registration order.
pub struct CheckRegistry {
    checks: Vec<Box<dyn StatusCheck>>,
    index: [Option<usize>; CheckKind::ALL.len()],
}

impl CheckRegistry {
    /// Start building a registry.
    pub fn builder() -> CheckRegistryBuilder {
        CheckRegistryBuilder::new()
    }

    /// Create a registry with every built-in check and default settings.
    pub fn with_builtins() -> Self {
        let config = WreckingballConfig::default();
        // `CheckKind::ALL` holds each kind once, so no duplicate check needed.
        let checks = CheckKind::ALL
            .into_iter()
            .map(|kind| builtin_check(kind, &config))
            .collect();
        CheckRegistryBuilder { checks }.build()
    }

    /// Create a registry from configuration.
    ///
    /// Checks are registered in the order the configuration lists them.
    /// Unknown slugs fail with `UnknownKind`, repeated ones with
    /// `DuplicateKind`.
    pub fn from_config(config: &WreckingballConfig) -> Result<Self> {
        let mut builder = CheckRegistryBuilder::new();
        for slug in &config.checks {
            let kind: CheckKind = slug.parse()?;
            builder.register(builtin_check(kind, config))?;
        }
        Ok(builder.build())
    }

    /// Registered kinds in registration order.
    pub fn all(&self) -> Vec<CheckKind> {
        self.checks.iter().map(|c| c.kind()).collect()
    }

    /// Iterate over registered checks in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn StatusCheck> {
        self.checks.iter().map(|c| c.as_ref())
    }

    /// Look up a check by slug.
    pub fn lookup(&self, kind: &str) -> Result<&dyn StatusCheck> {
        let parsed: CheckKind = kind.parse()?;
        self.get(parsed)
    }

    /// Look up a check by kind.
    pub fn get(&self, kind: CheckKind) -> Result<&dyn StatusCheck> {
        self.index[kind.index()]
            .map(|position| self.checks[position].as_ref())
            .ok_or_else(|| WreckingballError::UnknownKind {
                kind: kind.to_string(),
            })
    }

    /// Whether a kind is registered.
    pub fn contains(&self, kind: CheckKind) -> bool {
        self.index[kind.index()].is_some()
    }

    /// Number of registered checks.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Whether no checks are registered.
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckRegistry")
            .field("checks", &self.all())
            .finish()
    }
}

fn builtin_check(kind: CheckKind, config: &WreckingballConfig) -> Box<dyn StatusCheck> {
    let policy = config.unknown_policy(kind);
    match kind {
        CheckKind::Tools => Box::new(ToolsCheck::new(policy)),
        CheckKind::OsCompat => Box::new(OperatingsystemCheck::new(policy)),
        CheckKind::CpuHotAdd => Box::new(CpuHotAddCheck::new(policy)),
        CheckKind::SpectreV2 => Box::new(SpectreV2Check::new(policy)),
        CheckKind::HardwareVersion => Box::new(HardwareVersionCheck::new(
            config.settings.min_hardware_version,
            config.settings.target_hardware_version,
            policy,
        )),
    }
}
