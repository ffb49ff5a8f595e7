//! Configuration validation rules.
//!
//! - Hardware version settings must be positive and ordered
//! - The task queue bound must be positive
//! - At least one check must be configured
//! - Classification overrides must name known checks

use crate::checks::CheckKind;
use crate::config::schema::WreckingballConfig;
use crate::error::{Result, WreckingballError};

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
    /// Check slug if the error is check-specific
    pub check: Option<String>,
}

impl ValidationError {
    fn new(rule: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            check: None,
        }
    }

    fn for_check(rule: &str, check: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            check: Some(check.to_string()),
        }
    }
}

/// Validate a configuration and return all errors.
///
/// Check slugs in `checks` are resolved when the registry is built, which
/// reports `UnknownKind` and `DuplicateKind` itself.
pub fn validate_config(config: &WreckingballConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let settings = &config.settings;

    if settings.min_hardware_version == 0 {
        errors.push(ValidationError::new(
            "min-hardware-version",
            "settings.min_hardware_version must be greater than 0".to_string(),
        ));
    }

    if let Some(target) = settings.target_hardware_version {
        if target < settings.min_hardware_version {
            errors.push(ValidationError::new(
                "target-below-minimum",
                format!(
                    "settings.target_hardware_version ({}) is below min_hardware_version ({})",
                    target, settings.min_hardware_version
                ),
            ));
        }
    }

    if settings.max_queued_tasks == 0 {
        errors.push(ValidationError::new(
            "max-queued-tasks",
            "settings.max_queued_tasks must be greater than 0".to_string(),
        ));
    }

    if config.checks.is_empty() {
        errors.push(ValidationError::new(
            "no-checks",
            "at least one status check must be configured".to_string(),
        ));
    }

    for slug in config.classification.keys() {
        if slug.parse::<CheckKind>().is_err() {
            errors.push(ValidationError::for_check(
                "unknown-classification",
                slug,
                format!("classification names unknown status check '{}'", slug),
            ));
        }
    }

    errors
}

/// Validate a configuration, failing with every error joined.
pub fn validate(config: &WreckingballConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(WreckingballError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}
