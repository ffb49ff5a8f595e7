//! Non-interactive UI for CI/headless environments.

use std::collections::HashMap;

use crate::error::Result;

use super::{parse_answer, OutputMode, ProgressSpinner, Prompt, SpinnerHandle, UserInterface};

/// Environment variable prefix for answering prompts without a terminal.
///
/// `WRECKINGBALL_PROMPT_REMEDIATE=yes` answers the prompt with key
/// `remediate`.
pub const PROMPT_ENV_PREFIX: &str = "WRECKINGBALL_PROMPT_";

/// UI implementation for non-interactive mode.
///
/// Prompts are answered from `WRECKINGBALL_PROMPT_*` variables, falling
/// back to the prompt default.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();

        Self {
            mode,
            env_overrides,
        }
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
        }
    }

    fn override_for(&self, key: &str) -> Option<&String> {
        let var = format!("{}{}", PROMPT_ENV_PREFIX, key.to_uppercase().replace('-', "_"));
        self.env_overrides.get(&var)
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn confirm(&mut self, prompt: &Prompt) -> Result<bool> {
        Ok(self
            .override_for(&prompt.key)
            .and_then(|answer| parse_answer(answer))
            .unwrap_or(prompt.default))
    }

    fn start_spinner(&mut self, _message: &str) -> Box<dyn SpinnerHandle> {
        Box::new(ProgressSpinner::hidden())
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}
