//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Commands that read the fleet load
//! it through [`context::Fleet`], so configuration, inventory and status
//! table handling is shared.

pub mod checks;
pub mod completions;
pub mod context;
pub mod dispatcher;
pub mod display;
pub mod hosts;
pub mod refresh;
pub mod remediate;
pub mod status;

pub use context::Fleet;
pub use dispatcher::{Command, CommandDispatcher, CommandResult};
