//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::checks::StatusCode;
use crate::ui::OutputMode;

/// Wreckingball - Fleet compliance status and remediation.
#[derive(Debug, Parser)]
#[command(name = "wreckingball")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides default .wreckingball/config.yml)
    #[arg(short, long, global = true, env = "WRECKINGBALL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides discovery from the current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// No output except errors
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub silent: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Never prompt; use defaults or WRECKINGBALL_PROMPT_* answers
    #[arg(long, global = true)]
    pub non_interactive: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Output mode selected by `--quiet` or `--silent`.
    pub fn output_mode(&self) -> OutputMode {
        if self.silent {
            OutputMode::Silent
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show compliance counts per check (default if no command specified)
    Status(StatusArgs),

    /// List hosts with a recorded status for one check
    Hosts(HostsArgs),

    /// Schedule remediation of one host's non-compliant status
    Remediate(RemediateArgs),

    /// Re-evaluate every check for the fleet or selected hosts
    Refresh(RefreshArgs),

    /// List registered status checks
    Checks(ChecksArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `hosts` command.
#[derive(Debug, Clone, clap::Args)]
pub struct HostsArgs {
    /// Check slug (e.g. hardware-version)
    pub kind: String,

    /// Only hosts with this status (e.g. out_of_date)
    #[arg(long, conflicts_with = "non_compliant")]
    pub status: Option<StatusCode>,

    /// Only hosts whose status is non-compliant
    #[arg(long)]
    pub non_compliant: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `remediate` command.
#[derive(Debug, Clone, clap::Args)]
pub struct RemediateArgs {
    /// Host ID
    pub host: String,

    /// Check slug (e.g. hardware-version)
    pub kind: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Show what would be done without scheduling
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `refresh` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RefreshArgs {
    /// Only refresh these hosts (repeatable)
    #[arg(long = "host")]
    pub hosts: Vec<String>,
}

/// Arguments for the `checks` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ChecksArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_hosts_with_status_filter() {
        let cli = Cli::parse_from([
            "wreckingball",
            "hosts",
            "hardware-version",
            "--status",
            "out_of_date",
        ]);
        match cli.command {
            Some(Commands::Hosts(args)) => {
                assert_eq!(args.kind, "hardware-version");
                assert_eq!(args.status, Some(StatusCode::OutOfDate));
                assert!(!args.non_compliant);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn status_filter_conflicts_with_non_compliant() {
        let result = Cli::try_parse_from([
            "wreckingball",
            "hosts",
            "tools",
            "--status",
            "ok",
            "--non-compliant",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_status_code() {
        let result = Cli::try_parse_from(["wreckingball", "hosts", "tools", "--status", "meh"]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_repeated_refresh_hosts() {
        let cli = Cli::parse_from(["wreckingball", "refresh", "--host", "1", "--host", "2"]);
        match cli.command {
            Some(Commands::Refresh(args)) => assert_eq!(args.hosts, vec!["1", "2"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["wreckingball", "status", "--quiet", "--debug"]);
        assert!(cli.quiet);
        assert!(cli.debug);
    }

    #[test]
    fn output_mode_from_flags() {
        let cli = Cli::parse_from(["wreckingball", "status"]);
        assert_eq!(cli.output_mode(), OutputMode::Normal);
        let cli = Cli::parse_from(["wreckingball", "-q", "status"]);
        assert_eq!(cli.output_mode(), OutputMode::Quiet);
        let cli = Cli::parse_from(["wreckingball", "refresh", "--silent"]);
        assert_eq!(cli.output_mode(), OutputMode::Silent);
    }

    #[test]
    fn quiet_conflicts_with_silent() {
        assert!(Cli::try_parse_from(["wreckingball", "--quiet", "--silent", "status"]).is_err());
    }
}
