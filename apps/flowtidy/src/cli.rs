//! Command line interface definition

use clap::{Parser, Subcommand};
use flowtidy_types::{ColorChoice, HealthPolicy, RepairMode};
use std::path::PathBuf;

/// flowtidy - maintenance tools for exported workflow JSON
#[derive(Parser)]
#[command(name = "flowtidy")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Deduplicate, repair, import and publish n8n workflow files")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Write structured debug logs to the log directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Answer yes to every confirmation prompt
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Find workflow files with identical content and optionally remove them
    Dedupe {
        /// Workflow directory (defaults to the configured one)
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Only report, never change anything (the default)
        #[arg(long, conflicts_with_all = ["fix_files", "fix_index", "fix_all"])]
        check: bool,

        /// Delete duplicate files, keeping one per group
        #[arg(long)]
        fix_files: bool,

        /// Drop duplicate entries from the category index
        #[arg(long)]
        fix_index: bool,

        /// Same as --fix-files --fix-index
        #[arg(long)]
        fix_all: bool,
    },

    /// Analyze and repair node connections
    #[command(subcommand)]
    Repair(RepairCommands),

    /// Validate and import workflows through the engine CLI
    Import {
        /// Workflow directory (defaults to the configured one)
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Import at most this many files
        #[arg(long, value_name = "N")]
        limit: Option<usize>,

        /// Only look at the top level of the directory
        #[arg(long)]
        no_recursive: bool,

        /// What to do when the engine health check fails
        #[arg(long, value_enum)]
        health_policy: Option<HealthPolicy>,
    },

    /// Refresh timestamps and deployment files of the documentation site
    Site {
        /// Site root (defaults to the configured one)
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum RepairCommands {
    /// Report orphaned nodes of one workflow file
    Check {
        /// Workflow JSON file
        file: PathBuf,
    },

    /// Repair every workflow under a directory
    Run {
        /// Workflow directory (defaults to the configured one)
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Repair policy (defaults to the configured one)
        #[arg(long, value_enum)]
        mode: Option<RepairMode>,

        /// Repair in memory only; nothing is written
        #[arg(long)]
        dry_run: bool,

        /// Process at most this many files
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },
}

impl Commands {
    /// Short operation name used in logs and events
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Dedupe { .. } => "dedupe",
            Commands::Repair(RepairCommands::Check { .. }) => "repair check",
            Commands::Repair(RepairCommands::Run { .. }) => "repair",
            Commands::Import { .. } => "import",
            Commands::Site { .. } => "site",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn fix_all_parses_alongside_globals() {
        let cli = Cli::try_parse_from(["flowtidy", "--yes", "dedupe", "--fix-all", "--json"])
            .unwrap();
        assert!(cli.global.yes);
        assert!(cli.global.json);
        assert!(matches!(cli.command, Commands::Dedupe { fix_all: true, .. }));
    }

    #[test]
    fn check_conflicts_with_fixes() {
        assert!(Cli::try_parse_from(["flowtidy", "dedupe", "--check", "--fix-files"]).is_err());
    }

    #[test]
    fn repair_run_parses_mode() {
        let cli = Cli::try_parse_from([
            "flowtidy", "repair", "run", "--mode", "aggressive", "--dry-run", "--limit", "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Repair(RepairCommands::Run {
                mode,
                dry_run,
                limit,
                ..
            }) => {
                assert_eq!(mode, Some(RepairMode::Aggressive));
                assert!(dry_run);
                assert_eq!(limit, Some(3));
            }
            _ => panic!("expected repair run"),
        }
    }

    #[test]
    fn health_policy_uses_kebab_case() {
        let cli =
            Cli::try_parse_from(["flowtidy", "import", "--health-policy", "assume-available"])
                .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Import {
                health_policy: Some(HealthPolicy::AssumeAvailable),
                ..
            }
        ));
    }
}
