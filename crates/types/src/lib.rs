#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for flowtidy
//!
//! This crate provides the workflow document model, operation reports and
//! the small value enums shared between configuration and the CLI.

pub mod reports;
pub mod workflow;

// Re-export commonly used types
pub use reports::{
    CategoryEntry, DedupeReport, DuplicateGroup, FileError, ImportLog, ImportLogEntry,
    ImportReport, ImportStatus, ImportTally, NameGroup, OrphanInfo, RepairReport, RepairTally,
    SiteReport, SkippedFile, WorkflowAnalysis,
};
pub use workflow::{
    ConnectionTarget, Connections, Node, NodeOutputs, NodeRole, OutputSlot, Workflow,
    MAIN_CONNECTION,
};

use serde::{Deserialize, Serialize};

/// Connection repair policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RepairMode {
    /// Remove orphaned error-handler and documentation nodes only
    #[default]
    Minimal,
    /// Splice every orphan into a chain so none remain
    Aggressive,
}

impl std::fmt::Display for RepairMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Minimal => write!(f, "minimal"),
            Self::Aggressive => write!(f, "aggressive"),
        }
    }
}

/// What to do when the engine health endpoint cannot be reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum HealthPolicy {
    /// Log a warning and carry on
    #[default]
    AssumeAvailable,
    /// Abort the batch
    Require,
}

/// Result of probing the engine health endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    /// Unreachable, but the policy allowed the batch to proceed
    Assumed { reason: String },
    Unreachable { reason: String },
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Plain,
    #[default]
    Tty,
    Json,
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    #[default]
    Auto,
    Never,
}

// Implement clap::ValueEnum for ColorChoice
impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}
