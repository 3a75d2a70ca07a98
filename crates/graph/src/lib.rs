#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Node-connection graph analysis for workflow documents
//!
//! A node is orphaned when its name appears neither as a connection source
//! nor as a connection target. This crate finds orphans, classifies nodes,
//! applies the repair policies and runs the structural checks used before
//! import. Everything here is synchronous and operates on one document.

mod analysis;
mod classify;
mod repair;
mod validate;

pub use analysis::{coverage_percent, Connectivity};
pub use classify::{classify, is_trigger_type, AUXILIARY_ID_PREFIXES};
pub use repair::{repair, RepairOutcome, RepairStatus};
pub use validate::{validate_for_import, ValidationIssue, MAX_ORPHAN_RATIO};
