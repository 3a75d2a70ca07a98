#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Platform layer for flowtidy
//!
//! - Process execution with a bounded wait, behind the `ProcessOperations`
//!   trait so callers can substitute scripted fakes
//! - Filesystem helpers returning `flowtidy_errors::Error` with the
//!   offending path attached

pub mod fs;
pub mod process;

pub use process::{CommandOutput, PlatformCommand, ProcessOperations, TokioProcessOperations};
