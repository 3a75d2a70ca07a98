#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for flowtidy
//!
//! Only one remote concern exists: asking the local workflow engine whether
//! it is up before a bulk import.

mod client;
mod health;

pub use client::{NetClient, NetConfig};
pub use health::{resolve_health, HealthProbe, HttpHealthProbe};

