//! Core domain for the command center.
//!
//! Projects live under `<home>/workspace`; the registry, config and vault sit
//! beside it. The build orchestrator runs install + build/dev through a
//! [`runner::ProcessRunner`], hands failures to a [`repair::RepairInvoker`]
//! and retries once. The synchronizer reconciles project directories with
//! git remotes through the same runner.

pub mod agent;
pub mod cache;
pub mod config;
pub mod error;
pub mod executor;
pub mod io;
pub mod lock;
pub mod orchestrator;
pub mod paths;
pub mod registry;
pub mod repair;
pub mod runner;
pub mod sync;
pub mod types;
pub mod vault;

pub use error::{CcError, Result};
