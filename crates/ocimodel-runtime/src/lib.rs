//! ocimodel-runtime: External command execution
//!
//! This crate runs the collaborators ocimodel delegates to:
//! - Process-based runner for the container engine and artifact tool
//! - Dry-run runner that prints commands instead of executing them

pub mod dryrun;
pub mod process;
pub mod traits;

pub use dryrun::DryRunRunner;
pub use process::ProcessRunner;
pub use traits::{CommandRunner, CommandSpec};
