//! Kaniko executor invocation.
//!
//! Provides:
//! - Assembly of the executor argument vector
//! - Lookup of the executor binary on `PATH`
//! - A supervised, cancellable process launcher

pub mod command;
pub mod error;
pub mod launcher;
pub mod lookup;

pub use command::{BuildInputs, EXECUTOR_BINARY, Invocation, executor_args};
pub use error::BuildError;
pub use launcher::{Launcher, ProcessLauncher, cancelled};
pub use lookup::lookup_executable;
