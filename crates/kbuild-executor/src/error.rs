//! Executor errors.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("cannot find {binary} binary on PATH")]
    ExecutableNotFound { binary: String },

    #[error(transparent)]
    InvalidRequest(#[from] kbuild_core::Error),

    #[error("failed to launch {}: {source}", program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("executor failed: {status}")]
    NonZeroExit { status: ExitStatus },

    #[error("build cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
