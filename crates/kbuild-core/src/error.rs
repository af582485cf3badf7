//! Error types for the kaniko build action.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse image reference '{0}': invalid reference format")]
    InvalidReference(String),

    #[error("unknown verbosity level: {0}")]
    InvalidVerbosity(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to create artifact info: POST {url} returned HTTP {status}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("artifact info response did not contain a usable id")]
    MissingArtifactId,
}

pub type Result<T> = std::result::Result<T, Error>;
