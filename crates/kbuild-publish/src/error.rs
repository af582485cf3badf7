//! Publication errors.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while writing output files after a successful build.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("read kaniko image digest {}: {source}", path.display())]
    DigestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write {name} output: {source}")]
    Write {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while reporting artifact infos.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("artifact info client is not configured")]
    ClientUnavailable,

    #[error("destinations is empty")]
    NoDestinations,

    #[error("destination is empty")]
    EmptyDestination,

    #[error("failed to send artifact info because of missing {0} environment variable")]
    MissingEnv(&'static str),

    #[error("invalid API URL '{url}': {source}")]
    InvalidApiUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Api(#[from] kbuild_core::Error),

    #[error("output directory is not configured, cannot write artifact-ids output")]
    MissingOutputDir,

    #[error("encode artifact ids: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Output(#[from] OutputError),
}
