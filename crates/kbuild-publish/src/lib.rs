//! Publication of build results.
//!
//! - Output files derived from the image digest
//! - Artifact info reporting to the platform API

pub mod client;
pub mod error;
pub mod outputs;
pub mod reporter;

pub use client::HttpArtifactClient;
pub use error::{OutputError, ReportError};
pub use outputs::{OutputSet, materialize};
pub use reporter::ArtifactReporter;
