//! Artifact info records and the reporting client trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ParsedReference, Result};

/// Artifact type reported for container images.
pub const DOCKER_ARTIFACT_TYPE: &str = "docker";

/// One published image, as reported to the platform.
///
/// Field names follow the platform API, which mixes camel and snake case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedArtifact {
    #[serde(rename = "runId")]
    pub run_id: String,
    pub run_attempt: String,
    /// Repository name.
    pub name: String,
    /// Tag or digest.
    pub version: String,
    /// Fully qualified image reference.
    pub url: String,
    #[serde(rename = "type")]
    pub artifact_type: String,
    /// Content digest of the built image, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl PublishedArtifact {
    /// Build a docker artifact record for a parsed destination.
    pub fn docker(
        reference: &ParsedReference,
        run_id: impl Into<String>,
        run_attempt: impl Into<String>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            run_attempt: run_attempt.into(),
            name: reference.name.clone(),
            version: reference.version.clone(),
            url: reference.canonical(),
            artifact_type: DOCKER_ARTIFACT_TYPE.to_string(),
            digest: None,
        }
    }

    pub fn with_digest(mut self, digest: Option<String>) -> Self {
        self.digest = digest;
        self
    }
}

/// Body returned by the platform for a created artifact info.
///
/// The id is kept as raw JSON so string and numeric ids are both accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtifactInfoResponse {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

impl ArtifactInfoResponse {
    /// The id as text, if it is a non-empty string or a number.
    pub fn artifact_id(&self) -> Option<String> {
        match self.id.as_ref()? {
            serde_json::Value::String(id) if !id.is_empty() => Some(id.clone()),
            serde_json::Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

/// Client for the platform's artifact info endpoint.
#[async_trait]
pub trait ArtifactInfoClient: Send + Sync {
    /// Create one artifact info record and return the id assigned to it.
    async fn create(
        &self,
        endpoint: &Url,
        token: &str,
        artifact: &PublishedArtifact,
    ) -> Result<String>;
}
