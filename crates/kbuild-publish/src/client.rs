//! HTTP client for the platform's artifact info API.

use async_trait::async_trait;
use kbuild_core::artifact::{ArtifactInfoClient, ArtifactInfoResponse, PublishedArtifact};
use kbuild_core::{Error, Result};
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

/// Artifact info client backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct HttpArtifactClient {
    client: reqwest::Client,
}

impl HttpArtifactClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArtifactInfoClient for HttpArtifactClient {
    async fn create(
        &self,
        endpoint: &Url,
        token: &str,
        artifact: &PublishedArtifact,
    ) -> Result<String> {
        debug!(endpoint = %endpoint, name = %artifact.name, version = %artifact.version, "Posting artifact info");

        let response = self
            .client
            .post(endpoint.clone())
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json")
            .json(artifact)
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;

        // The API answers 200 on creation; anything else is a failure.
        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::UnexpectedStatus {
                url: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body: ArtifactInfoResponse = response
            .json()
            .await
            .map_err(|e| Error::Request(format!("decode artifact info response: {}", e)))?;

        body.artifact_id().ok_or(Error::MissingArtifactId)
    }
}
