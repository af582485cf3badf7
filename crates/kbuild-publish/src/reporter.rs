//! Artifact info reporting.
//!
//! Each destination is reported with its own request, in order. Reporting
//! stops at the first failure so the `artifact-ids` output never holds a
//! partial mapping.

use kbuild_config::PlatformSettings;
use kbuild_config::settings::{API_TOKEN_ENV, API_URL_ENV, RUN_ATTEMPT_ENV, RUN_ID_ENV};
use kbuild_core::ParsedReference;
use kbuild_core::artifact::{ArtifactInfoClient, PublishedArtifact};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use url::Url;

use crate::ReportError;
use crate::outputs::write_output;

/// Path of the artifact info endpoint, relative to the API base URL.
pub const ARTIFACT_INFO_PATH: &str = "/v2/workflows/runs/artifactinfos";
/// Output file holding the destination to artifact id mapping.
pub const ARTIFACT_IDS_OUTPUT: &str = "artifact-ids";

/// Reports published images to the platform.
pub struct ArtifactReporter {
    client: Option<Arc<dyn ArtifactInfoClient>>,
    api_url: Option<String>,
    api_token: Option<String>,
    outputs_dir: Option<PathBuf>,
}

impl ArtifactReporter {
    pub fn new(client: Option<Arc<dyn ArtifactInfoClient>>, settings: &PlatformSettings) -> Self {
        Self {
            client,
            api_url: settings.api_url.clone(),
            api_token: settings.api_token.clone(),
            outputs_dir: settings.outputs_dir.clone(),
        }
    }

    /// Report every destination and write the resulting ids.
    ///
    /// `image_ref` is the computed image reference; its digest (the text
    /// after the last `@`) is attached to each record.
    pub async fn report(
        &self,
        destinations: &[String],
        image_ref: Option<&str>,
        run_id: Option<&str>,
        run_attempt: Option<&str>,
    ) -> Result<BTreeMap<String, String>, ReportError> {
        let client = self.client.as_ref().ok_or(ReportError::ClientUnavailable)?;
        if destinations.is_empty() {
            return Err(ReportError::NoDestinations);
        }
        let api_url = required(self.api_url.as_deref(), API_URL_ENV)?;
        let token = required(self.api_token.as_deref(), API_TOKEN_ENV)?;
        let run_id = required(run_id, RUN_ID_ENV)?;
        let run_attempt = required(run_attempt, RUN_ATTEMPT_ENV)?;

        let endpoint = artifact_info_endpoint(api_url)?;
        let digest = image_ref.and_then(digest_of);

        let mut ids = BTreeMap::new();
        for destination in destinations {
            let destination = destination.trim();
            if destination.is_empty() {
                return Err(ReportError::EmptyDestination);
            }

            let reference = ParsedReference::parse(destination)?;
            let artifact = PublishedArtifact::docker(&reference, run_id, run_attempt)
                .with_digest(digest.clone());

            let id = client.create(&endpoint, token, &artifact).await?;
            info!(destination = %destination, id = %id, "Created artifact info");
            ids.insert(destination.to_string(), id);
        }

        let outputs_dir = self
            .outputs_dir
            .as_ref()
            .ok_or(ReportError::MissingOutputDir)?;
        let encoded = serde_json::to_string(&ids)?;
        write_output(outputs_dir, ARTIFACT_IDS_OUTPUT, &encoded)?;

        Ok(ids)
    }
}

fn required<'a>(value: Option<&'a str>, var: &'static str) -> Result<&'a str, ReportError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ReportError::MissingEnv(var))
}

/// Join the artifact info path onto the API base URL.
pub fn artifact_info_endpoint(api_url: &str) -> Result<Url, ReportError> {
    let mut url = Url::parse(api_url).map_err(|source| ReportError::InvalidApiUrl {
        url: api_url.to_string(),
        source,
    })?;
    let path = format!("{}{}", url.path().trim_end_matches('/'), ARTIFACT_INFO_PATH);
    url.set_path(&path);
    Ok(url)
}

fn digest_of(image_ref: &str) -> Option<String> {
    image_ref
        .rsplit_once('@')
        .map(|(_, digest)| digest)
        .filter(|digest| !digest.is_empty())
        .map(str::to_string)
}
