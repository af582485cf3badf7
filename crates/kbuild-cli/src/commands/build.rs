//! The build command.

use anyhow::{Context, Result};
use kbuild_config::{DockerConfigJson, PlatformSettings, resolve_registry_map};
use kbuild_core::artifact::ArtifactInfoClient;
use kbuild_core::{BuildRequest, Environment};
use kbuild_executor::{BuildError, BuildInputs, Invocation, Launcher, cancelled, executor_args};
use kbuild_publish::{ArtifactReporter, OutputSet, materialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// What a finished build produced.
#[derive(Debug, Default)]
pub struct BuildOutcome {
    /// Set when an output directory is configured.
    pub outputs: Option<OutputSet>,
    /// Set when artifact info was requested and reporting succeeded.
    pub artifact_ids: Option<BTreeMap<String, String>>,
}

/// Runs one image build from request to reported artifacts.
pub struct BuildPipeline {
    executable: PathBuf,
    launcher: Arc<dyn Launcher>,
    env: Arc<dyn Environment>,
    client: Option<Arc<dyn ArtifactInfoClient>>,
}

impl BuildPipeline {
    /// `executable` must already be resolved on `PATH`.
    pub fn new(
        executable: impl Into<PathBuf>,
        launcher: Arc<dyn Launcher>,
        env: Arc<dyn Environment>,
    ) -> Self {
        Self {
            executable: executable.into(),
            launcher,
            env,
            client: None,
        }
    }

    pub fn with_client(mut self, client: Arc<dyn ArtifactInfoClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub async fn run(
        &self,
        request: &BuildRequest,
        cancel: &mut broadcast::Receiver<()>,
    ) -> Result<BuildOutcome> {
        let settings = PlatformSettings::from_env(self.env.as_ref());
        debug!(?settings, "Loaded platform settings");

        if let Some(raw) = request.docker_config_json.as_deref().filter(|raw| !raw.is_empty()) {
            DockerConfigJson::install(raw, &settings.docker_config_dir)
                .context("failed to install docker credentials")?;
        }

        let registry_map = resolve_registry_map(settings.registry_config.as_deref())
            .context("failed to resolve registry mirrors")?;

        let digest_file = settings.digest_file();
        let inputs = BuildInputs {
            build_args: settings.build_args(),
            labels: settings.labels(),
            registry_map,
            digest_file: digest_file.clone(),
        };
        let args = executor_args(request, &inputs).context("failed to build kaniko command")?;

        let invocation = Invocation::new(self.executable.clone(), args, self.env.as_ref());
        info!(command = %invocation, "Running command");

        self.launcher
            .launch(&invocation, cancel)
            .await
            .context("run kaniko")?;

        let mut outcome = BuildOutcome::default();

        if let (Some(outputs_dir), Some(digest_file)) = (&settings.outputs_dir, &digest_file) {
            let outputs = materialize(outputs_dir, digest_file, &request.first_destination())
                .context("failed to write action outputs")?;
            outcome.outputs = Some(outputs);
        }

        if request.send_artifact_info {
            let reporter = ArtifactReporter::new(self.client.clone(), &settings);
            let image_ref = outcome.outputs.as_ref().map(|o| o.image.as_str());

            let destinations = request.destinations();
            let report = reporter.report(
                &destinations,
                image_ref,
                settings.run_id.as_deref(),
                settings.run_attempt.as_deref(),
            );

            let result = tokio::select! {
                result = report => result,
                _ = cancelled(cancel) => {
                    warn!("Cancellation requested, abandoning artifact info reporting");
                    return Err(anyhow::Error::new(BuildError::Cancelled).context("send artifact info"));
                }
            };

            match result {
                Ok(ids) => outcome.artifact_ids = Some(ids),
                // The image is already pushed; a reporting failure does not fail the build.
                Err(e) => warn!(error = %e, "Failed to send artifact info"),
            }
        }

        Ok(outcome)
    }
}
