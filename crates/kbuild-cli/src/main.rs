//! Build and push container images with the kaniko executor.

use clap::Parser;
use kbuild_core::{BuildRequest, Environment, ProcessEnvironment};
use kbuild_executor::{EXECUTOR_BINARY, ProcessLauncher, lookup_executable};
use kbuild_publish::HttpArtifactClient;
use std::ffi::OsString;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod commands;
mod signal;

use commands::build::BuildPipeline;

#[derive(Parser, Debug)]
#[command(name = "kaniko-action")]
#[command(about = "Build and push container images using Kaniko", long_about = None)]
struct Cli {
    /// Path to the Dockerfile to build
    #[arg(long, default_value = "")]
    dockerfile: String,

    /// Path to the build context
    #[arg(long, default_value = "")]
    context: String,

    /// Comma separated destinations of the built image
    #[arg(long, default_value = "")]
    destination: String,

    /// Comma separated registry mirrors to find images
    #[arg(long, default_value = "")]
    registry_mirrors: String,

    /// Fail if an image is not found on the registry mirrors
    #[arg(long)]
    skip_default_registry_fallback: bool,

    /// Verbosity level of the kaniko executor
    #[arg(long, default_value = "debug")]
    verbosity: String,

    /// Target stage to build in a multi-stage Dockerfile
    #[arg(long, default_value = "")]
    target: String,

    /// Save the image as a tar file at this path
    #[arg(long, default_value = "")]
    tar_path: String,

    /// Report the pushed images to the platform
    #[arg(long)]
    send_artifact_info: bool,

    /// Docker config.json holding registry credentials
    #[arg(long, env = "DOCKER_CONFIG_JSON", hide_env_values = true)]
    docker_config_json: Option<String>,
}

impl Cli {
    fn into_request(self) -> BuildRequest {
        BuildRequest {
            dockerfile: self.dockerfile,
            context: self.context,
            destination: self.destination,
            registry_mirrors: self.registry_mirrors,
            skip_default_registry_fallback: self.skip_default_registry_fallback,
            verbosity: self.verbosity,
            target: self.target,
            tar_path: self.tar_path,
            send_artifact_info: self.send_artifact_info,
            docker_config_json: self.docker_config_json,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let env: Arc<dyn Environment> = Arc::new(ProcessEnvironment);
    let path_var = env.var("PATH").map(OsString::from);
    let executable = lookup_executable(EXECUTOR_BINARY, path_var.as_deref())?;

    let mut cancel = signal::cancellation_signal();

    let pipeline = BuildPipeline::new(executable, Arc::new(ProcessLauncher), env)
        .with_client(Arc::new(HttpArtifactClient::new()));
    pipeline.run(&cli.into_request(), &mut cancel).await?;

    Ok(())
}
