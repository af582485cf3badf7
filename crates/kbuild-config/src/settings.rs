//! Platform settings read from the environment.

use kbuild_core::Environment;
use kbuild_core::request::split_list;
use std::path::PathBuf;

/// Directory receiving the action's output files.
pub const OUTPUTS_ENV: &str = "CLOUDBEES_OUTPUTS";
/// Path to the registry mirror configuration file.
pub const REGISTRY_CONFIG_ENV: &str = "CLOUDBEES_REGISTRY_CONFIG";
/// Comma separated `--build-arg` values.
pub const BUILD_ARGS_ENV: &str = "DOCKER_BUILD_ARGS";
/// Comma separated `--label` values.
pub const LABELS_ENV: &str = "DOCKER_LABELS";
pub const API_URL_ENV: &str = "CLOUDBEES_API_URL";
pub const API_TOKEN_ENV: &str = "CLOUDBEES_API_TOKEN";
pub const RUN_ID_ENV: &str = "CLOUDBEES_RUN_ID";
pub const RUN_ATTEMPT_ENV: &str = "CLOUDBEES_RUN_ATTEMPT";
/// Directory the executor reads `config.json` credentials from.
pub const DOCKER_CONFIG_ENV: &str = "DOCKER_CONFIG";
pub const TMPDIR_ENV: &str = "TMPDIR";

pub const DEFAULT_DOCKER_CONFIG_DIR: &str = "/kaniko/.docker";
pub const DIGEST_FILE_NAME: &str = "kaniko-image-digest";
/// Scratch directory when `TMPDIR` is unset.
pub const DEFAULT_TEMP_DIR: &str = "/tmp";

/// Settings provided by the hosting platform.
///
/// Empty variables are treated as unset.
#[derive(Clone, Default)]
pub struct PlatformSettings {
    pub outputs_dir: Option<PathBuf>,
    pub registry_config: Option<PathBuf>,
    pub build_args: Option<String>,
    pub labels: Option<String>,
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub run_id: Option<String>,
    pub run_attempt: Option<String>,
    pub docker_config_dir: PathBuf,
    pub temp_dir: PathBuf,
}

impl PlatformSettings {
    pub fn from_env(env: &dyn Environment) -> Self {
        Self {
            outputs_dir: env.non_empty(OUTPUTS_ENV).map(PathBuf::from),
            registry_config: env.non_empty(REGISTRY_CONFIG_ENV).map(PathBuf::from),
            build_args: env.non_empty(BUILD_ARGS_ENV),
            labels: env.non_empty(LABELS_ENV),
            api_url: env.non_empty(API_URL_ENV),
            api_token: env.non_empty(API_TOKEN_ENV),
            run_id: env.non_empty(RUN_ID_ENV),
            run_attempt: env.non_empty(RUN_ATTEMPT_ENV),
            docker_config_dir: env
                .non_empty(DOCKER_CONFIG_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCKER_CONFIG_DIR)),
            temp_dir: env
                .non_empty(TMPDIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMP_DIR)),
        }
    }

    /// Where the executor should write the image digest.
    ///
    /// Only requested when there is an output directory to publish it to.
    pub fn digest_file(&self) -> Option<PathBuf> {
        self.outputs_dir
            .as_ref()
            .map(|_| self.temp_dir.join(DIGEST_FILE_NAME))
    }

    pub fn build_args(&self) -> Vec<String> {
        self.build_args.as_deref().map(split_list).unwrap_or_default()
    }

    pub fn labels(&self) -> Vec<String> {
        self.labels.as_deref().map(split_list).unwrap_or_default()
    }
}

impl std::fmt::Debug for PlatformSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformSettings")
            .field("outputs_dir", &self.outputs_dir)
            .field("registry_config", &self.registry_config)
            .field("build_args", &self.build_args)
            .field("labels", &self.labels)
            .field("api_url", &self.api_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "***"))
            .field("run_id", &self.run_id)
            .field("run_attempt", &self.run_attempt)
            .field("docker_config_dir", &self.docker_config_dir)
            .field("temp_dir", &self.temp_dir)
            .finish()
    }
}
