//! Executor command assembly.

use kbuild_core::{BuildRequest, Environment, Verbosity};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::BuildError;

/// Name of the kaniko executor binary.
pub const EXECUTOR_BINARY: &str = "executor";

/// Keeps the platform's working directory out of the image snapshot.
pub const IGNORE_PATH_ARG: &str = "--ignore-path=/cloudbees/";

/// Values merged into the command alongside the request.
///
/// Build args and labels are sourced from the environment, the registry map
/// from the mirror configuration, and the digest file from the output
/// settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildInputs {
    pub build_args: Vec<String>,
    pub labels: Vec<String>,
    /// Encoded `--registry-map` value; empty for none.
    pub registry_map: String,
    pub digest_file: Option<PathBuf>,
}

/// Assemble the executor arguments.
///
/// Flags are emitted in a fixed order so the logged command line is stable
/// across runs. An unknown verbosity fails before anything is launched.
pub fn executor_args(request: &BuildRequest, inputs: &BuildInputs) -> Result<Vec<String>, BuildError> {
    let mut args = vec![IGNORE_PATH_ARG.to_string()];

    if !request.verbosity.is_empty() {
        let verbosity: Verbosity = request.verbosity.parse()?;
        args.push(format!("--verbosity={}", verbosity));
    }

    if !request.dockerfile.is_empty() {
        args.push("--dockerfile".to_string());
        args.push(request.dockerfile.clone());
    }

    if !request.context.is_empty() {
        args.push("--context".to_string());
        args.push(request.context.clone());
    }

    for destination in request.destinations() {
        args.push("--destination".to_string());
        args.push(destination);
    }

    for build_arg in &inputs.build_args {
        args.push("--build-arg".to_string());
        args.push(build_arg.clone());
    }

    for label in &inputs.labels {
        args.push("--label".to_string());
        args.push(label.clone());
    }

    for mirror in request.registry_mirrors() {
        args.push("--registry-mirror".to_string());
        args.push(mirror);
    }

    if !inputs.registry_map.is_empty() {
        args.push("--registry-map".to_string());
        args.push(inputs.registry_map.clone());
    }

    if let Some(ref digest_file) = inputs.digest_file {
        args.push("--digest-file".to_string());
        args.push(digest_file.display().to_string());
    }

    if request.skip_default_registry_fallback {
        args.push("--skip-default-registry-fallback".to_string());
    }

    if !request.target.is_empty() {
        args.push("--target".to_string());
        args.push(request.target.clone());
    }

    if !request.tar_path.is_empty() {
        args.push("--tar-path".to_string());
        args.push(request.tar_path.clone());
    }

    Ok(args)
}

/// A fully resolved executor command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Complete environment of the child; nothing else is inherited.
    pub env: Vec<(OsString, OsString)>,
}

impl Invocation {
    /// Capture `env` in full for the child process.
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, env: &dyn Environment) -> Self {
        Self {
            program: program.into(),
            args,
            env: env.vars(),
        }
    }
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
