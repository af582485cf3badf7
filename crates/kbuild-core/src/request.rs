//! Build request and verbosity levels.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::Error;

/// Log levels understood by the kaniko executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    #[display("panic")]
    Panic,
    #[display("fatal")]
    Fatal,
    #[display("error")]
    Error,
    #[display("warn")]
    Warn,
    #[display("info")]
    Info,
    #[display("debug")]
    Debug,
    #[display("trace")]
    Trace,
}

impl FromStr for Verbosity {
    type Err = Error;

    /// Case-insensitive; anything outside the known set is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "panic" => Ok(Self::Panic),
            "fatal" => Ok(Self::Fatal),
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(Error::InvalidVerbosity(s.to_string())),
        }
    }
}

/// Configuration for a single image build.
///
/// List-valued fields keep the raw comma separated text supplied by the
/// caller; splitting happens when the executor command is assembled.
/// Build arguments and labels are not part of the request, they are read
/// from the environment at that point instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    /// Path to the Dockerfile.
    pub dockerfile: String,
    /// Path to the build context.
    pub context: String,
    /// Comma separated destinations, e.g. `registry/app:1.0,registry/app:latest`.
    pub destination: String,
    /// Comma separated registry mirror hosts.
    pub registry_mirrors: String,
    /// Fail instead of falling back to the default registry.
    pub skip_default_registry_fallback: bool,
    /// Executor log level; empty means the executor default.
    pub verbosity: String,
    /// Target stage of a multi-stage Dockerfile.
    pub target: String,
    /// Save the image as a tarball at this path.
    pub tar_path: String,
    /// Report each destination to the platform once the build succeeds.
    pub send_artifact_info: bool,
    /// Docker `config.json` payload holding registry credentials.
    pub docker_config_json: Option<String>,
}

impl BuildRequest {
    /// Destinations split on `,` without trimming.
    ///
    /// `"a, b"` yields `"a"` and `" b"`; callers are expected to pass clean
    /// input. An empty string yields a single empty destination.
    pub fn destinations(&self) -> Vec<String> {
        self.destination.split(',').map(str::to_string).collect()
    }

    /// The destination that drives the output files.
    pub fn first_destination(&self) -> String {
        self.destination
            .split(',')
            .next()
            .unwrap_or_default()
            .to_string()
    }

    /// Registry mirror hosts; empty when none are configured.
    pub fn registry_mirrors(&self) -> Vec<String> {
        split_list(&self.registry_mirrors)
    }
}

/// Split a comma separated list, treating an empty string as no entries.
pub fn split_list(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_destination() {
        let req = BuildRequest {
            destination: "gcr.io/kaniko-project/executor:v1.6.0".to_string(),
            ..Default::default()
        };
        assert_eq!(req.destinations(), vec!["gcr.io/kaniko-project/executor:v1.6.0"]);
    }

    #[test]
    fn test_multiple_destinations_keep_whitespace() {
        let req = BuildRequest {
            destination: "gcr.io/kaniko-project/executor:v1.6.0, gcr.io/kaniko-project/executor:v1.6.1"
                .to_string(),
            ..Default::default()
        };
        assert_eq!(
            req.destinations(),
            vec![
                "gcr.io/kaniko-project/executor:v1.6.0",
                " gcr.io/kaniko-project/executor:v1.6.1"
            ]
        );
        assert_eq!(req.first_destination(), "gcr.io/kaniko-project/executor:v1.6.0");
    }

    #[test]
    fn test_empty_destination_is_one_empty_entry() {
        let req = BuildRequest::default();
        assert_eq!(req.destinations(), vec![""]);
        assert_eq!(req.first_destination(), "");
    }

    #[test]
    fn test_registry_mirrors() {
        let mut req = BuildRequest::default();
        assert!(req.registry_mirrors().is_empty());

        req.registry_mirrors = "mirror.gcr.io,mycompany-docker-virtual.jfrog.io".to_string();
        assert_eq!(
            req.registry_mirrors(),
            vec!["mirror.gcr.io", "mycompany-docker-virtual.jfrog.io"]
        );
    }

    #[test]
    fn test_split_list() {
        assert!(split_list("").is_empty());
        assert_eq!(
            split_list("key1=value1,key2=value2,key3='value3 with spaces'"),
            vec!["key1=value1", "key2=value2", "key3='value3 with spaces'"]
        );
    }

    #[test]
    fn test_verbosity_parse_is_case_insensitive() {
        assert_eq!("DEBUG".parse::<Verbosity>().unwrap(), Verbosity::Debug);
        assert_eq!("Warn".parse::<Verbosity>().unwrap(), Verbosity::Warn);
        assert_eq!(Verbosity::Trace.to_string(), "trace");
    }

    #[test]
    fn test_verbosity_rejects_unknown() {
        let err = "verbose".parse::<Verbosity>().unwrap_err();
        assert_eq!(err.to_string(), "unknown verbosity level: verbose");
    }
}
