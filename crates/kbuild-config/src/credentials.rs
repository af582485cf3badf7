//! Docker credential files.
//!
//! Credentials are handed to the executor through its own mechanism, a
//! `config.json` in the docker config directory. Only the shape of the
//! payload is checked here; whether the credentials work is left to the
//! registry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::{ConfigError, ConfigResult};

pub const DOCKER_CONFIG_FILE: &str = "config.json";

/// Shape of a docker `config.json`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerConfigJson {
    /// Registry host to credentials.
    pub auths: BTreeMap<String, RegistryAuth>,
}

/// Credentials for one registry.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryAuth {
    /// Base64 encoded `username:password`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl DockerConfigJson {
    /// Check that `raw` has the structure of a docker config file.
    pub fn parse(raw: &str) -> ConfigResult<Self> {
        serde_json::from_str(raw).map_err(ConfigError::DockerConfig)
    }

    pub fn registries(&self) -> impl Iterator<Item = &str> {
        self.auths.keys().map(String::as_str)
    }

    /// Validate `raw` and write it unchanged to `<dir>/config.json`.
    ///
    /// Keys other than `auths` (credential helpers and the like) are kept
    /// as supplied.
    pub fn install(raw: &str, dir: &Path) -> ConfigResult<PathBuf> {
        let config = Self::parse(raw)?;

        std::fs::create_dir_all(dir)?;
        let path = dir.join(DOCKER_CONFIG_FILE);
        std::fs::write(&path, raw)?;
        restrict_permissions(&path)?;

        info!(
            path = %path.display(),
            registries = ?config.registries().collect::<Vec<_>>(),
            "Installed docker credentials"
        );
        Ok(path)
    }
}

// Secrets stay out of debug output.
impl std::fmt::Debug for DockerConfigJson {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockerConfigJson")
            .field("auths", &self.auths.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl std::fmt::Debug for RegistryAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryAuth")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
