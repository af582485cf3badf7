//! Registry mirror configuration.
//!
//! The platform may provide a JSON file listing registries and the mirrors
//! that should serve them:
//!
//! ```json
//! {"registries": [{"prefix": "docker.io", "mirrors": ["mirror1.example.com/dockerhub"]}]}
//! ```
//!
//! It is rendered into the executor's `--registry-map` encoding, one
//! `prefix=mirror` pair per mirror joined with `;`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::{ConfigError, ConfigResult};

/// Parsed registry configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub registries: Vec<RegistryEntry>,
}

/// A registry prefix and the mirrors that serve it, in preference order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub prefix: String,
    #[serde(default)]
    pub mirrors: Vec<String>,
}

/// Ordered registry prefix to mirror pairs.
///
/// A prefix appears once per mirror, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorMap {
    pairs: Vec<(String, String)>,
}

impl MirrorMap {
    pub fn from_config(config: &RegistryConfig) -> Self {
        let pairs = config
            .registries
            .iter()
            .flat_map(|registry| {
                registry
                    .mirrors
                    .iter()
                    .map(|mirror| (registry.prefix.clone(), mirror.clone()))
            })
            .collect();
        Self { pairs }
    }

    /// Load the mirror map from an optional config file.
    ///
    /// An unset path, a missing file and an empty file all give an empty
    /// map. A file that exists but cannot be read or parsed is an error.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Registry config not found, skipping");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        if bytes.is_empty() {
            debug!(path = %path.display(), "Registry config is empty");
            return Ok(Self::default());
        }

        let config: RegistryConfig =
            serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self::from_config(&config))
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Render as `prefix=mirror;prefix=mirror`.
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(prefix, mirror)| format!("{}={}", prefix, mirror))
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Resolve the `--registry-map` value for a config path.
///
/// Returns an empty string when there is nothing to map.
pub fn resolve_registry_map(path: Option<&Path>) -> ConfigResult<String> {
    Ok(MirrorMap::load(path)?.encode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const TWO_REGISTRIES: &str = r#"{
        "registries": [
            {"prefix": "docker.io", "mirrors": ["mirror1.example.com/dockerhub", "mirror2.example.com/dockerhub"]},
            {"prefix": "quay.io", "mirrors": ["mirror1.example.com/quay", "mirror2.example.com/quay"]}
        ]
    }"#;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("registries.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_unset_path_is_empty() {
        assert_eq!(resolve_registry_map(None).unwrap(), "");
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("does-not-exist.json");
        assert_eq!(resolve_registry_map(Some(&path)).unwrap(), "");
    }

    #[test]
    fn test_empty_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "");
        assert_eq!(resolve_registry_map(Some(&path)).unwrap(), "");
    }

    #[test]
    fn test_pairs_flattened_in_file_order() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, TWO_REGISTRIES);

        assert_eq!(
            resolve_registry_map(Some(&path)).unwrap(),
            "docker.io=mirror1.example.com/dockerhub;docker.io=mirror2.example.com/dockerhub;\
             quay.io=mirror1.example.com/quay;quay.io=mirror2.example.com/quay"
        );
    }

    #[test]
    fn test_repeated_prefix_kept() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, TWO_REGISTRIES);
        let map = MirrorMap::load(Some(&path)).unwrap();

        let prefixes: Vec<&str> = map.pairs().iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(prefixes, vec!["docker.io", "docker.io", "quay.io", "quay.io"]);
    }

    #[test]
    fn test_registry_without_mirrors_contributes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"registries": [{"prefix": "docker.io"}]}"#);
        let map = MirrorMap::load(Some(&path)).unwrap();
        assert!(map.is_empty());
        assert_eq!(map.encode(), "");
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "{ not json");
        let err = resolve_registry_map(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("failed to parse registry config file"));
    }

    #[test]
    fn test_wrong_shape_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"registries": [{"prefix": 42}]}"#);
        assert!(matches!(
            MirrorMap::load(Some(&path)),
            Err(ConfigError::Parse { .. })
        ));
    }
}
