//! Configuration for the kaniko build action.
//!
//! This crate handles:
//! - Registry mirror configuration (`CLOUDBEES_REGISTRY_CONFIG`)
//! - Platform settings read from the environment
//! - Docker credential files

pub mod credentials;
pub mod error;
pub mod mirrors;
pub mod settings;

pub use credentials::{DockerConfigJson, RegistryAuth};
pub use error::{ConfigError, ConfigResult};
pub use mirrors::{MirrorMap, RegistryConfig, resolve_registry_map};
pub use settings::PlatformSettings;
