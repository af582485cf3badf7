//! Image reference normalization.
//!
//! Destinations are accepted in three shapes, checked in this order:
//! - `name@algorithm:hex` - pinned by digest
//! - `name:tag` - tagged
//! - `name` - bare, implies the `latest` tag

use derive_more::Display;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

use crate::{Error, Result};

/// Tag assumed when a reference carries neither a tag nor a digest.
pub const DEFAULT_TAG: &str = "latest";

static REFERENCE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9._\-/:@]+$").unwrap());

// Registry host, optionally with a port.
static HOST_COMPONENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:[.-][a-z0-9]+)*(?::[0-9]+)?$").unwrap());

static PATH_COMPONENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:(?:[._]|__|-+)[a-z0-9]+)*$").unwrap());

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9_][a-z0-9_.-]{0,127}$").unwrap());

static DIGEST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:[+._-][a-z0-9]+)*:[a-z0-9]+$").unwrap());

/// How the version of a reference was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    #[display("tag")]
    Tag,
    #[display("digest")]
    Digest,
    #[display("implied-latest")]
    ImpliedLatest,
}

/// A destination split into repository name and version selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedReference {
    /// Repository name including the registry host, e.g. `gcr.io/project/app`.
    pub name: String,
    /// Tag, digest (`algorithm:hex`), or `latest` for bare names.
    pub version: String,
    pub kind: ReferenceKind,
}

impl ParsedReference {
    /// Parse a destination string.
    ///
    /// Surrounding whitespace is ignored. Anything outside the reference
    /// grammar yields [`Error::InvalidReference`] carrying the raw input.
    pub fn parse(destination: &str) -> Result<Self> {
        let invalid = || Error::InvalidReference(destination.to_string());
        let trimmed = destination.trim();

        if trimmed.is_empty() || !REFERENCE_CHARS.is_match(trimmed) {
            return Err(invalid());
        }

        if let Some((named, digest)) = trimmed.split_once('@') {
            if !DIGEST.is_match(digest) {
                return Err(invalid());
            }
            // `name:tag@digest` pins by digest; the tag carries no extra meaning.
            let (name, _) = split_tag(named);
            validate_name(name).ok_or_else(invalid)?;
            return Ok(Self {
                name: name.to_string(),
                version: digest.to_string(),
                kind: ReferenceKind::Digest,
            });
        }

        match split_tag(trimmed) {
            (name, Some(tag)) => {
                if !TAG.is_match(tag) {
                    return Err(invalid());
                }
                validate_name(name).ok_or_else(invalid)?;
                Ok(Self {
                    name: name.to_string(),
                    version: tag.to_string(),
                    kind: ReferenceKind::Tag,
                })
            }
            (name, None) => {
                validate_name(name).ok_or_else(invalid)?;
                Ok(Self {
                    name: name.to_string(),
                    version: DEFAULT_TAG.to_string(),
                    kind: ReferenceKind::ImpliedLatest,
                })
            }
        }
    }

    /// Fully qualified form: `name@digest` for digests, `name:tag` otherwise.
    pub fn canonical(&self) -> String {
        match self.kind {
            ReferenceKind::Digest => format!("{}@{}", self.name, self.version),
            ReferenceKind::Tag | ReferenceKind::ImpliedLatest => {
                format!("{}:{}", self.name, self.version)
            }
        }
    }
}

impl FromStr for ParsedReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for ParsedReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Split off a tag, i.e. a `:` that follows the last `/`.
///
/// A colon before the last slash belongs to a `host:port` prefix.
fn split_tag(reference: &str) -> (&str, Option<&str>) {
    let last_slash = reference.rfind('/');
    match reference.rfind(':') {
        Some(colon) if last_slash.is_none_or(|slash| colon > slash) => {
            (&reference[..colon], Some(&reference[colon + 1..]))
        }
        _ => (reference, None),
    }
}

fn validate_name(name: &str) -> Option<()> {
    let components: Vec<&str> = name.split('/').collect();
    let (first, rest) = components.split_first()?;

    let first_ok = if rest.is_empty() {
        PATH_COMPONENT.is_match(first)
    } else {
        HOST_COMPONENT.is_match(first)
    };

    if first_ok && rest.iter().all(|c| PATH_COMPONENT.is_match(c)) {
        Some(())
    } else {
        None
    }
}
