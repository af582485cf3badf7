//! Output files derived from the built image.
//!
//! Outputs always describe the first destination. With several
//! destinations the others are pushed too, but only the first shows up here.

use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::OutputError;

pub const DIGEST_OUTPUT: &str = "digest";
pub const TAG_OUTPUT: &str = "tag";
pub const TAG_DIGEST_OUTPUT: &str = "tag-digest";
pub const IMAGE_OUTPUT: &str = "image";

const DEFAULT_TAG: &str = "latest";

/// Values published as output files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSet {
    /// Raw digest as written by the executor.
    pub digest: String,
    pub tag: String,
    /// `<tag>@<digest>`
    pub tag_digest: String,
    /// `<repository>:<tag>@<digest>`
    pub image: String,
}

impl OutputSet {
    pub fn derive(first_destination: &str, digest: &str) -> Self {
        let (repository, tag) = split_repository_tag(first_destination);
        Self {
            digest: digest.to_string(),
            tag: tag.to_string(),
            tag_digest: format!("{}@{}", tag, digest),
            image: format!("{}:{}@{}", repository, tag, digest),
        }
    }

    /// Output file names paired with their contents, in write order.
    pub fn entries(&self) -> [(&'static str, &str); 4] {
        [
            (DIGEST_OUTPUT, self.digest.as_str()),
            (TAG_OUTPUT, self.tag.as_str()),
            (TAG_DIGEST_OUTPUT, self.tag_digest.as_str()),
            (IMAGE_OUTPUT, self.image.as_str()),
        ]
    }
}

/// Split a destination at its last `:`.
///
/// A colon at the start or at the very end does not count; the tag is then
/// `latest` and the repository the whole destination.
pub fn split_repository_tag(destination: &str) -> (&str, &str) {
    match destination.rfind(':') {
        Some(pos) if pos > 0 && pos < destination.len() - 1 => {
            (&destination[..pos], &destination[pos + 1..])
        }
        _ => (destination, DEFAULT_TAG),
    }
}

/// Read the digest file and write the output files into `outputs_dir`.
pub fn materialize(
    outputs_dir: &Path,
    digest_file: &Path,
    first_destination: &str,
) -> Result<OutputSet, OutputError> {
    let digest =
        std::fs::read_to_string(digest_file).map_err(|source| OutputError::DigestRead {
            path: digest_file.to_path_buf(),
            source,
        })?;

    let outputs = OutputSet::derive(first_destination, &digest);
    for (name, value) in outputs.entries() {
        write_output(outputs_dir, name, value)?;
    }

    info!(image = %outputs.image, dir = %outputs_dir.display(), "Wrote action outputs");
    Ok(outputs)
}

pub(crate) fn write_output(dir: &Path, name: &str, value: &str) -> Result<(), OutputError> {
    let to_error = |source| OutputError::Write {
        name: name.to_string(),
        source,
    };

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o640);
    }

    let mut file = options.open(dir.join(name)).map_err(to_error)?;
    file.write_all(value.as_bytes()).map_err(to_error)
}
