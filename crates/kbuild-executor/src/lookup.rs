//! Executable lookup on `PATH`.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::BuildError;

/// Locate `binary` the way a shell would.
///
/// Names containing a path separator are checked as given; bare names are
/// searched for in each directory of `path_var`.
pub fn lookup_executable(binary: &str, path_var: Option<&OsStr>) -> Result<PathBuf, BuildError> {
    let not_found = || BuildError::ExecutableNotFound {
        binary: binary.to_string(),
    };

    if binary.contains(std::path::MAIN_SEPARATOR) {
        let candidate = PathBuf::from(binary);
        return if is_executable(&candidate) {
            Ok(candidate)
        } else {
            Err(not_found())
        };
    }

    let path_var = path_var.ok_or_else(not_found)?;
    let found = std::env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(binary))
        .find(|candidate| is_executable(candidate))
        .ok_or_else(not_found)?;

    info!(path = %found.display(), "Found {} binary", binary);
    Ok(found)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn make_file(dir: &Path, name: &str, mode: u32) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    #[test]
    fn test_finds_first_match_on_path() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        make_file(second.path(), "executor", 0o755);
        let path_var = std::env::join_paths([first.path(), second.path()]).unwrap();

        let found = lookup_executable("executor", Some(&path_var)).unwrap();
        assert_eq!(found, second.path().join("executor"));
    }

    #[test]
    fn test_skips_non_executable_files() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        make_file(first.path(), "executor", 0o644);
        make_file(second.path(), "executor", 0o755);
        let path_var = std::env::join_paths([first.path(), second.path()]).unwrap();

        let found = lookup_executable("executor", Some(&path_var)).unwrap();
        assert_eq!(found, second.path().join("executor"));
    }

    #[test]
    fn test_missing_binary() {
        let dir = TempDir::new().unwrap();
        let path_var = OsString::from(dir.path());

        let err = lookup_executable("executor", Some(&path_var)).unwrap_err();
        assert!(matches!(err, BuildError::ExecutableNotFound { .. }));
        assert_eq!(err.to_string(), "cannot find executor binary on PATH");
    }

    #[test]
    fn test_unset_path() {
        assert!(lookup_executable("executor", None).is_err());
    }

    #[test]
    fn test_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = make_file(dir.path(), "executor", 0o755);

        let found = lookup_executable(path.to_str().unwrap(), None).unwrap();
        assert_eq!(found, path);
    }
}
