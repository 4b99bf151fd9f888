use crate::error::{Result, UpdateError};
use crate::version::ReleaseVersion;
use regex::Regex;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

pub const TEMP_SUFFIX: &str = ".tmp";

/// Extracts the version from the base name of `file_path` using the first capture group
/// of `version_pattern`. Returns `None` if the file does not exist or the name does not match.
pub fn local_version(file_path: &Path, version_pattern: &Regex) -> Option<String> {
    if !file_path.exists() {
        return None;
    }

    let file_name = file_path.file_name()?.to_str()?;
    version_pattern
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Finds the file currently holding the artifact.
///
/// The configured path wins when it exists. Otherwise the sibling files of the configured
/// path are searched for names matching `version_pattern`, and the highest version wins;
/// an earlier update may have renamed the artifact after the asset it downloaded.
pub fn locate_local_file(local_file: &Path, version_pattern: &Regex) -> Option<PathBuf> {
    if local_file.exists() {
        return Some(local_file.to_path_buf());
    }

    let dir = match local_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| !n.ends_with(TEMP_SUFFIX))
        })
        .filter_map(|path| {
            let version = local_version(&path, version_pattern)?;
            let version = ReleaseVersion::new(&version).ok()?;
            Some((version, path))
        })
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, path)| path)
}

/// Where a downloaded asset ends up.
///
/// The asset's name is used, next to the current local file, only when `version_pattern`
/// extracts a version from it; the file name then keeps recording the installed version.
/// Any other asset replaces the local file in place.
pub fn replacement_target(local_file: &Path, asset_name: &str, version_pattern: &Regex) -> PathBuf {
    let Some(name) = Path::new(asset_name).file_name() else {
        return local_file.to_path_buf();
    };

    let carries_version = name
        .to_str()
        .and_then(|n| version_pattern.captures(n))
        .and_then(|caps| caps.get(1))
        .is_some_and(|m| ReleaseVersion::new(m.as_str()).is_ok());

    if carries_version {
        local_file.with_file_name(name)
    } else {
        local_file.to_path_buf()
    }
}

pub fn temp_path_for(local_file: &Path) -> PathBuf {
    let mut path = OsString::from(local_file.as_os_str());
    path.push(TEMP_SUFFIX);
    PathBuf::from(path)
}

/// Owns the `<local_file>.tmp` download file. Dropping it without [TempDownload::persist]
/// deletes the file, whichever way the update bailed out.
#[derive(Debug)]
pub struct TempDownload {
    path: PathBuf,
    armed: bool,
}

impl TempDownload {
    pub fn new(local_file: &Path) -> Self {
        Self {
            path: temp_path_for(local_file),
            armed: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Moves the download onto `target`, then removes `local_file` if it lives at a
    /// different path. A crash in between leaves both files behind rather than neither.
    pub fn persist(mut self, local_file: &Path, target: &Path) -> Result<PathBuf> {
        fs::rename(&self.path, target).map_err(|source| UpdateError::ReplaceFailed {
            path: target.to_path_buf(),
            source,
        })?;
        self.armed = false;

        if local_file != target && local_file.exists() {
            fs::remove_file(local_file).map_err(|source| UpdateError::ReplaceFailed {
                path: local_file.to_path_buf(),
                source,
            })?;
        }

        Ok(target.to_path_buf())
    }
}

impl Drop for TempDownload {
    fn drop(&mut self) {
        if self.armed && self.path.exists() {
            match fs::remove_file(&self.path) {
                Ok(()) => tracing::debug!("Removed temporary file {}", self.path.display()),
                Err(e) => tracing::warn!(
                    "Failed to remove temporary file {}: {}",
                    self.path.display(),
                    e
                ),
            }
        }
    }
}
