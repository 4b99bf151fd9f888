use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = UpdateError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("Configuration file {0} does not exist")]
    ConfigMissing(PathBuf),

    #[error("Failed to parse configuration file {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    #[error("Failed to set up HTTP client: {0}")]
    ClientSetup(String),

    #[error("Invalid repository entry: {reason}")]
    InvalidRepository { reason: String },

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Local file {0} not found or no version could be extracted from its name")]
    LocalVersionUnresolvable(PathBuf),

    #[error("'{0}' is not a valid release version")]
    InvalidVersion(String),

    #[error("Failed to fetch latest release of {repo}: {reason}")]
    RemoteFetchFailed { repo: String, reason: String },

    #[error("No release asset matches pattern '{pattern}'")]
    AssetNotFound { pattern: String },

    #[error("Download of {url} failed: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("Failed to replace {path}: {source}")]
    ReplaceFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fieldless discriminant of [UpdateError], handy for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigMissing,
    ConfigParse,
    ClientSetup,
    InvalidRepository,
    InvalidPattern,
    LocalVersionUnresolvable,
    InvalidVersion,
    RemoteFetchFailed,
    AssetNotFound,
    DownloadFailed,
    ReplaceFailed,
}

impl UpdateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UpdateError::ConfigMissing(_) => ErrorKind::ConfigMissing,
            UpdateError::ConfigParse { .. } => ErrorKind::ConfigParse,
            UpdateError::ClientSetup(_) => ErrorKind::ClientSetup,
            UpdateError::InvalidRepository { .. } => ErrorKind::InvalidRepository,
            UpdateError::InvalidPattern { .. } => ErrorKind::InvalidPattern,
            UpdateError::LocalVersionUnresolvable(_) => ErrorKind::LocalVersionUnresolvable,
            UpdateError::InvalidVersion(_) => ErrorKind::InvalidVersion,
            UpdateError::RemoteFetchFailed { .. } => ErrorKind::RemoteFetchFailed,
            UpdateError::AssetNotFound { .. } => ErrorKind::AssetNotFound,
            UpdateError::DownloadFailed { .. } => ErrorKind::DownloadFailed,
            UpdateError::ReplaceFailed { .. } => ErrorKind::ReplaceFailed,
        }
    }

    pub(crate) fn download(url: &str, reason: impl ToString) -> Self {
        UpdateError::DownloadFailed {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn fetch(repo: &str, reason: impl ToString) -> Self {
        UpdateError::RemoteFetchFailed {
            repo: repo.to_string(),
            reason: reason.to_string(),
        }
    }
}
