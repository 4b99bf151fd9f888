use crate::error::Result;
use crate::github::GitHubRelease;
use std::path::Path;

/// Network access needed by the updater: release metadata and asset downloads.
pub trait ReleaseClient {
    fn latest_release(
        &self,
        github_repo: &str,
    ) -> impl Future<Output = Result<GitHubRelease>> + Send;

    /// Streams `url` into `output_path`, overwriting any existing file.
    fn download_asset(
        &self,
        url: &str,
        output_path: &Path,
    ) -> impl Future<Output = Result<()>> + Send;
}
