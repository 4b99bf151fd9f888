use crate::error::{Result, UpdateError};
use crate::github::{GitHubAsset, GitHubRelease};
use crate::release_client::ReleaseClient;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

struct MockAsset {
    bytes: Vec<u8>,
    interrupted: bool,
}

/// A scripted release: a tag plus downloadable assets served from memory.
pub struct MockRelease {
    tag_name: String,
    assets: Vec<(String, MockAsset)>,
}

impl MockRelease {
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            assets: Vec::new(),
        }
    }

    pub fn asset(mut self, name: &str, bytes: &[u8]) -> Self {
        self.assets.push((
            name.to_string(),
            MockAsset {
                bytes: bytes.to_vec(),
                interrupted: false,
            },
        ));
        self
    }

    /// An asset whose download writes `partial` and then fails mid-stream.
    pub fn interrupted_asset(mut self, name: &str, partial: &[u8]) -> Self {
        self.assets.push((
            name.to_string(),
            MockAsset {
                bytes: partial.to_vec(),
                interrupted: true,
            },
        ));
        self
    }
}

fn asset_url(name: &str) -> String {
    format!("https://example.com/{name}")
}

/// In-memory [ReleaseClient] that records every call it receives.
#[derive(Default)]
pub struct MockReleaseClient {
    releases: HashMap<String, std::result::Result<GitHubRelease, String>>,
    assets: HashMap<String, MockAsset>,
    requested_repos: Mutex<Vec<String>>,
    downloads: Mutex<Vec<String>>,
}

impl MockReleaseClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_release(mut self, github_repo: &str, release: MockRelease) -> Self {
        let assets = release
            .assets
            .iter()
            .map(|(name, _)| GitHubAsset {
                name: name.clone(),
                browser_download_url: asset_url(name),
            })
            .collect();
        self.releases.insert(
            github_repo.to_string(),
            Ok(GitHubRelease {
                tag_name: release.tag_name,
                assets,
            }),
        );
        for (name, asset) in release.assets {
            self.assets.insert(asset_url(&name), asset);
        }
        self
    }

    pub fn with_fetch_error(mut self, github_repo: &str, reason: &str) -> Self {
        self.releases
            .insert(github_repo.to_string(), Err(reason.to_string()));
        self
    }

    pub fn requested_repos(&self) -> Vec<String> {
        self.requested_repos.lock().unwrap().clone()
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }
}

impl ReleaseClient for MockReleaseClient {
    async fn latest_release(&self, github_repo: &str) -> Result<GitHubRelease> {
        self.requested_repos
            .lock()
            .unwrap()
            .push(github_repo.to_string());

        match self.releases.get(github_repo) {
            Some(Ok(release)) => Ok(release.clone()),
            Some(Err(reason)) => Err(UpdateError::fetch(github_repo, reason)),
            None => Err(UpdateError::fetch(github_repo, "404 Not Found")),
        }
    }

    async fn download_asset(&self, url: &str, output_path: &Path) -> Result<()> {
        self.downloads.lock().unwrap().push(url.to_string());

        let asset = self
            .assets
            .get(url)
            .ok_or_else(|| UpdateError::download(url, "404 Not Found"))?;
        fs::write(output_path, &asset.bytes).map_err(|e| UpdateError::download(url, e))?;

        if asset.interrupted {
            return Err(UpdateError::download(url, "connection reset mid-stream"));
        }
        Ok(())
    }
}
