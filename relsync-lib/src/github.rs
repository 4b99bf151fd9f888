use crate::config::Settings;
use crate::error::{Result, UpdateError};
use crate::logging::{progress_bar_style, spinner_style};
use crate::release_client::ReleaseClient;
use futures_util::StreamExt;
use regex::Regex;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::Deserialize;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use tracing_indicatif::span_ext::IndicatifSpanExt;

/// Matches the GitHub API JSON response for the latest release
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GitHubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
}

/// Matches the GitHub API JSON response for a single release asset
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GitHubAsset {
    pub name: String,
    pub browser_download_url: String,
}

impl GitHubRelease {
    /// Returns the first asset, in the order GitHub listed them, whose name matches `pattern`.
    pub fn find_asset(&self, pattern: &Regex) -> Option<&GitHubAsset> {
        self.assets.iter().find(|asset| pattern.is_match(&asset.name))
    }
}

pub struct GitHubClient {
    api_base_url: String,
    client: Client,
}

impl ReleaseClient for GitHubClient {
    #[instrument(skip_all)]
    async fn latest_release(&self, github_repo: &str) -> Result<GitHubRelease> {
        let current_span = tracing::Span::current();
        current_span.pb_set_style(&spinner_style("{msg}"));
        current_span.pb_set_message(&format!("Checking latest release of {}...", github_repo));

        let url = self.latest_release_url(github_repo);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| UpdateError::fetch(github_repo, e))?;

        if !response.status().is_success() {
            return Err(UpdateError::fetch(
                github_repo,
                format!("GitHub API request failed: {}", response.status()),
            ));
        }

        response
            .json::<GitHubRelease>()
            .await
            .map_err(|e| UpdateError::fetch(github_repo, e))
    }

    #[instrument(skip_all)]
    async fn download_asset(&self, url: &str, path: &Path) -> Result<()> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UpdateError::download(url, e))?;

        if !response.status().is_success() {
            return Err(UpdateError::download(url, response.status()));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| url.to_string());
        let current_span = tracing::Span::current();
        match response.content_length() {
            Some(length) => {
                current_span.pb_set_style(&progress_bar_style());
                current_span.pb_set_length(length);
            }
            None => current_span.pb_set_style(&spinner_style("{msg} {bytes}")),
        }
        current_span.pb_set_message(&format!("Downloading {}...", file_name));
        current_span.pb_set_finish_message(&format!("Downloading {}... Complete!", file_name));

        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|e| UpdateError::download(url, e))?;
        let mut downloaded = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| UpdateError::download(url, e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| UpdateError::download(url, e))?;
            downloaded += chunk.len() as u64;

            current_span.pb_set_position(downloaded);
        }

        file.flush()
            .await
            .map_err(|e| UpdateError::download(url, e))?;
        tracing::debug!("Wrote {} bytes to {}", downloaded, path.display());
        Ok(())
    }
}

impl GitHubClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(|e| UpdateError::ClientSetup(e.to_string()))?;
        Ok(Self {
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn latest_release_url(&self, github_repo: &str) -> String {
        format!("{}/repos/{}/releases/latest", self.api_base_url, github_repo)
    }
}
