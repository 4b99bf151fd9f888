use anyhow::{Context, Result};
use clap::Parser;
use relsync_lib::config::{DEFAULT_API_BASE_URL, DEFAULT_CONFIG_FILE, Settings};
use relsync_lib::updater::{self, BatchSummary};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "relsync")]
#[command(about = "Check tracked GitHub repositories for new releases and update local artifacts")]
#[command(version)]
pub struct Cli {
    /// JSON file listing the repositories to track
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Base URL of the GitHub API (useful for testing against a mirror)
    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    pub api_url: String,
}

impl Cli {
    pub fn settings(&self) -> Settings {
        Settings::new(Some(self.config.as_path()), Some(self.api_url.as_str()))
    }

    /// Performs one batch pass over every configured repository.
    pub async fn run(self) -> Result<BatchSummary> {
        let settings = self.settings();
        updater::run(&settings)
            .await
            .with_context(|| format!("Update run using {} aborted", settings.config_file.display()))
    }
}
