use crate::config::{CompiledRepository, RepositoryConfig, Settings, display_name, load_repositories};
use crate::error::{Result, UpdateError};
use crate::github::GitHubClient;
use crate::local_file::{TempDownload, local_version, locate_local_file, replacement_target};
use crate::release_client::ReleaseClient;
use crate::ui;
use crate::version::{ReleaseVersion, strip_tag_prefix};
use serde_json::Value;
use std::path::PathBuf;

/// Result of one orchestrator turn.
#[derive(Debug)]
pub enum UpdateOutcome {
    UpToDate {
        version: String,
    },
    Updated {
        from: String,
        to: String,
        path: PathBuf,
    },
    Failed(UpdateError),
}

impl UpdateOutcome {
    pub fn succeeded(&self) -> bool {
        !matches!(self, UpdateOutcome::Failed(_))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub up_to_date: usize,
    pub updated: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn record(&mut self, outcome: &UpdateOutcome) {
        match outcome {
            UpdateOutcome::UpToDate { .. } => self.up_to_date += 1,
            UpdateOutcome::Updated { .. } => self.updated += 1,
            UpdateOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.up_to_date + self.updated + self.failed
    }
}

/// Loads the configured repositories and checks each of them against GitHub.
///
/// Only a missing or malformed configuration (or an unusable HTTP client) is returned as an
/// error; individual repository failures are logged and counted in the summary.
pub async fn run(settings: &Settings) -> Result<BatchSummary> {
    let entries = load_repositories(&settings.config_file)?;
    let client = GitHubClient::new(settings)?;
    Ok(run_batch(&client, &entries).await)
}

pub async fn run_batch<C: ReleaseClient>(client: &C, entries: &[Value]) -> BatchSummary {
    ui::info(&format!(
        "Found {} repository configurations, starting update check...",
        entries.len()
    ));

    let mut summary = BatchSummary::default();
    for (index, entry) in entries.iter().enumerate() {
        let outcome = update_entry(client, entry, index).await;
        summary.record(&outcome);
    }

    ui::header("All repository checks complete");
    ui::info(&format!(
        "{} up to date, {} updated, {} failed",
        summary.up_to_date, summary.updated, summary.failed
    ));
    summary
}

/// Runs one orchestrator turn for the raw configuration `entry` at `index`, never failing:
/// errors are logged under the repository's name and returned as [UpdateOutcome::Failed].
pub async fn update_entry<C: ReleaseClient>(
    client: &C,
    entry: &Value,
    index: usize,
) -> UpdateOutcome {
    let name = display_name(entry, index);
    ui::header(&format!("Checking {} for updates", name));

    let result = match RepositoryConfig::from_value(entry).and_then(|config| config.compile()) {
        Ok(repository) => update_repository(client, &repository).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => outcome,
        Err(e) => {
            ui::error(&format!("{} update failed: {}", name, e));
            UpdateOutcome::Failed(e)
        }
    }
}

pub async fn update_repository<C: ReleaseClient>(
    client: &C,
    repository: &CompiledRepository,
) -> Result<UpdateOutcome> {
    let config = &repository.config;

    let local_file = locate_local_file(&config.local_file, &repository.version_regex)
        .ok_or_else(|| UpdateError::LocalVersionUnresolvable(config.local_file.clone()))?;
    if local_file != config.local_file {
        ui::warning(&format!(
            "{} not found, using {}",
            config.local_file.display(),
            local_file.display()
        ));
    }
    let local: ReleaseVersion = local_version(&local_file, &repository.version_regex)
        .ok_or_else(|| UpdateError::LocalVersionUnresolvable(local_file.clone()))?
        .parse()?;
    ui::info(&format!("Local version: {}", local));

    ui::info("Checking for the latest release...");
    let release = client.latest_release(&config.github_repo).await?;
    let remote: ReleaseVersion = strip_tag_prefix(&release.tag_name).parse()?;
    ui::info(&format!("Latest version: {}", remote));

    if remote <= local {
        ui::success("Already up to date, nothing to do");
        return Ok(UpdateOutcome::UpToDate {
            version: local.to_string(),
        });
    }

    let asset = release
        .find_asset(&repository.asset_regex)
        .ok_or_else(|| UpdateError::AssetNotFound {
            pattern: config.asset_pattern().to_string(),
        })?;

    ui::info(&format!("Downloading new version: {}", asset.browser_download_url));
    let temp = TempDownload::new(&local_file);
    tracing::debug!("Downloading to {}", temp.path().display());
    client
        .download_asset(&asset.browser_download_url, temp.path())
        .await?;

    let target = replacement_target(&local_file, &asset.name, &repository.version_regex);
    ui::info(&format!("Replacing file: {}", target.display()));
    if target != local_file {
        tracing::debug!("Removing previous version {}", local_file.display());
    }
    let path = temp.persist(&local_file, &target)?;

    ui::success(&format!("{} updated to {}!", config.name, remote));
    Ok(UpdateOutcome::Updated {
        from: local.to_string(),
        to: remote.to_string(),
        path,
    })
}
