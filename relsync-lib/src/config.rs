use crate::error::{Result, UpdateError};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "repo.json";
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Runtime settings for a batch run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Path to the JSON document listing the tracked repositories
    pub config_file: PathBuf,

    /// Base URL of the GitHub REST API
    pub api_base_url: String,

    /// `User-Agent` sent with every request (required by the GitHub API)
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user_agent: format!("relsync/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Settings {
    pub fn new(config_file: Option<&Path>, api_base_url: Option<&str>) -> Self {
        let defaults = Self::default();
        Self {
            config_file: config_file
                .map(|p| p.to_path_buf())
                .unwrap_or(defaults.config_file),
            api_base_url: api_base_url
                .map(|u| u.to_string())
                .unwrap_or(defaults.api_base_url),
            ..defaults
        }
    }
}

/// A single entry of the `repositories` array.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub name: String,
    /// `<owner>/<repo>` on GitHub
    pub github_repo: String,
    pub local_file: PathBuf,
    /// Regex whose first capture group is the version
    pub version_pattern: String,
    pub asset_pattern: Option<String>,
}

/// A [RepositoryConfig] with its patterns compiled.
#[derive(Debug, Clone)]
pub struct CompiledRepository {
    pub config: RepositoryConfig,
    pub version_regex: Regex,
    pub asset_regex: Regex,
}

impl RepositoryConfig {
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(|e| UpdateError::InvalidRepository {
            reason: e.to_string(),
        })
    }

    pub fn asset_pattern(&self) -> &str {
        self.asset_pattern
            .as_deref()
            .unwrap_or(&self.version_pattern)
    }

    pub fn compile(&self) -> Result<CompiledRepository> {
        let version_regex = compile_pattern(&self.version_pattern)?;
        if version_regex.captures_len() < 2 {
            return Err(UpdateError::InvalidRepository {
                reason: format!(
                    "version_pattern '{}' has no capture group for the version",
                    self.version_pattern
                ),
            });
        }
        let asset_regex = compile_pattern(self.asset_pattern())?;

        Ok(CompiledRepository {
            config: self.clone(),
            version_regex,
            asset_regex,
        })
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| UpdateError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Loads the raw entries of the top-level `repositories` array.
///
/// Entries are only checked for being present here. Each one is turned into a
/// [RepositoryConfig] when it is processed, so a bad entry fails on its own.
pub fn load_repositories(config_path: &Path) -> Result<Vec<Value>> {
    if !config_path.exists() {
        return Err(UpdateError::ConfigMissing(config_path.to_path_buf()));
    }

    let parse_error = |reason: String| UpdateError::ConfigParse {
        path: config_path.to_path_buf(),
        reason,
    };

    let content = fs::read_to_string(config_path).map_err(|e| parse_error(e.to_string()))?;
    let mut document: Value =
        serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?;

    match document.get_mut("repositories").map(Value::take) {
        Some(Value::Array(entries)) => Ok(entries),
        Some(_) => Err(parse_error("'repositories' is not an array".to_string())),
        None => Err(parse_error("missing top-level key 'repositories'".to_string())),
    }
}

/// Name used in log output for the entry at `index` (0-based).
pub fn display_name(entry: &Value, index: usize) -> String {
    entry
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("repository #{}", index + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_load_repositories() -> anyhow::Result<()> {
        let tmp_dir = TempDir::new()?;
        let path = tmp_dir.path().join("repo.json");
        fs::write(
            &path,
            r#"{
                "repositories": [
                    {
                        "name": "Tool",
                        "github_repo": "owner/tool",
                        "local_file": "bin/tool-1.2.0.zip",
                        "version_pattern": "tool-(\\d+\\.\\d+\\.\\d+)\\.zip"
                    },
                    { "name": "Incomplete" }
                ]
            }"#,
        )?;

        let entries = load_repositories(&path)?;
        assert_eq!(entries.len(), 2);

        let tool = RepositoryConfig::from_value(&entries[0])?;
        assert_eq!(tool.github_repo, "owner/tool");
        assert_eq!(tool.local_file, PathBuf::from("bin/tool-1.2.0.zip"));
        assert_eq!(tool.asset_pattern(), tool.version_pattern);

        let err = RepositoryConfig::from_value(&entries[1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRepository);
        Ok(())
    }

    #[test]
    fn test_load_repositories_missing_file() {
        let err = load_repositories(Path::new("does/not/exist/repo.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigMissing);
    }

    #[test]
    fn test_load_repositories_malformed() -> anyhow::Result<()> {
        let tmp_dir = TempDir::new()?;
        let path = tmp_dir.path().join("repo.json");

        fs::write(&path, "{ not json")?;
        assert_eq!(load_repositories(&path).unwrap_err().kind(), ErrorKind::ConfigParse);

        fs::write(&path, r#"{ "repos": [] }"#)?;
        assert_eq!(load_repositories(&path).unwrap_err().kind(), ErrorKind::ConfigParse);

        fs::write(&path, r#"{ "repositories": {} }"#)?;
        assert_eq!(load_repositories(&path).unwrap_err().kind(), ErrorKind::ConfigParse);
        Ok(())
    }

    #[test]
    fn test_compile_patterns() -> anyhow::Result<()> {
        let config = RepositoryConfig {
            name: "Tool".to_string(),
            github_repo: "owner/tool".to_string(),
            local_file: PathBuf::from("tool-1.0.0.zip"),
            version_pattern: r"tool-(\d+\.\d+\.\d+)\.zip".to_string(),
            asset_pattern: Some(r"tool-.*-linux\.zip".to_string()),
        };
        let compiled = config.compile()?;
        assert!(compiled.asset_regex.is_match("tool-1.1.0-linux.zip"));
        assert!(!compiled.asset_regex.is_match("tool-1.1.0.zip"));

        let no_group = RepositoryConfig {
            version_pattern: r"tool-\d+\.zip".to_string(),
            ..config.clone()
        };
        assert_eq!(no_group.compile().unwrap_err().kind(), ErrorKind::InvalidRepository);

        let broken = RepositoryConfig {
            asset_pattern: Some("tool-(".to_string()),
            ..config
        };
        assert_eq!(broken.compile().unwrap_err().kind(), ErrorKind::InvalidPattern);
        Ok(())
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(&json!({ "name": "Tool" }), 0), "Tool");
        assert_eq!(display_name(&json!({ "github_repo": "a/b" }), 2), "repository #3");
    }

    #[test]
    fn test_settings_overrides() {
        let settings = Settings::new(Some(Path::new("custom.json")), None);
        assert_eq!(settings.config_file, PathBuf::from("custom.json"));
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
        assert!(settings.user_agent.starts_with("relsync/"));
    }
}
