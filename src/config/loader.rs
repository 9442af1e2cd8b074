//! Configuration structures and loading logic.

use crate::api::DEFAULT_API_BASE;
use crate::config::format::OutputFormat;
use crate::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Channel exported when none is configured.
pub const DEFAULT_CHANNEL: &str = "helene-logging";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub account: AccountConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

/// Workspace credentials configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Slack bearer token (bot or user token).
    #[serde(default)]
    pub token: String,

    /// Web API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

/// Export options configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Name of the channel to export, without the leading '#'.
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Output format (json, pdf).
    #[serde(default)]
    pub format: OutputFormat,

    /// Directory the export file is written to.
    #[serde(default)]
    pub output_directory: Option<PathBuf>,

    /// Whether to hide progress output.
    #[serde(default)]
    pub quiet: bool,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base: default_api_base(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            format: OutputFormat::default(),
            output_directory: None,
            quiet: false,
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_channel() -> String {
    DEFAULT_CHANNEL.to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!("Configuration file not found: {}", path.display()))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Per-user configuration file, e.g. `~/.config/slack-exporter/config.toml`.
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "slack-exporter").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load the first configuration file that exists, or defaults.
    ///
    /// An explicitly requested file must exist.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let local = PathBuf::from("config.toml");
        if local.exists() {
            tracing::debug!("Loading configuration from {}", local.display());
            return Self::load(&local);
        }

        if let Some(user) = Self::user_config_path().filter(|p| p.exists()) {
            tracing::debug!("Loading configuration from {}", user.display());
            return Self::load(&user);
        }

        tracing::debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Get the effective output directory.
    pub fn output_directory(&self) -> PathBuf {
        self.export
            .output_directory
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Full path of the export file for the configured format.
    pub fn output_path(&self) -> PathBuf {
        self.output_directory().join(self.export.format.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.export.channel, "helene-logging");
        assert_eq!(config.export.format, OutputFormat::Json);
        assert_eq!(config.account.api_base, "https://slack.com/api");
        assert!(config.account.token.is_empty());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[account]
token = "xoxb-1234"

[export]
format = "pdf"
output_directory = "/tmp/exports"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.account.token, "xoxb-1234");
        assert_eq!(config.account.api_base, "https://slack.com/api");
        assert_eq!(config.export.channel, "helene-logging");
        assert_eq!(config.export.format, OutputFormat::Pdf);
        assert_eq!(
            config.output_path(),
            PathBuf::from("/tmp/exports/slack_export.pdf")
        );
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.export.channel = "eng-alerts".into();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.export.channel, "eng-alerts");
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Config::discover(Some(&missing)),
            Err(Error::Config(_))
        ));
    }
}
