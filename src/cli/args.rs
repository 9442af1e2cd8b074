//! Command-line argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{normalize_channel_name, Config, OutputFormat};

/// Slack channel exporter CLI.
#[derive(Parser, Debug)]
#[command(
    name = "slack-exporter",
    version,
    about = "Export Slack channel messages",
    long_about = "Export the full history of a Slack channel, including threaded replies,\n\
                  author profiles and image attachments, to JSON or PDF."
)]
pub struct Args {
    /// Output format.
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Channel name to export (with or without leading '#').
    #[arg(short = 'n', long)]
    pub channel: Option<String>,

    /// Slack API token.
    #[arg(short, long, env = "SLACK_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Slack Web API base URL.
    #[arg(long = "api-base", env = "SLACK_API_BASE")]
    pub api_base: Option<String>,

    /// Directory to write the export file to.
    #[arg(short = 'o', long = "output-dir")]
    pub output_directory: Option<PathBuf>,

    /// Path to configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Hide progress information.
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

/// CLI output format argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    /// Pretty-printed JSON with base64 image data.
    Json,
    /// PDF document with avatars and inline images.
    Pdf,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Pdf => OutputFormat::Pdf,
        }
    }
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(self, config: &mut Config) {
        if let Some(token) = self.token {
            config.account.token = token;
        }

        if let Some(api_base) = self.api_base {
            config.account.api_base = api_base;
        }

        if let Some(channel) = self.channel {
            config.export.channel = channel;
        }
        config.export.channel = normalize_channel_name(&config.export.channel);

        if let Some(format) = self.format {
            config.export.format = format.into();
        }

        if let Some(dir) = self.output_directory {
            config.export.output_directory = Some(dir);
        }

        if self.quiet {
            config.export.quiet = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_flag() {
        let args = Args::try_parse_from(["slack-exporter", "--format", "pdf", "--token", "t"])
            .unwrap();
        let mut config = Config::default();
        args.merge_into_config(&mut config);
        assert_eq!(config.export.format, OutputFormat::Pdf);
        assert_eq!(config.account.token, "t");
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Args::try_parse_from(["slack-exporter", "--format", "html"]).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let args = Args::try_parse_from([
            "slack-exporter",
            "--channel",
            "#eng-alerts",
            "--output-dir",
            "/tmp/out",
            "--quiet",
        ])
        .unwrap();

        let mut config = Config::default();
        config.export.format = OutputFormat::Pdf;
        args.merge_into_config(&mut config);

        assert_eq!(config.export.channel, "eng-alerts");
        assert_eq!(config.export.format, OutputFormat::Pdf);
        assert_eq!(config.export.output_directory, Some(PathBuf::from("/tmp/out")));
        assert!(config.export.quiet);
    }
}
