//! Slack Exporter - CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use slack_exporter::{
    api::SlackApi,
    cli::Args,
    config::{validate_config, Config},
    error::{exit_codes, Error, Result},
    export::{ChannelExport, ChannelExporter},
    output::{
        create_spinner, print_banner, print_config_summary, print_error, print_export_stats,
        print_info, print_success, print_warning,
    },
    render,
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::TomlParse(_)
                | Error::UrlParse(_) => ExitCode::from(exit_codes::CONFIG_ERROR as u8),
                Error::Api(_)
                | Error::Authentication(_)
                | Error::ChannelNotFound(_)
                | Error::RateLimited(_)
                | Error::Http(_) => ExitCode::from(exit_codes::API_ERROR as u8),
                Error::Render(_) | Error::Image(_) | Error::Json(_) => {
                    ExitCode::from(exit_codes::RENDER_ERROR as u8)
                }
                Error::Io(_) => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    // Load configuration and merge CLI arguments over it
    let mut config = Config::discover(args.config.as_deref())?;
    args.merge_into_config(&mut config);
    validate_config(&config)?;

    let quiet = config.export.quiet;
    let channel = config.export.channel.clone();
    let output_path = config.output_path();

    if !quiet {
        print_banner();
        print_config_summary(
            &channel,
            &config.export.format.to_string(),
            &output_path.display().to_string(),
        );
    }

    // Initialize API client
    let api = SlackApi::with_base_url(config.account.token.clone(), &config.account.api_base)?;
    let mut exporter = ChannelExporter::new(api);

    let spinner = if quiet {
        None
    } else {
        Some(create_spinner(&format!("Exporting #{}...", channel)))
    };
    if let Some(ref spinner) = spinner {
        exporter = exporter.with_progress(spinner.clone());
    }

    let result = exporter.export_channel(&channel).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let messages = result?;

    // Render output
    let export = ChannelExport::new(channel.as_str(), messages);
    if !quiet {
        print_info(&format!(
            "Writing {} messages as {}...",
            export.total_messages(),
            config.export.format
        ));
    }
    if let Some(dir) = output_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    render::render(config.export.format, &export, &output_path)?;

    if !quiet {
        print_export_stats(&channel, exporter.stats());
    }
    if exporter.stats().truncated_threads > 0 {
        print_warning(&format!(
            "{} thread(s) could not be fetched completely",
            exporter.stats().truncated_threads
        ));
    }
    print_success(&format!("Export written to {}", output_path.display()));

    Ok(())
}
