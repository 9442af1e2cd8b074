//! Slack Exporter - export a Slack channel to JSON or PDF
//!
//! This library retrieves a channel's full history through the Slack Web API,
//! stitches in threaded replies, resolves authors and downloads attached
//! images.
//!
//! # Features
//!
//! - Cursor-based paging of channel history and thread replies
//! - Per-run user profile cache
//! - Image attachments and avatars embedded as bytes
//! - JSON output (base64 images) or a rendered PDF document
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use slack_exporter::{render, ChannelExport, ChannelExporter, OutputFormat, SlackApi};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = SlackApi::new(std::env::var("SLACK_TOKEN")?)?;
//!     let mut exporter = ChannelExporter::new(api);
//!
//!     let messages = exporter.export_channel("general").await?;
//!     let export = ChannelExport::new("general", messages);
//!     render::render(OutputFormat::Json, &export, Path::new("slack_export.json"))?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod output;
pub mod render;

// Re-exports for convenience
pub use api::SlackApi;
pub use config::{Config, OutputFormat};
pub use error::{Error, Result};
pub use export::{Attachment, ChannelExport, ChannelExporter, ExportStats, Message, User};
