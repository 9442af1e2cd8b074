//! Configuration module for the slack-exporter.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Output format selection
//! - Configuration validation

pub mod format;
pub mod loader;
pub mod validation;

pub use format::OutputFormat;
pub use loader::{AccountConfig, Config, ExportConfig};
pub use validation::{normalize_channel_name, validate_config};
