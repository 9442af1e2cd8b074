//! Channel export module.
//!
//! This module provides:
//! - The channel exporter (history paging, thread replies, enrichment)
//! - The per-run user cache
//! - The enriched message model
//! - Export statistics

pub mod cache;
pub mod exporter;
pub mod model;
pub mod stats;

pub use cache::UserCache;
pub use exporter::ChannelExporter;
pub use model::{parse_timestamp, sort_by_timestamp, Attachment, ChannelExport, Message, User};
pub use stats::ExportStats;
