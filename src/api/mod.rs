//! Slack Web API module.
//!
//! This module provides:
//! - HTTP client for the Slack Web API
//! - API response types

pub mod client;
pub mod types;

pub use client::{SlackApi, DEFAULT_API_BASE, PAGE_SIZE};
pub use types::*;
