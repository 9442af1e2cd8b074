//! Enriched message model written by the renderers.

use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A message with its author resolved, images downloaded and replies attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub author: Arc<User>,
    pub text: String,
    /// Platform timestamp, a string-encoded float of seconds since the epoch.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_timestamp: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub replies: Vec<Message>,
}

impl Message {
    /// Numeric value of the timestamp used for ordering.
    pub fn timestamp_value(&self) -> f64 {
        parse_timestamp(&self.timestamp)
    }

    /// Local wall-clock time of the message, if the timestamp is valid.
    pub fn datetime(&self) -> Option<DateTime<Local>> {
        let value = self.timestamp_value();
        let secs = value.trunc() as i64;
        let nanos = (value.fract() * 1e9) as u32;
        DateTime::from_timestamp(secs, nanos).map(|dt| dt.with_timezone(&Local))
    }
}

/// Parse a platform timestamp. Unparseable values sort as zero.
pub fn parse_timestamp(ts: &str) -> f64 {
    ts.trim().parse::<f64>().unwrap_or(0.0)
}

/// Stable sort by ascending numeric timestamp.
pub fn sort_by_timestamp(messages: &mut [Message]) {
    messages.sort_by(|a, b| a.timestamp_value().total_cmp(&b.timestamp_value()));
}

/// A message author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub real_name: String,
    #[serde(default, with = "base64_opt", skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Vec<u8>>,
}

impl User {
    /// Placeholder for a user whose profile could not be retrieved.
    pub fn degraded(user_id: &str) -> Self {
        Self {
            id: user_id.to_string(),
            display_name: user_id.to_string(),
            real_name: String::new(),
            avatar: None,
        }
    }
}

/// An image attached to a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub mime_type: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

/// Root of a JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelExport {
    pub channel: String,
    pub exported_at: DateTime<Local>,
    pub messages: Vec<Message>,
}

impl ChannelExport {
    /// Wrap messages exported now.
    pub fn new(channel: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            channel: channel.into(),
            exported_at: Local::now(),
            messages,
        }
    }

    /// Count of top-level messages plus all replies.
    pub fn total_messages(&self) -> usize {
        self.messages.iter().map(|m| 1 + m.replies.len()).sum()
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

mod base64_opt {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(encoded) if !encoded.is_empty() => STANDARD
                .decode(encoded)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}
