//! Slack Web API response type definitions.

use serde::Deserialize;

/// Generic API response wrapper.
///
/// Every Web API method answers with `ok` plus method-specific fields, so the
/// payload is flattened into `data`. Payload types default all of their
/// fields so that an `ok: false` body still parses.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
    #[serde(flatten)]
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Continuation cursor, if the server returned a non-empty one.
    pub fn cursor(&self) -> Option<&str> {
        self.response_metadata
            .as_ref()
            .map(|m| m.next_cursor.as_str())
            .filter(|c| !c.is_empty())
    }

    /// Cursor for the next page of a `has_more` style listing
    /// (history, replies).
    pub fn next_page_cursor(&self) -> Option<String> {
        if self.has_more {
            self.cursor().map(str::to_string)
        } else {
            None
        }
    }
}

/// Pagination metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default)]
    pub next_cursor: String,
}

/// `conversations.list` payload.
#[derive(Debug, Default, Deserialize)]
pub struct ChannelList {
    #[serde(default)]
    pub channels: Vec<Channel>,
}

/// A conversation as returned by `conversations.list`.
#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// `conversations.join` payload.
#[derive(Debug, Default, Deserialize)]
pub struct JoinResponse {
    #[serde(default)]
    pub channel: Option<Channel>,
}

/// `conversations.history` / `conversations.replies` payload.
#[derive(Debug, Default, Deserialize)]
pub struct MessageList {
    #[serde(default)]
    pub messages: Vec<RawMessage>,
}

/// A message exactly as the API returns it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMessage {
    /// Message timestamp, also its id within the channel.
    pub ts: String,
    #[serde(default)]
    pub text: String,
    /// Might not exist for bots.
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub files: Vec<RawFile>,
}

/// A file shared in a message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mimetype: Option<String>,
    #[serde(default)]
    pub url_private: Option<String>,
}

impl RawFile {
    /// MIME type reported by the API, guessed from the name when missing.
    pub fn mime_type(&self) -> String {
        match self.mimetype.as_deref() {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => mime_guess::from_path(&self.name)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
        }
    }

    /// Whether the file is an image worth downloading.
    pub fn is_image(&self) -> bool {
        self.mime_type().starts_with("image/")
    }
}

/// `users.info` payload.
#[derive(Debug, Default, Deserialize)]
pub struct UserInfoResponse {
    #[serde(default)]
    pub user: Option<RawUser>,
}

/// User record.
#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profile: Profile,
}

/// User profile subset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub image_48: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_parses() {
        let body = r#"{"ok":false,"error":"channel_not_found"}"#;
        let resp: ApiResponse<MessageList> = serde_json::from_str(body).unwrap();
        assert!(!resp.ok);
        assert_eq!(resp.error.as_deref(), Some("channel_not_found"));
        assert!(resp.data.messages.is_empty());
    }

    #[test]
    fn test_next_page_cursor_requires_has_more() {
        let body = r#"{"ok":true,"messages":[],"has_more":false,
                       "response_metadata":{"next_cursor":"abc"}}"#;
        let resp: ApiResponse<MessageList> = serde_json::from_str(body).unwrap();
        assert_eq!(resp.cursor(), Some("abc"));
        assert_eq!(resp.next_page_cursor(), None);

        let body = r#"{"ok":true,"messages":[],"has_more":true,
                       "response_metadata":{"next_cursor":""}}"#;
        let resp: ApiResponse<MessageList> = serde_json::from_str(body).unwrap();
        assert_eq!(resp.next_page_cursor(), None);
    }

    #[test]
    fn test_file_mime_type_falls_back_to_name() {
        let file = RawFile {
            name: "photo.png".to_string(),
            mimetype: None,
            url_private: None,
        };
        assert_eq!(file.mime_type(), "image/png");
        assert!(file.is_image());

        let file = RawFile {
            name: "notes.txt".to_string(),
            mimetype: Some("text/plain".to_string()),
            url_private: None,
        };
        assert!(!file.is_image());
    }
}
