//! Slack Web API HTTP client.

use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::types::*;
use crate::error::{Error, Result};

/// Slack Web API base URL.
pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

/// Page size for history and reply listings.
pub const PAGE_SIZE: u32 = 100;

/// Page size for the channel listing.
const CHANNEL_PAGE_SIZE: u32 = 200;

/// Conversation types searched when resolving a channel name.
const CHANNEL_TYPES: &str = "public_channel,private_channel";

/// Slack API client authenticated with a bearer token.
pub struct SlackApi {
    client: Client,
    token: String,
    base_url: String,
}

impl SlackApi {
    /// Create a client against the public Slack API.
    pub fn new(token: String) -> Result<Self> {
        Self::with_base_url(token, DEFAULT_API_BASE)
    }

    /// Create a client against a custom API base URL.
    pub fn with_base_url(token: String, base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url)?;

        let client = Client::builder()
            .user_agent(concat!("slack-exporter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            token,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// Map transport-level statuses to errors before the body is read.
    async fn check_status(method: &str, response: Response) -> Result<Response> {
        let status = response.status();
        tracing::debug!("{} response status: {}", method, status);

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);
            return Err(Error::RateLimited(retry_after));
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Authentication(format!(
                "HTTP {}: {}",
                status,
                if body.is_empty() {
                    "Authentication failed"
                } else {
                    &body
                }
            )));
        }

        Ok(response)
    }

    /// Parse a Web API body and turn `ok: false` into an error.
    async fn parse<T: DeserializeOwned>(method: &str, response: Response) -> Result<ApiResponse<T>> {
        let response = Self::check_status(method, response).await?;
        let text = response.text().await?;
        tracing::trace!("{} response: {}", method, text);

        let api_response: ApiResponse<T> = serde_json::from_str(&text).map_err(|e| {
            Error::Api(format!(
                "Failed to parse {}: {} - Response: {}",
                method,
                e,
                text.chars().take(500).collect::<String>()
            ))
        })?;

        if !api_response.ok {
            return Err(Error::Api(format!(
                "{}: {}",
                method,
                api_response.error.as_deref().unwrap_or("unknown_error")
            )));
        }

        Ok(api_response)
    }

    /// Make an authenticated GET request to a Web API method.
    async fn get<T: DeserializeOwned>(
        &self,
        method: &str,
        query: &[(&str, String)],
    ) -> Result<ApiResponse<T>> {
        let url = self.endpoint(method);
        tracing::debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;

        Self::parse(method, response).await
    }

    /// Get one page of public and private channels.
    pub async fn list_channels(&self, cursor: Option<&str>) -> Result<ApiResponse<ChannelList>> {
        let mut query = vec![
            ("types", CHANNEL_TYPES.to_string()),
            ("limit", CHANNEL_PAGE_SIZE.to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        self.get("conversations.list", &query).await
    }

    /// Join a channel. A no-op on the server side when already a member.
    pub async fn join_channel(&self, channel_id: &str) -> Result<()> {
        let method = "conversations.join";
        let url = self.endpoint(method);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "channel": channel_id }))
            .send()
            .await?;

        Self::parse::<JoinResponse>(method, response).await?;
        Ok(())
    }

    /// Get one page of channel history, starting from the beginning of time.
    pub async fn get_history(
        &self,
        channel_id: &str,
        cursor: Option<&str>,
    ) -> Result<ApiResponse<MessageList>> {
        let mut query = vec![
            ("channel", channel_id.to_string()),
            ("limit", PAGE_SIZE.to_string()),
            ("oldest", "0".to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        self.get("conversations.history", &query).await
    }

    /// Get one page of a thread. The parent message leads every page.
    pub async fn get_replies(
        &self,
        channel_id: &str,
        thread_ts: &str,
        cursor: Option<&str>,
    ) -> Result<ApiResponse<MessageList>> {
        let mut query = vec![
            ("channel", channel_id.to_string()),
            ("ts", thread_ts.to_string()),
            ("limit", PAGE_SIZE.to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        self.get("conversations.replies", &query).await
    }

    /// Get a user's profile.
    pub async fn get_user_info(&self, user_id: &str) -> Result<RawUser> {
        let response: ApiResponse<UserInfoResponse> = self
            .get("users.info", &[("user", user_id.to_string())])
            .await?;

        response
            .data
            .user
            .ok_or_else(|| Error::Api(format!("users.info: no user in response for {}", user_id)))
    }

    /// Download a file or avatar. Returns `None` for any non-200 response.
    pub async fn download(&self, url: &str) -> Result<Option<Vec<u8>>> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            tracing::debug!("Download of {} failed: HTTP {}", url, response.status());
            return Ok(None);
        }

        Ok(Some(response.bytes().await?.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_invalid_base_url() {
        assert!(SlackApi::with_base_url("xoxb-token".into(), "not a url").is_err());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let api = SlackApi::with_base_url("xoxb-token".into(), "https://example.com/api/").unwrap();
        assert_eq!(
            api.endpoint("users.info"),
            "https://example.com/api/users.info"
        );
    }

    #[tokio::test]
    async fn test_ok_false_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/conversations.history")
            .match_query(Matcher::Any)
            .match_header("authorization", "Bearer xoxb-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":false,"error":"not_in_channel"}"#)
            .create_async()
            .await;

        let api = SlackApi::with_base_url("xoxb-token".into(), &server.url()).unwrap();
        let err = api.get_history("C1", None).await.unwrap_err();
        assert!(err.to_string().contains("not_in_channel"));
    }

    #[tokio::test]
    async fn test_rate_limit_maps_retry_after() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/users.info")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_header("retry-after", "7")
            .create_async()
            .await;

        let api = SlackApi::with_base_url("xoxb-token".into(), &server.url()).unwrap();
        let err = api.get_user_info("U1").await.unwrap_err();
        assert!(matches!(err, Error::RateLimited(7)));
    }

    #[tokio::test]
    async fn test_history_query_and_cursor() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/conversations.history")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("channel".into(), "C1".into()),
                Matcher::UrlEncoded("oldest".into(), "0".into()),
                Matcher::UrlEncoded("limit".into(), "100".into()),
                Matcher::UrlEncoded("cursor".into(), "next1".into()),
            ]))
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "ok": true,
                    "messages": [{"ts": "1.0", "text": "hi", "user": "U1"}],
                    "has_more": true,
                    "response_metadata": {"next_cursor": "next2"}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let api = SlackApi::with_base_url("xoxb-token".into(), &server.url()).unwrap();
        let page = api.get_history("C1", Some("next1")).await.unwrap();
        assert_eq!(page.data.messages.len(), 1);
        assert_eq!(page.next_page_cursor().as_deref(), Some("next2"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_download_non_200_is_none() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("GET", "/files/a.png")
            .with_status(200)
            .with_body("png-bytes")
            .create_async()
            .await;
        let _missing = server
            .mock("GET", "/files/b.png")
            .with_status(404)
            .create_async()
            .await;

        let api = SlackApi::with_base_url("xoxb-token".into(), &server.url()).unwrap();
        let found = api
            .download(&format!("{}/files/a.png", server.url()))
            .await
            .unwrap();
        assert_eq!(found.as_deref(), Some(&b"png-bytes"[..]));

        let missing = api
            .download(&format!("{}/files/b.png", server.url()))
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
