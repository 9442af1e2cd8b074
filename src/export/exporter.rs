//! Channel export: pagination, thread stitching and message enrichment.

use std::sync::Arc;

use indicatif::ProgressBar;

use crate::api::{RawMessage, SlackApi};
use crate::error::{Error, Result};
use crate::export::cache::UserCache;
use crate::export::model::{sort_by_timestamp, Attachment, Message, User};
use crate::export::stats::ExportStats;

/// Exports one channel's history into enriched, ordered messages.
pub struct ChannelExporter {
    api: SlackApi,
    users: UserCache,
    stats: ExportStats,
    progress: Option<ProgressBar>,
}

impl ChannelExporter {
    pub fn new(api: SlackApi) -> Self {
        Self {
            api,
            users: UserCache::new(),
            stats: ExportStats::default(),
            progress: None,
        }
    }

    /// Report paging progress on a spinner.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn stats(&self) -> &ExportStats {
        &self.stats
    }

    fn report(&self, message: String) {
        if let Some(ref pb) = self.progress {
            pb.set_message(message);
        }
    }

    /// Resolve a channel name to its id.
    ///
    /// Walks every page of public and private channels and matches the name
    /// exactly. `None` means no such channel is visible to the token.
    pub async fn resolve_channel(&mut self, name: &str) -> Result<Option<String>> {
        let mut cursor: Option<String> = None;

        loop {
            let page = self.api.list_channels(cursor.as_deref()).await?;
            self.stats.channel_pages += 1;

            if let Some(channel) = page.data.channels.iter().find(|c| c.name == name) {
                tracing::debug!("Resolved #{} to {}", name, channel.id);
                return Ok(Some(channel.id.clone()));
            }

            match page.cursor() {
                Some(next) => cursor = Some(next.to_string()),
                None => break,
            }
        }

        Ok(None)
    }

    /// Look up a user, hitting the API only on a cache miss.
    ///
    /// A failed lookup yields a placeholder named after the raw id, which is
    /// not cached. A failed avatar download leaves the avatar empty.
    pub async fn fetch_user(&mut self, user_id: &str) -> Arc<User> {
        if let Some(user) = self.users.get(user_id) {
            return user;
        }

        let raw = match self.api.get_user_info(user_id).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to fetch user {}: {}", user_id, e);
                self.stats.users_degraded += 1;
                return Arc::new(User::degraded(user_id));
            }
        };

        let avatar = match raw.profile.image_48.as_deref() {
            Some(url) if !url.is_empty() => self.fetch_attachment_bytes(url).await,
            _ => None,
        };

        let display_name = raw
            .profile
            .display_name
            .filter(|n| !n.is_empty())
            .unwrap_or(raw.name);

        self.stats.users_fetched += 1;
        self.users.insert(User {
            id: user_id.to_string(),
            display_name,
            real_name: raw.profile.real_name.unwrap_or_default(),
            avatar,
        })
    }

    /// Download a file. Any failure yields `None`.
    pub async fn fetch_attachment_bytes(&self, url: &str) -> Option<Vec<u8>> {
        match self.api.download(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to download {}: {}", url, e);
                None
            }
        }
    }

    /// Resolve the author and download image files of a raw message.
    pub async fn enrich(&mut self, raw: &RawMessage) -> Message {
        let author = match raw.user.as_deref() {
            Some(user_id) if !user_id.is_empty() => self.fetch_user(user_id).await,
            _ => {
                let name = raw
                    .username
                    .as_deref()
                    .or(raw.bot_id.as_deref())
                    .unwrap_or("unknown");
                Arc::new(User::degraded(name))
            }
        };

        let mut attachments = Vec::new();
        for file in &raw.files {
            if !file.is_image() {
                tracing::debug!("Skipping non-image file {} ({})", file.name, file.mime_type());
                self.stats.files_skipped += 1;
                continue;
            }

            let Some(url) = file.url_private.as_deref() else {
                self.stats.files_failed += 1;
                continue;
            };

            match self.fetch_attachment_bytes(url).await {
                Some(data) => {
                    self.stats.attachments += 1;
                    attachments.push(Attachment {
                        filename: file.name.clone(),
                        mime_type: file.mime_type(),
                        data,
                    });
                }
                None => self.stats.files_failed += 1,
            }
        }

        Message {
            author,
            text: raw.text.clone(),
            timestamp: raw.ts.clone(),
            thread_timestamp: raw.thread_ts.clone().filter(|ts| !ts.is_empty()),
            attachments,
            replies: Vec::new(),
        }
    }

    /// Fetch every reply of a thread, oldest first.
    ///
    /// The parent leads each page and is skipped. A failed page stops the
    /// walk and whatever was gathered so far is returned.
    pub async fn fetch_replies(&mut self, channel_id: &str, thread_ts: &str) -> Vec<Message> {
        let mut replies = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = match self
                .api
                .get_replies(channel_id, thread_ts, cursor.as_deref())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("Failed to fetch replies for thread {}: {}", thread_ts, e);
                    self.stats.truncated_threads += 1;
                    break;
                }
            };
            self.stats.reply_pages += 1;

            for raw in page.data.messages.iter().skip(1) {
                let reply = self.enrich(raw).await;
                replies.push(reply);
            }

            match page.next_page_cursor() {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        sort_by_timestamp(&mut replies);
        self.stats.replies += replies.len() as u64;
        replies
    }

    /// Export a channel's full history, oldest message first.
    ///
    /// An unknown channel or a failed history page aborts the export.
    pub async fn export_channel(&mut self, name: &str) -> Result<Vec<Message>> {
        let channel_id = self
            .resolve_channel(name)
            .await?
            .ok_or_else(|| Error::ChannelNotFound(name.to_string()))?;

        if let Err(e) = self.api.join_channel(&channel_id).await {
            tracing::debug!("Join of #{} ignored: {}", name, e);
        }

        tracing::info!("Exporting #{} ({})...", name, channel_id);

        let mut messages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .api
                .get_history(&channel_id, cursor.as_deref())
                .await?;
            self.stats.history_pages += 1;

            let next = page.next_page_cursor();

            // Pages arrive newest-first.
            let mut raw_messages = page.data.messages;
            raw_messages.reverse();

            for raw in &raw_messages {
                let mut message = self.enrich(raw).await;
                if raw.reply_count > 0 {
                    message.replies = self.fetch_replies(&channel_id, &raw.ts).await;
                }
                messages.push(message);
                self.stats.messages += 1;
                self.report(format!(
                    "#{}: {} messages, {} replies",
                    name, self.stats.messages, self.stats.replies
                ));
            }

            match next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        sort_by_timestamp(&mut messages);

        tracing::info!(
            "Export of #{} complete: {} messages, {} replies, {} images",
            name,
            self.stats.messages,
            self.stats.replies,
            self.stats.attachments
        );

        Ok(messages)
    }
}
