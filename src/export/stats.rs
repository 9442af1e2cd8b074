//! Export run statistics.

/// Counters collected while exporting a channel.
#[derive(Debug, Default, Clone)]
pub struct ExportStats {
    pub channel_pages: u64,
    pub history_pages: u64,
    pub reply_pages: u64,

    pub messages: u64,
    pub replies: u64,
    pub truncated_threads: u64,

    pub attachments: u64,
    pub files_skipped: u64,
    pub files_failed: u64,

    pub users_fetched: u64,
    pub users_degraded: u64,
}

impl ExportStats {
    /// Messages plus replies.
    pub fn total_messages(&self) -> u64 {
        self.messages + self.replies
    }
}
