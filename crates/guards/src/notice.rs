//! User-facing notices published instead of blocking dialogs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use common::AppError;

/// Buffered notices per subscriber before the oldest are dropped
const NOTICE_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message for whatever surface is showing notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub issued_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            issued_at: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    /// Error notice carrying the error's user-facing message
    pub fn from_error(error: &AppError) -> Self {
        Self::new(NoticeLevel::Error, error.user_message())
    }
}

/// Broadcast channel for notices. Cloning shares the channel.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    sender: broadcast::Sender<Notice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(NOTICE_CAPACITY);
        Self { sender }
    }

    /// Publish to current subscribers. With none, the notice is dropped.
    pub fn publish(&self, notice: Notice) {
        if self.sender.send(notice).is_err() {
            debug!("Notice dropped: no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_published_notices() {
        let board = NoticeBoard::new();
        let mut first = board.subscribe();
        let mut second = board.clone().subscribe();

        board.publish(Notice::warning("Please sign in to continue."));

        assert_eq!(first.recv().await.unwrap().level, NoticeLevel::Warning);
        assert_eq!(
            second.recv().await.unwrap().message,
            "Please sign in to continue."
        );
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        NoticeBoard::new().publish(Notice::info("nobody listening"));
    }

    #[test]
    fn test_error_notice_hides_internals() {
        let notice = Notice::from_error(&AppError::internal("mutex poisoned"));
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "An internal error occurred");
    }
}
