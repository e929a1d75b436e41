use tokio::sync::broadcast;

use crate::limits::NOTICE_CHANNEL_CAPACITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// User-facing message about the outcome of an engine operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Error".into(),
            description: description.into(),
        }
    }
}

/// Broadcast hub for notices. One per engine.
pub struct NoticeHub {
    sender: broadcast::Sender<Notice>,
}

impl Default for NoticeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NoticeHub {
    pub fn new() -> Self {
        Self {
            sender: broadcast::channel(NOTICE_CHANNEL_CAPACITY).0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }

    /// Send a notice. No-op if nobody is listening.
    pub fn send(&self, notice: Notice) {
        let _ = self.sender.send(notice);
    }
}
