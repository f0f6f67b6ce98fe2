//! Notification sinks.

use tracing::{info, warn};

use crate::ports::NotificationSink;

/// Forwards notifications to `tracing` under the `polymend::notify` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn info(&mut self, message: &str) {
        info!(target: "polymend::notify", "{}", message);
    }

    fn warn(&mut self, message: &str) {
        warn!(target: "polymend::notify", "{}", message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
}

/// One recorded notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

/// Keeps every notification in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub messages: Vec<Notification>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages of one level, in arrival order.
    pub fn at(&self, level: Level) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|n| n.level == level)
            .map(|n| n.message.as_str())
            .collect()
    }

    /// True if any message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|n| n.message.contains(needle))
    }
}

impl NotificationSink for RecordingSink {
    fn info(&mut self, message: &str) {
        self.messages.push(Notification {
            level: Level::Info,
            message: message.to_string(),
        });
    }

    fn warn(&mut self, message: &str) {
        self.messages.push(Notification {
            level: Level::Warn,
            message: message.to_string(),
        });
    }
}
