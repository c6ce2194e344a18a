//! User-visible notifications (toasts) raised by board actions.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub timestamp: DateTime<Utc>,
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: String) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message,
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    fn success(&self, message: String) {
        self.notify(Notification::new(NotificationLevel::Success, message));
    }

    fn error(&self, message: String) {
        self.notify(Notification::new(NotificationLevel::Error, message));
    }
}

/// Keeps every notification in arrival order.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Mutex<Vec<Notification>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Notification> {
        self.entries.lock().clone()
    }

    pub fn count(&self, level: NotificationLevel) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|n| n.level == level)
            .count()
    }

    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.entries.lock())
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        self.entries.lock().push(notification);
    }
}

/// Forwards notifications to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => {
                tracing::info!(toast = "success", "{}", notification.message)
            }
            NotificationLevel::Error => {
                tracing::warn!(toast = "error", "{}", notification.message)
            }
        }
    }
}
