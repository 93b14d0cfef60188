//! User-visible notifications.
//!
//! Store operations report outcomes ("Margherita added to cart", "Login
//! successful!") through a [`Notifier`] instead of returning errors. The
//! front end decides how to show them.

use std::sync::{Mutex, PoisonError};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    /// A success message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    /// An error message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Sink for user-visible notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Emits notifications as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => {
                tracing::info!(target: "pizzeria::notify", "{}", notification.message);
            }
            NotificationLevel::Error => {
                tracing::warn!(target: "pizzeria::notify", "{}", notification.message);
            }
        }
    }
}

/// Keeps every notification so the caller can show them later.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything received so far.
    pub fn drain(&self) -> Vec<Notification> {
        let mut received = self.received.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *received)
    }

    /// Messages received so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        let received = self.received.lock().unwrap_or_else(PoisonError::into_inner);
        received.iter().map(|n| n.message.clone()).collect()
    }

    /// The most recent notification, if any.
    #[must_use]
    pub fn last(&self) -> Option<Notification> {
        let received = self.received.lock().unwrap_or_else(PoisonError::into_inner);
        received.last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_drain() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notification::success("one"));
        notifier.notify(Notification::error("two"));

        assert_eq!(notifier.messages(), vec!["one", "two"]);
        assert_eq!(
            notifier.last().map(|n| n.level),
            Some(NotificationLevel::Error)
        );

        assert_eq!(notifier.drain().len(), 2);
        assert!(notifier.messages().is_empty());
    }
}
