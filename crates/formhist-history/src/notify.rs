//! Outcome messages reported by the history store.

use std::fmt;

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    UndoSucceeded,
    RedoSucceeded,
    /// Only sent when `HistoryConfig::notify_on_empty` is set.
    NothingToUndo,
    /// Only sent when `HistoryConfig::notify_on_empty` is set.
    NothingToRedo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
}

/// A human-readable outcome message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub severity: Severity,
    /// Short title, e.g. "Undo".
    pub summary: String,
    /// One-sentence description of what happened.
    pub detail: String,
}

impl Notification {
    /// Builds the standard message for `kind`.
    pub fn for_kind(kind: NotificationKind) -> Self {
        let (severity, summary, detail) = match kind {
            NotificationKind::UndoSucceeded => {
                (Severity::Success, "Undo", "Last change has been reverted.")
            }
            NotificationKind::RedoSucceeded => {
                (Severity::Success, "Redo", "Redo change has been recovered.")
            }
            NotificationKind::NothingToUndo => (Severity::Info, "Undo", "Nothing to undo."),
            NotificationKind::NothingToRedo => (Severity::Info, "Redo", "Nothing to redo."),
        };
        Self {
            kind,
            severity,
            summary: summary.to_string(),
            detail: detail.to_string(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.summary, self.detail)
    }
}

/// Receives outcome messages from undo/redo.
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

impl<T: NotificationSink + ?Sized> NotificationSink for &mut T {
    fn notify(&mut self, notification: Notification) {
        (**self).notify(notification);
    }
}

/// Forwards notifications to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&mut self, notification: Notification) {
        tracing::info!(kind = ?notification.kind, "{notification}");
    }
}

/// Collects notifications in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    received: Vec<Notification>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far, oldest first.
    pub fn received(&self) -> &[Notification] {
        &self.received
    }

    /// Kinds of the notifications received so far.
    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.received.iter().map(|n| n.kind).collect()
    }

    /// Removes and returns everything received so far.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.received)
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, notification: Notification) {
        self.received.push(notification);
    }
}
