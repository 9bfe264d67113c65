//! Tuning knobs for the history store.

use serde::{Deserialize, Serialize};

/// Configuration for a [`crate::HistoryStore`].
///
/// The default reproduces the baseline behavior: unbounded stacks, silent
/// no-op on empty undo/redo, and every change notification recorded.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Max undo entries kept. `None` = unbounded; the oldest entries are
    /// evicted once the limit is exceeded.
    pub max_depth: Option<usize>,
    /// Send a "nothing to undo/redo" notification on an empty stack.
    pub notify_on_empty: bool,
    /// Don't record a change whose value equals the current one.
    pub skip_unchanged: bool,
}

impl HistoryConfig {
    /// Default config with the undo stack capped at `max_depth` entries.
    pub fn bounded(max_depth: usize) -> Self {
        let mut config = Self {
            max_depth: Some(max_depth),
            ..Self::default()
        };
        config.sanitize();
        config
    }

    /// Resets values that have no meaningful interpretation.
    ///
    /// A depth limit of zero would discard every edit, so it is treated as
    /// no limit.
    pub fn sanitize(&mut self) {
        if self.max_depth == Some(0) {
            self.max_depth = None;
        }
    }
}
