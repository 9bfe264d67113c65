//! Undo/redo state machine over whole-form snapshots.
//!
//! The store keeps the value the form had before each user edit. Undo and
//! redo write a stored value back into the form; the change events the
//! form emits while doing so are delivered inside a replay scope and are
//! not recorded.

use std::ops::{Deref, DerefMut};

use crate::config::HistoryConfig;
use crate::form::FormAdapter;
use crate::notify::{Notification, NotificationKind, NotificationSink};
use crate::snapshot::Snapshot;

/// Whether the store is currently writing history back into the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    /// Change events are observed but not recorded.
    ApplyingHistory,
}

/// Result of an undo or redo request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A snapshot was restored into the form.
    Applied,
    /// The relevant stack was empty; nothing changed.
    EmptyHistory,
}

impl StepOutcome {
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Undo,
    Redo,
}

impl Direction {
    fn succeeded(self) -> NotificationKind {
        match self {
            Self::Undo => NotificationKind::UndoSucceeded,
            Self::Redo => NotificationKind::RedoSucceeded,
        }
    }

    fn empty(self) -> NotificationKind {
        match self {
            Self::Undo => NotificationKind::NothingToUndo,
            Self::Redo => NotificationKind::NothingToRedo,
        }
    }
}

/// Undo/redo history for a single form.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    /// Values before each recorded edit, oldest first.
    undo_stack: Vec<Snapshot>,
    /// Values undone away from, most recently undone on top.
    redo_stack: Vec<Snapshot>,
    mode: Mode,
    /// Last value observed from the form.
    current: Snapshot,
    config: HistoryConfig,
}

impl HistoryStore {
    /// Creates an empty store for a form whose value is currently `initial`.
    pub fn new(initial: Snapshot, mut config: HistoryConfig) -> Self {
        config.sanitize();
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            mode: Mode::Idle,
            current: initial,
            config,
        }
    }

    /// Creates an empty store seeded with the form's current value.
    pub fn for_form<F: FormAdapter + ?Sized>(form: &F, config: HistoryConfig) -> Self {
        Self::new(form.value(), config)
    }

    /// Handles a change event from the form.
    ///
    /// Outside a replay, the value the form had before this change is
    /// pushed onto the undo stack and the redo stack is cleared. During a
    /// replay only the tracked current value is refreshed. Returns whether
    /// the change was recorded.
    pub fn on_form_changed(&mut self, snapshot: Snapshot) -> bool {
        if self.mode == Mode::ApplyingHistory {
            tracing::trace!("Ignoring form change during history replay");
            self.current = snapshot;
            return false;
        }
        if self.config.skip_unchanged && snapshot == self.current {
            return false;
        }

        let previous = std::mem::replace(&mut self.current, snapshot);
        self.undo_stack.push(previous);
        self.redo_stack.clear();

        if let Some(max) = self.config.max_depth {
            if self.undo_stack.len() > max {
                let excess = self.undo_stack.len() - max;
                self.undo_stack.drain(..excess);
            }
        }
        tracing::debug!(undo_depth = self.undo_stack.len(), "Recorded form change");
        true
    }

    /// Restores the value the form had before the most recent edit.
    pub fn undo<F, N>(&mut self, form: &mut F, sink: &mut N) -> StepOutcome
    where
        F: FormAdapter + ?Sized,
        N: NotificationSink + ?Sized,
    {
        self.step(Direction::Undo, form, sink)
    }

    /// Re-applies the most recently undone value.
    pub fn redo<F, N>(&mut self, form: &mut F, sink: &mut N) -> StepOutcome
    where
        F: FormAdapter + ?Sized,
        N: NotificationSink + ?Sized,
    {
        self.step(Direction::Redo, form, sink)
    }

    fn step<F, N>(&mut self, direction: Direction, form: &mut F, sink: &mut N) -> StepOutcome
    where
        F: FormAdapter + ?Sized,
        N: NotificationSink + ?Sized,
    {
        // User edits queued before this step are recorded first.
        for change in form.take_changes() {
            self.on_form_changed(change);
        }

        if self.stacks_mut(direction).0.is_empty() {
            tracing::debug!(?direction, "History empty, nothing to do");
            if self.config.notify_on_empty {
                sink.notify(Notification::for_kind(direction.empty()));
            }
            return StepOutcome::EmptyHistory;
        }

        {
            let mut scope = self.begin_replay();
            let (source, target) = scope.stacks_mut(direction);
            let Some(restored) = source.pop() else {
                return StepOutcome::EmptyHistory;
            };
            // Captured before the overwrite.
            target.push(form.value());
            form.apply_all(&restored);
            for change in form.take_changes() {
                scope.on_form_changed(change);
            }
            scope.current = form.value();
        }

        tracing::debug!(
            ?direction,
            undo_depth = self.undo_stack.len(),
            redo_depth = self.redo_stack.len(),
            "Restored snapshot"
        );
        sink.notify(Notification::for_kind(direction.succeeded()));
        StepOutcome::Applied
    }

    /// Returns `(pop from, push to)` for a step in `direction`.
    fn stacks_mut(&mut self, direction: Direction) -> (&mut Vec<Snapshot>, &mut Vec<Snapshot>) {
        match direction {
            Direction::Undo => (&mut self.undo_stack, &mut self.redo_stack),
            Direction::Redo => (&mut self.redo_stack, &mut self.undo_stack),
        }
    }

    fn begin_replay(&mut self) -> ReplayScope<'_> {
        self.mode = Mode::ApplyingHistory;
        ReplayScope { store: self }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Undo entries, oldest first.
    pub fn undo_entries(&self) -> &[Snapshot] {
        &self.undo_stack
    }

    /// Redo entries, the next one to redo last.
    pub fn redo_entries(&self) -> &[Snapshot] {
        &self.redo_stack
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_applying_history(&self) -> bool {
        self.mode == Mode::ApplyingHistory
    }

    /// The last value observed from the form.
    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    /// Drops both stacks. The tracked current value is kept.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

/// Keeps the store in [`Mode::ApplyingHistory`] until dropped.
///
/// Dropping restores [`Mode::Idle`], including when a form adapter panics
/// mid-replay.
struct ReplayScope<'a> {
    store: &'a mut HistoryStore,
}

impl Deref for ReplayScope<'_> {
    type Target = HistoryStore;

    fn deref(&self) -> &HistoryStore {
        &*self.store
    }
}

impl DerefMut for ReplayScope<'_> {
    fn deref_mut(&mut self) -> &mut HistoryStore {
        &mut *self.store
    }
}

impl Drop for ReplayScope<'_> {
    fn drop(&mut self) {
        self.store.mode = Mode::Idle;
    }
}
