//! A form wired to its history store and notification sink.

use anyhow::Result;

use crate::config::HistoryConfig;
use crate::form::{Form, FormAdapter};
use crate::notify::NotificationSink;
use crate::snapshot::{FieldValue, Snapshot};
use crate::store::{HistoryStore, StepOutcome};

/// Owns one form, its history and the sink that hears about undo/redo.
///
/// All change events the form emits are routed to the history store from
/// here, so a user edit can never bypass recording.
#[derive(Debug)]
pub struct FormSession<N: NotificationSink> {
    form: Form,
    history: HistoryStore,
    sink: N,
}

impl<N: NotificationSink> FormSession<N> {
    pub fn new(form: Form, config: HistoryConfig, sink: N) -> Self {
        let history = HistoryStore::for_form(&form, config);
        Self {
            form,
            history,
            sink,
        }
    }

    /// Sets a field as a user edit and records it.
    ///
    /// # Errors
    ///
    /// Returns an error if the form rejects the value; history is unchanged.
    pub fn edit(&mut self, name: &str, value: FieldValue) -> Result<()> {
        self.form.set_field(name, value)?;
        self.deliver_changes();
        Ok(())
    }

    /// Like [`FormSession::edit`], parsing `raw` by the field's kind.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown fields or unparseable input.
    pub fn edit_from_str(&mut self, name: &str, raw: &str) -> Result<()> {
        self.form.set_field_from_str(name, raw)?;
        self.deliver_changes();
        Ok(())
    }

    pub fn undo(&mut self) -> StepOutcome {
        self.history.undo(&mut self.form, &mut self.sink)
    }

    pub fn redo(&mut self) -> StepOutcome {
        self.history.redo(&mut self.form, &mut self.sink)
    }

    pub fn submit(&self) -> Snapshot {
        self.form.submit()
    }

    pub fn value(&self) -> Snapshot {
        self.form.value()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Discards all undo and redo entries.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn sink(&self) -> &N {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut N {
        &mut self.sink
    }

    fn deliver_changes(&mut self) {
        for change in self.form.take_changes() {
            self.history.on_form_changed(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FieldSpec, FormSchema};
    use crate::notify::{NotificationKind, RecordingSink};

    fn session() -> FormSession<RecordingSink> {
        let schema = FormSchema::new(vec![FieldSpec::text("name"), FieldSpec::text("email")])
            .expect("schema");
        FormSession::new(
            Form::new(schema),
            HistoryConfig::default(),
            RecordingSink::new(),
        )
    }

    #[test]
    fn test_edit_records() {
        let mut s = session();
        s.edit("name", FieldValue::text("Jo")).expect("edit");
        assert_eq!(s.history().undo_depth(), 1);
    }

    #[test]
    fn test_rejected_edit_leaves_history() {
        let mut s = session();
        assert!(s.edit("phone", FieldValue::text("123")).is_err());
        assert!(s.edit_from_str("missing", "x").is_err());
        assert_eq!(s.history().undo_depth(), 0);
    }

    #[test]
    fn test_undo_redo_notify_sink() {
        let mut s = session();
        s.edit_from_str("email", "jo@example.com").expect("edit");
        assert!(s.undo().is_applied());
        assert_eq!(s.value().get("email"), Some(&FieldValue::text("")));
        assert!(s.redo().is_applied());
        assert_eq!(
            s.value().get("email"),
            Some(&FieldValue::text("jo@example.com"))
        );
        assert_eq!(
            s.sink().kinds(),
            vec![NotificationKind::UndoSucceeded, NotificationKind::RedoSucceeded]
        );
    }

    #[test]
    fn test_clear_history() {
        let mut s = session();
        s.edit("name", FieldValue::text("Jo")).expect("edit");
        s.clear_history();
        assert_eq!(s.undo(), StepOutcome::EmptyHistory);
        assert_eq!(s.value().get("name"), Some(&FieldValue::text("Jo")));
    }

    #[test]
    fn test_submit_returns_value() {
        let mut s = session();
        s.edit("name", FieldValue::text("Jo")).expect("edit");
        assert_eq!(s.submit(), s.value());
    }
}
