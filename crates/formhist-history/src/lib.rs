//! Undo/redo history for whole-form snapshots.
//!
//! A `HistoryStore` records the form's previous value on every user edit,
//! steps backward and forward through those values, and ignores the change
//! events the form emits while a stored value is being written back.

pub mod config;
pub mod form;
pub mod notify;
pub mod session;
pub mod snapshot;
pub mod store;

pub use config::HistoryConfig;
pub use form::{FieldKind, FieldSpec, Form, FormAdapter, FormSchema};
pub use notify::{
    Notification, NotificationKind, NotificationSink, RecordingSink, Severity, TracingSink,
};
pub use session::FormSession;
pub use snapshot::{FieldValue, Snapshot};
pub use store::{HistoryStore, Mode, StepOutcome};
