//! The live form: field schema, user edits and snapshot replay.

use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::snapshot::{FieldValue, Snapshot};

/// The type of value a field holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Number,
    Bool,
    Choice { options: Vec<String> },
}

impl FieldKind {
    /// Whether `value` is acceptable for a field of this kind.
    ///
    /// Numbers must be finite so snapshots stay equal to their copies.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (Self::Text, FieldValue::Text(_)) | (Self::Bool, FieldValue::Bool(_)) => true,
            (Self::Number, FieldValue::Number(n)) => n.is_finite(),
            (Self::Choice { options }, FieldValue::Choice(c)) => options.contains(c),
            _ => false,
        }
    }

    /// The value a field of this kind starts with when none is given.
    ///
    /// Choice fields start at their first option.
    pub fn zero_value(&self) -> FieldValue {
        match self {
            Self::Text => FieldValue::Text(String::new()),
            Self::Number => FieldValue::Number(0.0),
            Self::Bool => FieldValue::Bool(false),
            Self::Choice { options } => {
                FieldValue::Choice(options.first().cloned().unwrap_or_default())
            }
        }
    }

    /// Parses raw user text into a value of this kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid value for the kind.
    pub fn parse(&self, raw: &str) -> Result<FieldValue> {
        let value = match self {
            Self::Text => FieldValue::Text(raw.to_string()),
            Self::Number => {
                let n: f64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("'{raw}' is not a number"))?;
                if !n.is_finite() {
                    bail!("'{raw}' is not a finite number");
                }
                FieldValue::Number(n)
            }
            Self::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => FieldValue::Bool(true),
                "false" | "no" | "off" | "0" => FieldValue::Bool(false),
                _ => bail!("'{raw}' is not a boolean"),
            },
            Self::Choice { options } => {
                let raw = raw.trim();
                if !options.iter().any(|o| o == raw) {
                    bail!("'{raw}' is not one of: {}", options.join(", "));
                }
                FieldValue::Choice(raw.to_string())
            }
        };
        Ok(value)
    }
}

/// Declaration of a single form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    /// Initial value. `None` uses [`FieldKind::zero_value`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<FieldValue>,
}

impl FieldSpec {
    /// A text field starting empty.
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Text,
            default: None,
        }
    }

    pub fn initial_value(&self) -> FieldValue {
        self.default
            .clone()
            .unwrap_or_else(|| self.kind.zero_value())
    }
}

/// Ordered set of field declarations making up a form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSchema {
    fields: Vec<FieldSpec>,
}

impl FormSchema {
    /// Builds a schema, checking that names are unique and defaults match.
    ///
    /// # Errors
    ///
    /// Returns an error on an empty or duplicate name, a choice field
    /// without options, or a default its kind does not accept.
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self> {
        let mut seen = HashSet::new();
        for field in &fields {
            if field.name.is_empty() {
                bail!("field names must not be empty");
            }
            if !seen.insert(field.name.as_str()) {
                bail!("duplicate field '{}'", field.name);
            }
            if let FieldKind::Choice { options } = &field.kind {
                if options.is_empty() {
                    bail!("choice field '{}' has no options", field.name);
                }
            }
            if let Some(default) = &field.default {
                if !field.kind.accepts(default) {
                    bail!(
                        "default for '{}' is a {} value, which its kind does not accept",
                        field.name,
                        default.kind_name()
                    );
                }
            }
        }
        Ok(Self { fields })
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Snapshot of every field at its initial value.
    pub fn initial_snapshot(&self) -> Snapshot {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.initial_value()))
            .collect()
    }
}

/// The form side of the history boundary.
///
/// Every change to the form, whether by the user or by
/// [`FormAdapter::apply_all`], queues one change event carrying the full
/// value after the change. Whoever drives the form drains those events
/// with [`FormAdapter::take_changes`] and hands them to the history store.
pub trait FormAdapter {
    /// The full current value.
    fn value(&self) -> Snapshot;

    /// Overwrites every field with the values in `snapshot`.
    ///
    /// Queues exactly one change event.
    fn apply_all(&mut self, snapshot: &Snapshot);

    /// Drains queued change events in emission order.
    fn take_changes(&mut self) -> Vec<Snapshot>;
}

/// In-memory form backed by a [`FormSchema`].
#[derive(Debug, Clone)]
pub struct Form {
    schema: FormSchema,
    value: Snapshot,
    pending: Vec<Snapshot>,
}

impl Form {
    /// Creates a form with every field at its initial value.
    pub fn new(schema: FormSchema) -> Self {
        let value = schema.initial_snapshot();
        Self {
            schema,
            value,
            pending: Vec::new(),
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    /// Sets one field as a user edit.
    ///
    /// # Errors
    ///
    /// Returns an error if the field does not exist or `value` does not
    /// fit the field's kind. The form is unchanged in that case.
    pub fn set_field(&mut self, name: &str, value: FieldValue) -> Result<()> {
        let Some(spec) = self.schema.field(name) else {
            bail!("unknown field '{name}'");
        };
        if !spec.kind.accepts(&value) {
            bail!(
                "field '{name}' does not accept the {} value {value}",
                value.kind_name()
            );
        }
        self.value = self.value.with_field(name, value);
        self.pending.push(self.value.clone());
        Ok(())
    }

    /// Parses `raw` according to the field's kind and sets it.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown fields or unparseable input.
    pub fn set_field_from_str(&mut self, name: &str, raw: &str) -> Result<()> {
        let Some(spec) = self.schema.field(name) else {
            bail!("unknown field '{name}'");
        };
        let value = spec
            .kind
            .parse(raw)
            .with_context(|| format!("invalid value for field '{name}'"))?;
        self.set_field(name, value)
    }

    /// Submits the form, returning the submitted value.
    pub fn submit(&self) -> Snapshot {
        tracing::info!("Form submitted: {}", self.value);
        self.value.clone()
    }
}

impl FormAdapter for Form {
    fn value(&self) -> Snapshot {
        self.value.clone()
    }

    fn apply_all(&mut self, snapshot: &Snapshot) {
        if !self.value.same_shape(snapshot) {
            tracing::warn!("Applying a snapshot whose fields differ from the form's");
        }
        self.value = snapshot.clone();
        self.pending.push(self.value.clone());
    }

    fn take_changes(&mut self) -> Vec<Snapshot> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("name"),
            FieldSpec {
                name: "age".to_string(),
                kind: FieldKind::Number,
                default: Some(FieldValue::Number(18.0)),
            },
            FieldSpec {
                name: "gender".to_string(),
                kind: FieldKind::Choice {
                    options: vec!["male".to_string(), "female".to_string()],
                },
                default: None,
            },
        ])
        .expect("valid schema")
    }

    #[test]
    fn test_initial_values() {
        let form = Form::new(schema());
        let value = form.value();
        assert_eq!(value.get("name"), Some(&FieldValue::text("")));
        assert_eq!(value.get("age"), Some(&FieldValue::Number(18.0)));
        assert_eq!(value.get("gender"), Some(&FieldValue::choice("male")));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = FormSchema::new(vec![FieldSpec::text("a"), FieldSpec::text("a")]);
        assert!(err.is_err());
    }

    #[test]
    fn test_mismatched_default_rejected() {
        let err = FormSchema::new(vec![FieldSpec {
            name: "age".to_string(),
            kind: FieldKind::Number,
            default: Some(FieldValue::text("old")),
        }]);
        assert!(err.is_err());
    }

    #[test]
    fn test_choice_without_options_rejected() {
        let err = FormSchema::new(vec![FieldSpec {
            name: "gender".to_string(),
            kind: FieldKind::Choice { options: vec![] },
            default: None,
        }]);
        assert!(err.is_err());
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        for raw in ["NaN", "inf", "-infinity"] {
            assert!(FieldKind::Number.parse(raw).is_err(), "{raw} accepted");
        }
        assert!(!FieldKind::Number.accepts(&FieldValue::Number(f64::NAN)));
        assert!(!FieldKind::Number.accepts(&FieldValue::Number(f64::INFINITY)));
        assert!(FieldKind::Number.accepts(&FieldValue::Number(-2.5)));

        let mut form = Form::new(schema());
        assert!(form.set_field_from_str("age", "NaN").is_err());
        assert!(form.set_field("age", FieldValue::Number(f64::NAN)).is_err());
        assert!(form.take_changes().is_empty());
        assert_eq!(form.value(), form.value().clone());
    }

    #[test]
    fn test_set_field_queues_change() {
        let mut form = Form::new(schema());
        form.set_field("name", FieldValue::text("Jo")).expect("set");
        let changes = form.take_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].get("name"), Some(&FieldValue::text("Jo")));
        assert!(form.take_changes().is_empty());
    }

    #[test]
    fn test_set_field_rejects_unknown_and_mismatched() {
        let mut form = Form::new(schema());
        assert!(form.set_field("nope", FieldValue::text("x")).is_err());
        assert!(form.set_field("age", FieldValue::text("x")).is_err());
        assert!(form.set_field("gender", FieldValue::choice("other")).is_err());
        assert!(form.take_changes().is_empty());
        assert_eq!(form.value(), schema().initial_snapshot());
    }

    #[test]
    fn test_set_field_from_str() {
        let mut form = Form::new(schema());
        form.set_field_from_str("age", " 42 ").expect("number");
        form.set_field_from_str("gender", "female").expect("choice");
        assert_eq!(form.value().get("age"), Some(&FieldValue::Number(42.0)));
        assert_eq!(form.value().get("gender"), Some(&FieldValue::choice("female")));
        assert!(form.set_field_from_str("age", "forty").is_err());
    }

    #[test]
    fn test_bool_parsing() {
        assert_eq!(FieldKind::Bool.parse("Yes").unwrap(), FieldValue::Bool(true));
        assert_eq!(FieldKind::Bool.parse("0").unwrap(), FieldValue::Bool(false));
        assert!(FieldKind::Bool.parse("maybe").is_err());
    }

    #[test]
    fn test_apply_all_overwrites_and_queues_one_change() {
        let mut form = Form::new(schema());
        let target = form
            .value()
            .with_field("name", FieldValue::text("Ann"))
            .with_field("age", FieldValue::Number(5.0));
        form.apply_all(&target);
        assert_eq!(form.value(), target);
        assert_eq!(form.take_changes(), vec![target]);
    }

    #[test]
    fn test_field_kind_json() {
        let kind: FieldKind =
            serde_json::from_str(r#"{"type":"choice","options":["a","b"]}"#).expect("parse");
        assert_eq!(
            kind,
            FieldKind::Choice {
                options: vec!["a".to_string(), "b".to_string()]
            }
        );
        let text: FieldKind = serde_json::from_str(r#"{"type":"text"}"#).expect("parse");
        assert_eq!(text, FieldKind::Text);
    }
}
