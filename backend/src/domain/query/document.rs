//! Structured query documents executed by the schema.
//!
//! Documents are trees, never strings: argument values travel as typed
//! [`InputValue`]s so user text cannot add clauses. [`fmt::Display`] renders
//! the schema-language text; [`QueryDocument::redacted`] renders the same
//! text with secret values masked, for logs and error bodies.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::user::PASSWORD_ATTRIBUTE;

const SECRET_NAMES: [&str; 1] = [PASSWORD_ATTRIBUTE];
const REDACTED_VALUE: &str = "\"[REDACTED]\"";

/// Whether secret values are written out or masked.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Secrets {
    Reveal,
    Mask,
}

/// Root operation type of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// Read-only root.
    Query,
    /// Mutating root.
    Mutation,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
        })
    }
}

/// Argument value. JSON-encoded untagged: `null`, `true`, `7`, `"x"`, `{...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    /// Explicit null.
    Null,
    /// Boolean literal.
    Boolean(bool),
    /// Integer literal.
    Int(i64),
    /// String literal.
    String(String),
    /// Input object.
    Object(BTreeMap<String, InputValue>),
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for InputValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, Secrets::Reveal)
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &InputValue, secrets: Secrets) -> fmt::Result {
    match value {
        InputValue::Null => f.write_str("null"),
        InputValue::Boolean(value) => write!(f, "{value}"),
        InputValue::Int(value) => write!(f, "{value}"),
        InputValue::String(value) => {
            let escaped = serde_json::to_string(value).map_err(|_| fmt::Error)?;
            f.write_str(&escaped)
        }
        InputValue::Object(fields) => {
            f.write_str("{")?;
            write_entries(f, fields, secrets)?;
            f.write_str("}")
        }
    }
}

/// `name: value` pairs joined by `, `, masking secret names when asked.
fn write_entries(
    f: &mut fmt::Formatter<'_>,
    entries: &BTreeMap<String, InputValue>,
    secrets: Secrets,
) -> fmt::Result {
    for (index, (name, value)) in entries.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{name}: ")?;
        if secrets == Secrets::Mask && SECRET_NAMES.contains(&name.as_str()) {
            f.write_str(REDACTED_VALUE)?;
        } else {
            write_value(f, value, secrets)?;
        }
    }
    Ok(())
}

/// One root field with its arguments and sub-selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelection {
    /// Root field name, e.g. `getUser`.
    pub name: String,
    /// Arguments keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub arguments: BTreeMap<String, InputValue>,
    /// Selected sub-fields for object results; empty for scalars.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selection: Vec<String>,
}

impl FieldSelection {
    /// Select `name` with no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: BTreeMap::new(),
            selection: Vec::new(),
        }
    }

    /// Attach an argument.
    #[must_use]
    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    /// Select sub-fields of an object result.
    #[must_use]
    pub fn with_selection<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = fields.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Display for FieldSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_field(f, self, Secrets::Reveal)
    }
}

fn write_field(f: &mut fmt::Formatter<'_>, field: &FieldSelection, secrets: Secrets) -> fmt::Result {
    f.write_str(&field.name)?;
    if !field.arguments.is_empty() {
        f.write_str("(")?;
        write_entries(f, &field.arguments, secrets)?;
        f.write_str(")")?;
    }
    if !field.selection.is_empty() {
        write!(f, " {{ {} }}", field.selection.join(" "))?;
    }
    Ok(())
}

/// Executable document: one operation type and its root fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDocument {
    /// Root operation type.
    pub operation: OperationType,
    /// Root fields in execution order.
    pub fields: Vec<FieldSelection>,
}

impl QueryDocument {
    /// Query document selecting one field.
    pub fn query(field: FieldSelection) -> Self {
        Self {
            operation: OperationType::Query,
            fields: vec![field],
        }
    }

    /// Mutation document selecting one field.
    pub fn mutation(field: FieldSelection) -> Self {
        Self {
            operation: OperationType::Mutation,
            fields: vec![field],
        }
    }

    /// Schema-language rendering with secret argument values masked.
    ///
    /// # Examples
    /// ```
    /// use user_intents::domain::query::{FieldSelection, QueryDocument};
    ///
    /// let document = QueryDocument::mutation(
    ///     FieldSelection::new("updateUser").with_argument("password", "hunter2"),
    /// );
    /// assert_eq!(
    ///     document.redacted().to_string(),
    ///     r#"mutation { updateUser(password: "[REDACTED]") }"#
    /// );
    /// ```
    pub fn redacted(&self) -> RedactedDocument<'_> {
        RedactedDocument(self)
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, secrets: Secrets) -> fmt::Result {
        write!(f, "{} {{ ", self.operation)?;
        for (index, field) in self.fields.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write_field(f, field, secrets)?;
        }
        f.write_str(" }")
    }
}

impl fmt::Display for QueryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, Secrets::Reveal)
    }
}

/// Borrowed [`QueryDocument`] that displays with secrets masked.
#[derive(Debug, Clone, Copy)]
pub struct RedactedDocument<'a>(&'a QueryDocument);

impl fmt::Display for RedactedDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.write(f, Secrets::Mask)
    }
}
