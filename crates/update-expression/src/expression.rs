//! Built update expressions and their rendered forms.

use std::collections::BTreeMap;
use std::fmt;

use crate::{NAME_PLACEHOLDER_PREFIX, SET_KEYWORD, VALUE_PLACEHOLDER_PREFIX};

/// One `#name = :value` clause of an update expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment<V> {
    attribute: String,
    value: V,
}

impl<V> Assignment<V> {
    pub(crate) const fn new(attribute: String, value: V) -> Self {
        Self { attribute, value }
    }

    /// Attribute being overwritten.
    #[must_use]
    pub fn attribute(&self) -> &str {
        self.attribute.as_str()
    }

    /// New value for the attribute.
    #[must_use]
    pub const fn value(&self) -> &V {
        &self.value
    }

    /// Name placeholder standing in for the attribute (`#attribute`).
    #[must_use]
    pub fn name_placeholder(&self) -> String {
        format!("{NAME_PLACEHOLDER_PREFIX}{}", self.attribute)
    }

    /// Value placeholder standing in for the value (`:attribute`).
    #[must_use]
    pub fn value_placeholder(&self) -> String {
        format!("{VALUE_PLACEHOLDER_PREFIX}{}", self.attribute)
    }
}

/// A non-empty set of attribute assignments applied as one `SET` instruction.
///
/// ## Invariants
/// - At least one assignment is present.
/// - Attribute names are unique and valid placeholder suffixes.
///
/// Instances are obtained from [`crate::UpdateExpressionBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateExpression<V> {
    assignments: Vec<Assignment<V>>,
}

impl<V> UpdateExpression<V> {
    pub(crate) const fn from_assignments(assignments: Vec<Assignment<V>>) -> Self {
        Self { assignments }
    }

    /// Assignments in insertion order.
    #[must_use]
    pub fn assignments(&self) -> &[Assignment<V>] {
        &self.assignments
    }

    /// Number of attributes the instruction overwrites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Always `false`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Render the instruction text, e.g. `SET #fName = :fName, #email = :email`.
    #[must_use]
    pub fn expression(&self) -> String {
        let clauses = self
            .assignments
            .iter()
            .map(|assignment| {
                format!(
                    "{} = {}",
                    assignment.name_placeholder(),
                    assignment.value_placeholder()
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("{SET_KEYWORD} {clauses}")
    }

    /// Name alias table mapping `#attribute` to `attribute`.
    #[must_use]
    pub fn attribute_names(&self) -> BTreeMap<String, String> {
        self.assignments
            .iter()
            .map(|assignment| (assignment.name_placeholder(), assignment.attribute.clone()))
            .collect()
    }

    /// Value alias table mapping `:attribute` to a clone of the value.
    #[must_use]
    pub fn attribute_values(&self) -> BTreeMap<String, V>
    where
        V: Clone,
    {
        self.assignments
            .iter()
            .map(|assignment| (assignment.value_placeholder(), assignment.value.clone()))
            .collect()
    }

    /// Consume the expression and return its value alias table.
    #[must_use]
    pub fn into_attribute_values(self) -> BTreeMap<String, V> {
        self.assignments
            .into_iter()
            .map(|assignment| {
                let placeholder = assignment.value_placeholder();
                (placeholder, assignment.value)
            })
            .collect()
    }
}

impl<V> fmt::Display for UpdateExpression<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression())
    }
}
