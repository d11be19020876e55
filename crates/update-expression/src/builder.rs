//! Builder assembling update expressions from explicitly provided attributes.

use crate::error::UpdateExpressionError;
use crate::expression::{Assignment, UpdateExpression};
use crate::is_valid_attribute_name;

/// Accumulates attribute assignments and produces an [`UpdateExpression`].
///
/// Only attributes with a value become assignments. An absent value means
/// "leave this attribute untouched", never "clear it".
///
/// # Examples
///
/// ```
/// use update_expression::{UpdateExpressionBuilder, UpdateExpressionError};
///
/// let empty = UpdateExpressionBuilder::<String>::new()
///     .set_if_present("email", None)?
///     .build();
/// assert_eq!(empty, Err(UpdateExpressionError::Empty));
/// # Ok::<(), UpdateExpressionError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateExpressionBuilder<V> {
    assignments: Vec<Assignment<V>>,
}

impl<V> Default for UpdateExpressionBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> UpdateExpressionBuilder<V> {
    /// Start an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            assignments: Vec::new(),
        }
    }

    /// Assign `value` to `attribute`.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateExpressionError::InvalidAttributeName`] when the name
    /// cannot be used as a placeholder suffix, and
    /// [`UpdateExpressionError::DuplicateAttribute`] when the attribute was
    /// already assigned.
    pub fn set(
        mut self,
        attribute: impl Into<String>,
        value: V,
    ) -> Result<Self, UpdateExpressionError> {
        let name = attribute.into();
        if !is_valid_attribute_name(&name) {
            return Err(UpdateExpressionError::InvalidAttributeName { attribute: name });
        }
        if self
            .assignments
            .iter()
            .any(|existing| existing.attribute() == name)
        {
            return Err(UpdateExpressionError::DuplicateAttribute { attribute: name });
        }
        self.assignments.push(Assignment::new(name, value));
        Ok(self)
    }

    /// Assign `value` to `attribute` only when a value is present.
    ///
    /// # Errors
    ///
    /// Same as [`UpdateExpressionBuilder::set`] when `value` is `Some`.
    pub fn set_if_present(
        self,
        attribute: impl Into<String>,
        value: Option<V>,
    ) -> Result<Self, UpdateExpressionError> {
        match value {
            Some(present) => self.set(attribute, present),
            None => Ok(self),
        }
    }

    /// Number of assignments collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether no assignment has been collected yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Finish the expression.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateExpressionError::Empty`] when no attribute carried a
    /// value; callers must treat this as "do not write".
    pub fn build(self) -> Result<UpdateExpression<V>, UpdateExpressionError> {
        if self.assignments.is_empty() {
            return Err(UpdateExpressionError::Empty);
        }
        Ok(UpdateExpression::from_assignments(self.assignments))
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for the builder rules.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn skips_absent_values_and_keeps_insertion_order() -> Result<(), UpdateExpressionError> {
        let update = UpdateExpressionBuilder::new()
            .set_if_present("lName", Some("Smith"))?
            .set_if_present("email", None)?
            .set_if_present("fName", Some("Alice"))?
            .build()?;

        assert_eq!(update.len(), 2);
        assert_eq!(update.expression(), "SET #lName = :lName, #fName = :fName");
        Ok(())
    }

    #[rstest]
    fn aliases_every_attribute_including_reserved_words() -> Result<(), UpdateExpressionError> {
        let update = UpdateExpressionBuilder::new()
            .set("name", "Ada")?
            .set("password", "secret")?
            .build()?;

        let names = update.attribute_names();
        assert_eq!(names.get("#name").map(String::as_str), Some("name"));
        assert_eq!(names.get("#password").map(String::as_str), Some("password"));

        let values = update.attribute_values();
        assert_eq!(values.get(":name"), Some(&"Ada"));
        assert_eq!(values.get(":password"), Some(&"secret"));
        assert!(!update.expression().contains("Ada"), "values never inlined");
        Ok(())
    }

    #[rstest]
    fn refuses_to_build_without_assignments() {
        let result = UpdateExpressionBuilder::<String>::new()
            .set_if_present("fName", None)
            .and_then(|builder| builder.set_if_present("lName", None))
            .and_then(UpdateExpressionBuilder::build);

        assert_eq!(result, Err(UpdateExpressionError::Empty));
    }

    #[rstest]
    #[case::blank("")]
    #[case::space("first name")]
    #[case::leading_digit("1st")]
    #[case::injection("a = :b, #c")]
    fn rejects_attribute_names_that_cannot_be_aliased(#[case] attribute: &str) {
        let result = UpdateExpressionBuilder::new().set(attribute, 1_u8);

        assert_eq!(
            result.err(),
            Some(UpdateExpressionError::InvalidAttributeName {
                attribute: attribute.to_owned(),
            })
        );
    }

    #[rstest]
    fn rejects_duplicate_assignments() -> Result<(), UpdateExpressionError> {
        let builder = UpdateExpressionBuilder::new().set("email", "a@x.com")?;
        let result = builder.set("email", "b@x.com");

        assert_eq!(
            result.err(),
            Some(UpdateExpressionError::DuplicateAttribute {
                attribute: "email".to_owned(),
            })
        );
        Ok(())
    }
}
