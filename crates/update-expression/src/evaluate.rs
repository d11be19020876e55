//! Store-side evaluation of rendered `SET` instructions.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::UpdateExpressionError;
use crate::{NAME_PLACEHOLDER_PREFIX, SET_KEYWORD, VALUE_PLACEHOLDER_PREFIX};

/// Parse `expression` and resolve its placeholders through the alias tables.
///
/// Returns `(attribute, value)` pairs in clause order. Stores apply the whole
/// list or nothing; this function performs no mutation itself.
///
/// # Errors
///
/// - [`UpdateExpressionError::Malformed`] when the text is not a `SET` list of
///   `#name = :value` clauses.
/// - [`UpdateExpressionError::Empty`] when the clause list is empty.
/// - [`UpdateExpressionError::UnresolvedPlaceholder`] when a placeholder has
///   no alias entry.
/// - [`UpdateExpressionError::UnusedPlaceholder`] when an alias entry is never
///   referenced.
/// - [`UpdateExpressionError::DuplicateAttribute`] when two clauses target the
///   same attribute.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
///
/// use update_expression::resolve_assignments;
///
/// let names = BTreeMap::from([("#n".to_owned(), "name".to_owned())]);
/// let values = BTreeMap::from([(":n".to_owned(), 7)]);
///
/// let resolved = resolve_assignments("SET #n = :n", &names, &values)?;
/// assert_eq!(resolved, vec![("name", &7)]);
/// # Ok::<(), update_expression::UpdateExpressionError>(())
/// ```
pub fn resolve_assignments<'a, V>(
    expression: &str,
    attribute_names: &'a BTreeMap<String, String>,
    attribute_values: &'a BTreeMap<String, V>,
) -> Result<Vec<(&'a str, &'a V)>, UpdateExpressionError> {
    let clause_list = strip_set_keyword(expression)?;
    if clause_list.trim().is_empty() {
        return Err(UpdateExpressionError::Empty);
    }

    let mut used_names = BTreeSet::new();
    let mut used_values = BTreeSet::new();
    let mut seen_attributes = BTreeSet::new();
    let mut resolved = Vec::new();

    for clause in clause_list.split(',') {
        let (name_placeholder, value_placeholder) = split_clause(clause)?;

        let (name_key, attribute) = attribute_names
            .get_key_value(name_placeholder)
            .ok_or_else(|| UpdateExpressionError::unresolved(name_placeholder))?;
        let (value_key, value) = attribute_values
            .get_key_value(value_placeholder)
            .ok_or_else(|| UpdateExpressionError::unresolved(value_placeholder))?;

        if !seen_attributes.insert(attribute.as_str()) {
            return Err(UpdateExpressionError::DuplicateAttribute {
                attribute: attribute.clone(),
            });
        }
        used_names.insert(name_key.as_str());
        used_values.insert(value_key.as_str());
        resolved.push((attribute.as_str(), value));
    }

    if let Some(unused) = first_unused(attribute_names.keys(), &used_names)
        .or_else(|| first_unused(attribute_values.keys(), &used_values))
    {
        return Err(UpdateExpressionError::UnusedPlaceholder {
            placeholder: unused.to_owned(),
        });
    }

    Ok(resolved)
}

fn strip_set_keyword(expression: &str) -> Result<&str, UpdateExpressionError> {
    let trimmed = expression.trim();
    let (keyword, rest) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));
    if keyword.eq_ignore_ascii_case(SET_KEYWORD) {
        Ok(rest)
    } else {
        Err(UpdateExpressionError::malformed(format!(
            "expected '{SET_KEYWORD}' action, found '{keyword}'"
        )))
    }
}

fn split_clause(clause: &str) -> Result<(&str, &str), UpdateExpressionError> {
    let (lhs, rhs) = clause
        .split_once('=')
        .ok_or_else(|| UpdateExpressionError::malformed(format!("clause '{}' lacks '='", clause.trim())))?;
    let name_placeholder = lhs.trim();
    let value_placeholder = rhs.trim();

    if !name_placeholder.starts_with(NAME_PLACEHOLDER_PREFIX) {
        return Err(UpdateExpressionError::malformed(format!(
            "'{name_placeholder}' is not a name placeholder"
        )));
    }
    if !value_placeholder.starts_with(VALUE_PLACEHOLDER_PREFIX) {
        return Err(UpdateExpressionError::malformed(format!(
            "'{value_placeholder}' is not a value placeholder"
        )));
    }
    if value_placeholder.contains(char::is_whitespace) || value_placeholder.contains('=') {
        return Err(UpdateExpressionError::malformed(format!(
            "clause '{}' has trailing tokens",
            clause.trim()
        )));
    }
    Ok((name_placeholder, value_placeholder))
}

fn first_unused<'k>(
    mut keys: impl Iterator<Item = &'k String>,
    used: &BTreeSet<&str>,
) -> Option<&'k str> {
    keys.find(|key| !used.contains(key.as_str()))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    //! Unit coverage for the evaluator, including builder round trips.

    use rstest::rstest;

    use super::*;
    use crate::UpdateExpressionBuilder;

    fn names(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        names(pairs)
    }

    #[rstest]
    fn resolves_builder_output() -> Result<(), UpdateExpressionError> {
        let update = UpdateExpressionBuilder::new()
            .set("fName", "Grace".to_owned())?
            .set("email", "grace@navy.mil".to_owned())?
            .build()?;
        let alias_names = update.attribute_names();
        let alias_values = update.attribute_values();

        let resolved = resolve_assignments(&update.expression(), &alias_names, &alias_values)?;

        assert_eq!(
            resolved,
            vec![
                ("fName", &"Grace".to_owned()),
                ("email", &"grace@navy.mil".to_owned()),
            ]
        );
        Ok(())
    }

    #[rstest]
    fn accepts_lowercase_keyword_and_loose_spacing() -> Result<(), UpdateExpressionError> {
        let alias_names = names(&[("#a", "lName")]);
        let alias_values = values(&[(":a", "Hopper")]);

        let resolved = resolve_assignments("  set   #a=:a ", &alias_names, &alias_values)?;

        assert_eq!(resolved, vec![("lName", &"Hopper".to_owned())]);
        Ok(())
    }

    #[rstest]
    #[case::remove_action("REMOVE #a", "expected 'SET' action, found 'REMOVE'")]
    #[case::missing_equals("SET #a :a", "clause '#a :a' lacks '='")]
    #[case::bare_name("SET a = :a", "'a' is not a name placeholder")]
    #[case::inline_value("SET #a = Hopper", "'Hopper' is not a value placeholder")]
    #[case::trailing_tokens("SET #a = :a REMOVE #b", "clause '#a = :a REMOVE #b' has trailing tokens")]
    fn rejects_malformed_text(#[case] expression: &str, #[case] message: &str) {
        let alias_names = names(&[("#a", "lName")]);
        let alias_values = values(&[(":a", "Hopper")]);

        let result = resolve_assignments(expression, &alias_names, &alias_values);

        assert_eq!(
            result,
            Err(UpdateExpressionError::Malformed {
                message: message.to_owned(),
            })
        );
    }

    #[rstest]
    fn rejects_empty_clause_list() {
        let alias_names = names(&[]);
        let alias_values = values(&[]);
        let result = resolve_assignments("SET  ", &alias_names, &alias_values);
        assert_eq!(result, Err(UpdateExpressionError::Empty));
    }

    #[rstest]
    fn rejects_unresolved_and_unused_placeholders() {
        let alias_names = names(&[("#a", "lName"), ("#b", "email")]);
        let alias_values = values(&[(":a", "Hopper")]);

        let unresolved = resolve_assignments("SET #a = :a, #b = :b", &alias_names, &alias_values);
        assert_eq!(
            unresolved,
            Err(UpdateExpressionError::UnresolvedPlaceholder {
                placeholder: ":b".to_owned(),
            })
        );

        let unused = resolve_assignments("SET #a = :a", &alias_names, &alias_values);
        assert_eq!(
            unused,
            Err(UpdateExpressionError::UnusedPlaceholder {
                placeholder: "#b".to_owned(),
            })
        );
    }

    #[rstest]
    fn rejects_two_clauses_targeting_one_attribute() {
        let alias_names = names(&[("#a", "email"), ("#b", "email")]);
        let alias_values = values(&[(":a", "one"), (":b", "two")]);

        let result = resolve_assignments("SET #a = :a, #b = :b", &alias_names, &alias_values);

        assert_eq!(
            result,
            Err(UpdateExpressionError::DuplicateAttribute {
                attribute: "email".to_owned(),
            })
        );
    }
}
