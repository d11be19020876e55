//! Aliased `SET` update expressions for key-value stores.
//!
//! Key-value stores in the `DynamoDB` family apply partial updates through a
//! textual instruction (`SET #a = :a, #b = :b`) plus two alias tables: one
//! mapping name placeholders to attribute names, one mapping value
//! placeholders to values. Aliasing every attribute keeps the instruction
//! valid even when an attribute name collides with a reserved word.
//!
//! This crate provides both halves of that contract:
//!
//! - [`UpdateExpressionBuilder`] assembles an [`UpdateExpression`] from the
//!   attributes a caller explicitly wants to overwrite. Absent values are
//!   skipped, and building with no assignments fails with
//!   [`UpdateExpressionError::Empty`] so no vacuous write is ever issued.
//! - [`resolve_assignments`] is the store-side evaluator: it parses a rendered
//!   instruction, resolves every placeholder through the alias tables, and
//!   returns the concrete attribute assignments to apply.
//!
//! # Example
//!
//! ```
//! use update_expression::{UpdateExpressionBuilder, resolve_assignments};
//!
//! let update = UpdateExpressionBuilder::new()
//!     .set_if_present("fName", Some("Ada".to_owned()))?
//!     .set_if_present("email", None)?
//!     .build()?;
//!
//! assert_eq!(update.expression(), "SET #fName = :fName");
//!
//! let names = update.attribute_names();
//! let values = update.attribute_values();
//! let resolved = resolve_assignments(&update.expression(), &names, &values)?;
//! assert_eq!(resolved, vec![("fName", &"Ada".to_owned())]);
//! # Ok::<(), update_expression::UpdateExpressionError>(())
//! ```

mod builder;
mod error;
mod evaluate;
mod expression;

pub use builder::UpdateExpressionBuilder;
pub use error::UpdateExpressionError;
pub use evaluate::resolve_assignments;
pub use expression::{Assignment, UpdateExpression};

/// Leading character of attribute-name placeholders (`#fName`).
pub const NAME_PLACEHOLDER_PREFIX: char = '#';

/// Leading character of attribute-value placeholders (`:fName`).
pub const VALUE_PLACEHOLDER_PREFIX: char = ':';

/// Keyword that opens every expression produced by this crate.
pub const SET_KEYWORD: &str = "SET";

/// Return whether `attribute` can be embedded in a placeholder verbatim.
///
/// Attribute names must start with an ASCII letter or underscore and contain
/// only ASCII alphanumerics and underscores.
///
/// # Examples
///
/// ```
/// use update_expression::is_valid_attribute_name;
///
/// assert!(is_valid_attribute_name("fName"));
/// assert!(!is_valid_attribute_name("first name"));
/// assert!(!is_valid_attribute_name(""));
/// ```
#[must_use]
pub fn is_valid_attribute_name(attribute: &str) -> bool {
    let mut chars = attribute.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
