//! Query Builder: deterministic rendering of an [`Intent`] into a document.
//!
//! Each operation maps to exactly one root field. Parameters become typed
//! argument values; nothing from the intent is spliced into text.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use super::document::{FieldSelection, InputValue, QueryDocument};
use crate::domain::intent::{Intent, OperationKind};
use crate::domain::user::{
    EMAIL_ATTRIBUTE, FIRST_NAME_ATTRIBUTE, ID_ATTRIBUTE, LAST_NAME_ATTRIBUTE, PASSWORD_ATTRIBUTE,
    PUBLIC_ATTRIBUTES,
};

/// Name of the list-size parameter and argument.
const LIMIT_PARAMETER: &str = "n";
/// Name of the input-object argument on user mutations.
const USER_INFO_ARGUMENT: &str = "usrInfo";

const USER_INPUT_FIELDS: [&str; 4] = [
    FIRST_NAME_ATTRIBUTE,
    LAST_NAME_ATTRIBUTE,
    EMAIL_ATTRIBUTE,
    PASSWORD_ATTRIBUTE,
];

/// Failure to render an intent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryBuildError {
    /// The operation has no query shape; never guessed.
    #[error("unsupported intent: {operation}")]
    UnsupportedIntent {
        /// Operation that was asked for.
        operation: OperationKind,
    },
    /// A parameter required by the shape is absent.
    #[error("missing required parameter '{field}'")]
    MissingParameter {
        /// Parameter name.
        field: String,
    },
    /// A parameter is present but has the wrong type.
    #[error("parameter '{field}' {reason}")]
    InvalidParameter {
        /// Parameter name.
        field: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl QueryBuildError {
    fn missing(field: &str) -> Self {
        Self::MissingParameter {
            field: field.to_owned(),
        }
    }

    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field: field.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Render `intent` into the document for its operation.
///
/// # Errors
///
/// - [`QueryBuildError::UnsupportedIntent`] for [`OperationKind::Unknown`].
/// - [`QueryBuildError::MissingParameter`] naming the first absent required
///   parameter.
/// - [`QueryBuildError::InvalidParameter`] when a parameter cannot be typed.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
///
/// use serde_json::json;
/// use user_intents::domain::query::build_query;
/// use user_intents::domain::{Intent, OperationKind};
///
/// let intent = Intent::new(
///     OperationKind::Delete,
///     BTreeMap::from([("id".to_owned(), json!("u-1"))]),
/// );
/// let document = build_query(&intent)?;
/// assert_eq!(document.to_string(), r#"mutation { deleteUser(id: "u-1") }"#);
/// # Ok::<(), user_intents::domain::query::QueryBuildError>(())
/// ```
pub fn build_query(intent: &Intent) -> Result<QueryDocument, QueryBuildError> {
    match intent.operation() {
        OperationKind::GetOne => Ok(QueryDocument::query(
            FieldSelection::new("getUser")
                .with_argument(ID_ATTRIBUTE, required_string(intent, ID_ATTRIBUTE)?)
                .with_selection(PUBLIC_ATTRIBUTES),
        )),
        OperationKind::ListN => {
            let mut field = FieldSelection::new("listNUsers").with_selection(PUBLIC_ATTRIBUTES);
            if let Some(limit) = optional_int(intent, LIMIT_PARAMETER)? {
                field = field.with_argument(LIMIT_PARAMETER, limit);
            }
            Ok(QueryDocument::query(field))
        }
        OperationKind::Create => {
            let mut info = BTreeMap::new();
            for name in USER_INPUT_FIELDS {
                info.insert(name.to_owned(), InputValue::String(required_string(intent, name)?));
            }
            Ok(QueryDocument::mutation(
                FieldSelection::new("createUser")
                    .with_argument(USER_INFO_ARGUMENT, InputValue::Object(info)),
            ))
        }
        OperationKind::Update => {
            let id = required_string(intent, ID_ATTRIBUTE)?;
            let mut info = BTreeMap::new();
            for name in USER_INPUT_FIELDS {
                if let Some(value) = optional_string(intent, name)? {
                    info.insert(name.to_owned(), InputValue::String(value));
                }
            }
            Ok(QueryDocument::mutation(
                FieldSelection::new("updateUser")
                    .with_argument(ID_ATTRIBUTE, id)
                    .with_argument(USER_INFO_ARGUMENT, InputValue::Object(info)),
            ))
        }
        OperationKind::Delete => Ok(QueryDocument::mutation(
            FieldSelection::new("deleteUser")
                .with_argument(ID_ATTRIBUTE, required_string(intent, ID_ATTRIBUTE)?),
        )),
        OperationKind::Unknown => Err(QueryBuildError::UnsupportedIntent {
            operation: OperationKind::Unknown,
        }),
    }
}

fn required_string(intent: &Intent, name: &str) -> Result<String, QueryBuildError> {
    optional_string(intent, name)?
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| QueryBuildError::missing(name))
}

fn optional_string(intent: &Intent, name: &str) -> Result<Option<String>, QueryBuildError> {
    match intent.parameter(name) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(_) => Err(QueryBuildError::invalid(name, "must be a string")),
    }
}

fn optional_int(intent: &Intent, name: &str) -> Result<Option<i64>, QueryBuildError> {
    match intent.parameter(name) {
        None => Ok(None),
        Some(Value::Number(number)) => number
            .as_i64()
            .map(Some)
            .ok_or_else(|| QueryBuildError::invalid(name, "must be a whole number")),
        Some(Value::String(text)) => text
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| QueryBuildError::invalid(name, "must be a whole number")),
        Some(_) => Err(QueryBuildError::invalid(name, "must be a whole number")),
    }
}
