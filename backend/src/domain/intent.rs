//! Structured intents extracted from free-text messages.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Only entity the intent surface knows about.
pub const USER_ENTITY: &str = "user";

/// Operation requested by a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OperationKind {
    /// Fetch one user by id.
    GetOne,
    /// List up to `n` users.
    ListN,
    /// Create a user.
    Create,
    /// Partially update a user.
    Update,
    /// Delete a user.
    Delete,
    /// Nothing recognisable was asked for.
    Unknown,
}

impl OperationKind {
    /// Resolve an operation label emitted by a classifier.
    ///
    /// Matching ignores case, `_`, `-` and spaces, and accepts the schema
    /// field names (`getUser`, `listNUsers`, ...) as aliases.
    ///
    /// # Examples
    /// ```
    /// use user_intents::domain::OperationKind;
    ///
    /// assert_eq!(OperationKind::from_label("list_n"), Some(OperationKind::ListN));
    /// assert_eq!(OperationKind::from_label("createUser"), Some(OperationKind::Create));
    /// assert_eq!(OperationKind::from_label("frobnicate"), None);
    /// ```
    pub fn from_label(label: &str) -> Option<Self> {
        let normalised: String = label
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        let kind = match normalised.as_str() {
            "getone" | "get" | "getuser" | "read" | "fetch" => Self::GetOne,
            "listn" | "list" | "listnusers" | "listusers" => Self::ListN,
            "create" | "createuser" | "add" | "adduser" => Self::Create,
            "update" | "updateuser" | "modify" => Self::Update,
            "delete" | "deleteuser" | "remove" => Self::Delete,
            "unknown" => Self::Unknown,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::GetOne => "GetOne",
            Self::ListN => "ListN",
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Operation plus extracted parameters for the user entity.
///
/// ## Invariants
/// - `entity` is always [`USER_ENTITY`].
/// - An [`OperationKind::Unknown`] intent carries no parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Intent {
    operation: OperationKind,
    entity: &'static str,
    parameters: BTreeMap<String, Value>,
}

impl Intent {
    /// Build an intent, dropping parameters when `operation` is unknown.
    pub fn new(operation: OperationKind, parameters: BTreeMap<String, Value>) -> Self {
        let parameters = if operation == OperationKind::Unknown {
            BTreeMap::new()
        } else {
            parameters
        };
        Self {
            operation,
            entity: USER_ENTITY,
            parameters,
        }
    }

    /// The intent every unrecognised message resolves to.
    pub fn unknown() -> Self {
        Self::new(OperationKind::Unknown, BTreeMap::new())
    }

    /// Requested operation.
    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    /// Target entity.
    pub fn entity(&self) -> &str {
        self.entity
    }

    /// Extracted parameters.
    pub fn parameters(&self) -> &BTreeMap<String, Value> {
        &self.parameters
    }

    /// One parameter, treating JSON `null` as absent.
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name).filter(|value| !value.is_null())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case("GetOne", OperationKind::GetOne)]
    #[case("get_user", OperationKind::GetOne)]
    #[case("LIST-N", OperationKind::ListN)]
    #[case("listNUsers", OperationKind::ListN)]
    #[case("create_user", OperationKind::Create)]
    #[case("Update", OperationKind::Update)]
    #[case("remove", OperationKind::Delete)]
    #[case("unknown", OperationKind::Unknown)]
    fn resolves_labels(#[case] label: &str, #[case] expected: OperationKind) {
        assert_eq!(OperationKind::from_label(label), Some(expected));
    }

    #[rstest]
    fn unknown_intents_never_carry_parameters() {
        let parameters = BTreeMap::from([("id".to_owned(), json!("x"))]);
        let intent = Intent::new(OperationKind::Unknown, parameters);
        assert!(intent.parameters().is_empty());
    }

    #[rstest]
    fn serialises_with_entity_and_pascal_case_operation() {
        let parameters = BTreeMap::from([("n".to_owned(), json!(2))]);
        let intent = Intent::new(OperationKind::ListN, parameters);

        let value = serde_json::to_value(&intent).expect("serialise intent");

        assert_eq!(
            value,
            json!({"operation": "ListN", "entity": "user", "parameters": {"n": 2}})
        );
    }

    #[rstest]
    fn null_parameters_read_as_absent() {
        let parameters = BTreeMap::from([("n".to_owned(), Value::Null)]);
        let intent = Intent::new(OperationKind::ListN, parameters);
        assert!(intent.parameter("n").is_none());
    }
}
