//! Schema executor for structured query documents.
//!
//! Document-level problems (unknown root fields, a field under the wrong
//! operation type) fail the whole document with `data = null`. Field-level
//! problems put `null` under the field, record an error with its path, and
//! let the remaining fields run.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::arguments;
use super::resolvers::{ResolverFailure, UserResolvers};
use crate::domain::PublicUser;
use crate::domain::query::{FieldSelection, OperationType, QueryDocument};
use crate::domain::user::PUBLIC_ATTRIBUTES;

const ID_ARGUMENT: &str = "id";
const LIMIT_ARGUMENT: &str = "n";
const USER_INFO_ARGUMENT: &str = "usrInfo";
const ECHO_ARGUMENT: &str = "mssg";
const PUBLIC_USER_TYPE: &str = "PublicUser";

/// One entry of the `errors` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryError {
    /// Human-readable description.
    pub message: String,
    /// Root field the error belongs to; empty for document-level errors.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
}

impl QueryError {
    fn document(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
        }
    }

    fn at(field: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: vec![field.to_owned()],
        }
    }
}

/// Raw executor output: `{ data, errors }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    /// Results keyed by root field; `None` when the document was rejected.
    pub data: Option<Map<String, Value>>,
    /// Errors collected during validation and execution.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<QueryError>,
}

impl ExecutionResult {
    fn rejected(errors: Vec<QueryError>) -> Self {
        Self { data: None, errors }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootField {
    Hello,
    GetUser,
    ListNUsers,
    Echo,
    CreateUser,
    UpdateUser,
    DeleteUser,
}

impl RootField {
    fn lookup(name: &str) -> Option<Self> {
        let field = match name {
            "hello" => Self::Hello,
            "getUser" => Self::GetUser,
            "listNUsers" => Self::ListNUsers,
            "echo" => Self::Echo,
            "createUser" => Self::CreateUser,
            "updateUser" => Self::UpdateUser,
            "deleteUser" => Self::DeleteUser,
            _ => return None,
        };
        Some(field)
    }

    fn operation(self) -> OperationType {
        match self {
            Self::Hello | Self::GetUser | Self::ListNUsers => OperationType::Query,
            Self::Echo | Self::CreateUser | Self::UpdateUser | Self::DeleteUser => {
                OperationType::Mutation
            }
        }
    }

    fn arguments(self) -> &'static [&'static str] {
        match self {
            Self::Hello => &[],
            Self::GetUser | Self::DeleteUser => &[ID_ARGUMENT],
            Self::ListNUsers => &[LIMIT_ARGUMENT],
            Self::Echo => &[ECHO_ARGUMENT],
            Self::CreateUser => &[USER_INFO_ARGUMENT],
            Self::UpdateUser => &[ID_ARGUMENT, USER_INFO_ARGUMENT],
        }
    }

    fn return_type(self) -> &'static str {
        match self {
            Self::Hello | Self::Echo => "String",
            Self::GetUser | Self::ListNUsers => PUBLIC_USER_TYPE,
            Self::CreateUser | Self::UpdateUser | Self::DeleteUser => "Boolean",
        }
    }
}

fn root_type_name(operation: OperationType) -> &'static str {
    match operation {
        OperationType::Query => "Query",
        OperationType::Mutation => "Mutation",
    }
}

/// Executable user schema.
#[derive(Clone)]
pub struct Schema {
    resolvers: UserResolvers,
}

impl Schema {
    /// Bind the schema to its resolvers.
    pub fn new(resolvers: UserResolvers) -> Self {
        Self { resolvers }
    }

    /// Validate and run `document`, fields in order.
    pub async fn execute(&self, document: &QueryDocument) -> ExecutionResult {
        let roots = match validate(document) {
            Ok(roots) => roots,
            Err(errors) => return ExecutionResult::rejected(errors),
        };

        let mut data = Map::new();
        let mut errors = Vec::new();
        for (root, field) in roots {
            let value = match self.resolve(root, field, document.operation).await {
                Ok(value) => value,
                Err(message) => {
                    errors.push(QueryError::at(&field.name, message));
                    Value::Null
                }
            };
            data.insert(field.name.clone(), value);
        }
        ExecutionResult {
            data: Some(data),
            errors,
        }
    }

    async fn resolve(
        &self,
        root: RootField,
        field: &FieldSelection,
        operation: OperationType,
    ) -> Result<Value, String> {
        let qualified = format!("{}.{}", root_type_name(operation), field.name);
        arguments::reject_unknown(&field.arguments, root.arguments(), &qualified)?;
        check_selection(root, field)?;
        let args = &field.arguments;

        match root {
            RootField::Hello => Ok(Value::from("Hello World!")),
            RootField::Echo => {
                let message = arguments::required_string(args, ECHO_ARGUMENT)?;
                Ok(Value::from(format!("You said: {message}")))
            }
            RootField::GetUser => {
                let id = arguments::required_id(args, ID_ARGUMENT)?;
                match self.resolvers.get_user(&id).await {
                    Ok(Some(user)) => project(&user, &field.selection),
                    Ok(None) => Ok(Value::Null),
                    Err(failure) => Ok(sentinel(&field.name, &failure, Value::Null)),
                }
            }
            RootField::ListNUsers => {
                let n = arguments::optional_int(args, LIMIT_ARGUMENT)?;
                match self.resolvers.list_n_users(n).await {
                    Ok(users) => users
                        .iter()
                        .map(|user| project(user, &field.selection))
                        .collect::<Result<Vec<_>, _>>()
                        .map(Value::Array),
                    Err(failure) => Ok(sentinel(&field.name, &failure, Value::Null)),
                }
            }
            RootField::CreateUser => {
                let fields = arguments::user_input(args, USER_INFO_ARGUMENT)?;
                Ok(match self.resolvers.create_user(fields).await {
                    Ok(_) => Value::Bool(true),
                    Err(failure) => sentinel(&field.name, &failure, Value::Bool(false)),
                })
            }
            RootField::UpdateUser => {
                let id = arguments::required_id(args, ID_ARGUMENT)?;
                let mask = arguments::user_update_input(args, USER_INFO_ARGUMENT)?;
                Ok(match self.resolvers.update_user(&id, &mask).await {
                    Ok(()) => Value::Bool(true),
                    Err(failure) => sentinel(&field.name, &failure, Value::Bool(false)),
                })
            }
            RootField::DeleteUser => {
                let id = arguments::required_id(args, ID_ARGUMENT)?;
                Ok(match self.resolvers.delete_user(&id).await {
                    Ok(()) => Value::Bool(true),
                    Err(failure) => sentinel(&field.name, &failure, Value::Bool(false)),
                })
            }
        }
    }
}

fn validate(document: &QueryDocument) -> Result<Vec<(RootField, &FieldSelection)>, Vec<QueryError>> {
    if document.fields.is_empty() {
        return Err(vec![QueryError::document("Document selects no fields")]);
    }

    let root_type = root_type_name(document.operation);
    let mut seen = BTreeSet::new();
    let mut roots = Vec::with_capacity(document.fields.len());
    let mut errors = Vec::new();
    for field in &document.fields {
        match RootField::lookup(&field.name).filter(|root| root.operation() == document.operation) {
            Some(root) => roots.push((root, field)),
            None => errors.push(QueryError::document(format!(
                "Cannot query field \"{}\" on type \"{root_type}\"",
                field.name
            ))),
        }
        if !seen.insert(field.name.as_str()) {
            errors.push(QueryError::document(format!(
                "Field \"{}\" is selected more than once",
                field.name
            )));
        }
    }

    if errors.is_empty() {
        Ok(roots)
    } else {
        Err(errors)
    }
}

fn check_selection(root: RootField, field: &FieldSelection) -> Result<(), String> {
    let return_type = root.return_type();
    if return_type != PUBLIC_USER_TYPE {
        if field.selection.is_empty() {
            return Ok(());
        }
        return Err(format!(
            "Field \"{}\" must not have a selection since type \"{return_type}\" has no subfields",
            field.name
        ));
    }
    match field
        .selection
        .iter()
        .find(|name| !PUBLIC_ATTRIBUTES.contains(&name.as_str()))
    {
        Some(name) => Err(format!(
            "Cannot query field \"{name}\" on type \"{PUBLIC_USER_TYPE}\""
        )),
        None => Ok(()),
    }
}

/// Restrict a public user to `selection`; an empty selection keeps every field.
fn project(user: &PublicUser, selection: &[String]) -> Result<Value, String> {
    let Value::Object(mut all) = serde_json::to_value(user).map_err(|err| err.to_string())? else {
        return Err(format!("{PUBLIC_USER_TYPE} did not serialise to an object"));
    };
    if selection.is_empty() {
        return Ok(Value::Object(all));
    }
    let projected = selection
        .iter()
        .filter_map(|name| all.remove(name).map(|value| (name.clone(), value)))
        .collect();
    Ok(Value::Object(projected))
}

fn sentinel(field: &str, failure: &ResolverFailure, value: Value) -> Value {
    match failure {
        ResolverFailure::Store(err) => {
            warn!(field, code = err.code(), error = %err, "store failure mapped to sentinel");
        }
        other => debug!(field, reason = %other, "resolver reported failure"),
    }
    value
}
