//! Execution Bridge: run a document and normalise the outcome.
//!
//! Any reported error turns the outcome into an [`ExecutionError`] that still
//! carries the partial data. Nothing is retried here.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use super::query::QueryDocument;
use super::schema::{QueryError, Schema};

/// The executor reported at least one error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("query execution reported {} error(s)", errors.len())]
pub struct ExecutionError {
    /// Errors in executor order.
    pub errors: Vec<QueryError>,
    /// Whatever data the executor produced, unchanged.
    pub data: Option<Map<String, Value>>,
}

/// Feeds documents into a [`Schema`].
#[derive(Clone)]
pub struct ExecutionBridge {
    schema: Schema,
}

impl ExecutionBridge {
    /// Bridge onto `schema`.
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    /// Execute `document` once.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError`] when the executor reports any error.
    pub async fn execute(&self, document: &QueryDocument) -> Result<Value, ExecutionError> {
        let result = self.schema.execute(document).await;
        if !result.errors.is_empty() {
            debug!(errors = result.errors.len(), "execution reported errors");
            return Err(ExecutionError {
                errors: result.errors,
                data: result.data,
            });
        }
        Ok(result.data.map_or(Value::Null, Value::Object))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::domain::ports::FixtureUserRepository;
    use crate::domain::query::{FieldSelection, OperationType};
    use crate::domain::schema::UserResolvers;

    fn bridge() -> ExecutionBridge {
        ExecutionBridge::new(Schema::new(UserResolvers::new(Arc::new(
            FixtureUserRepository::default(),
        ))))
    }

    #[tokio::test]
    async fn returns_data_when_clean() {
        let data = bridge()
            .execute(&QueryDocument::query(FieldSelection::new("hello")))
            .await
            .expect("execute");

        assert_eq!(data, json!({"hello": "Hello World!"}));
    }

    #[tokio::test]
    async fn preserves_partial_data_alongside_errors() {
        let document = QueryDocument {
            operation: OperationType::Mutation,
            fields: vec![
                FieldSelection::new("echo").with_argument("mssg", "hi"),
                FieldSelection::new("deleteUser"),
            ],
        };

        let err = bridge().execute(&document).await.expect_err("field error");

        assert_eq!(err.errors.len(), 1);
        assert_eq!(
            err.data.map(Value::Object),
            Some(json!({"echo": "You said: hi", "deleteUser": null}))
        );
    }
}
