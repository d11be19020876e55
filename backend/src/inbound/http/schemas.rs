//! OpenAPI schema definitions for domain and pipeline types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror their wire shapes for documentation only.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::PublicUser`].
#[derive(ToSchema)]
#[schema(as = crate::domain::PublicUser)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PublicUserSchema {
    /// Stable user identifier.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    /// First name.
    #[schema(rename = "fName", example = "Alice")]
    first_name: String,
    /// Last name.
    #[schema(rename = "lName", example = "Smith")]
    last_name: String,
}

/// OpenAPI schema for [`crate::domain::Intent`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Intent)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct IntentSchema {
    /// One of `GetOne`, `ListN`, `Create`, `Update`, `Delete`, `Unknown`.
    #[schema(example = "Create")]
    operation: String,
    /// Always `user`.
    #[schema(example = "user")]
    entity: String,
    /// Operation parameters keyed by field name.
    #[schema(value_type = Object)]
    parameters: serde_json::Value,
}

/// OpenAPI schema for one root field of [`crate::domain::query::QueryDocument`].
#[derive(ToSchema)]
#[schema(as = crate::domain::query::FieldSelection)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FieldSelectionSchema {
    /// Root field name, e.g. `getUser`.
    #[schema(example = "getUser")]
    name: String,
    /// Argument values keyed by argument name.
    #[schema(value_type = Object)]
    arguments: Option<serde_json::Value>,
    /// Selected `PublicUser` fields.
    selection: Option<Vec<String>>,
}

/// OpenAPI schema for [`crate::domain::query::QueryDocument`].
#[derive(ToSchema)]
#[schema(as = crate::domain::query::QueryDocument)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct QueryDocumentSchema {
    /// `query` or `mutation`.
    #[schema(example = "query")]
    operation: String,
    /// Root fields in execution order.
    fields: Vec<FieldSelectionSchema>,
}

/// OpenAPI schema for [`crate::domain::schema::QueryError`].
#[derive(ToSchema)]
#[schema(as = crate::domain::schema::QueryError)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct QueryErrorSchema {
    /// Human-readable description.
    message: String,
    /// Root field the error belongs to.
    path: Option<Vec<String>>,
}

/// OpenAPI schema for [`crate::domain::schema::ExecutionResult`].
#[derive(ToSchema)]
#[schema(as = crate::domain::schema::ExecutionResult)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ExecutionResultSchema {
    /// Results keyed by root field; null when the document was rejected.
    #[schema(value_type = Object)]
    data: Option<serde_json::Value>,
    /// Validation and execution errors.
    errors: Option<Vec<QueryErrorSchema>>,
}

/// OpenAPI schema for `{ "error": ... }` bodies.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorBodySchema {
    /// Failure description.
    #[schema(example = "Missing Message Field In Request Body")]
    error: String,
}
