//! Structured document endpoint.
//!
//! ```text
//! POST /graphql {"operation":"query","fields":[{"name":"listNUsers","arguments":{"n":2}}]}
//! ```

use actix_web::{HttpResponse, post, web};
use tracing::debug;

use super::error::ApiError;
use super::state::HttpState;
use crate::domain::query::QueryDocument;

/// JSON extractor configuration rendering decode failures as `400 { error }`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::bad_request(err.to_string()).into())
}

/// Execute a structured query document against the user schema.
///
/// Executor errors are part of a `200` body, next to whatever data was
/// produced.
#[utoipa::path(
    post,
    path = "/graphql",
    request_body = crate::inbound::http::schemas::QueryDocumentSchema,
    responses(
        (status = 200, description = "Document executed", body = crate::inbound::http::schemas::ExecutionResultSchema),
        (status = 400, description = "Undecodable document", body = crate::inbound::http::schemas::ErrorBodySchema)
    ),
    tags = ["graphql"],
    operation_id = "executeDocument"
)]
#[post("/graphql")]
pub async fn graphql(
    state: web::Data<HttpState>,
    document: web::Json<QueryDocument>,
) -> HttpResponse {
    let document = document.into_inner();
    debug!(document = %document.redacted(), "executing structured document");
    let result = state.schema.execute(&document).await;
    HttpResponse::Ok().json(result)
}
