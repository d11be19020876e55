//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the HTTP surface. It registers:
//!
//! - **Paths**: `/ai`, `/graphql`, and the health probes
//! - **Schemas**: wrappers from [`crate::inbound::http::schemas`] that describe
//!   domain wire shapes without coupling domain types to utoipa
//!
//! The generated document is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use utoipa::OpenApi;

use crate::inbound::http::ai::{AiRequest, AiResponse};
use crate::inbound::http::schemas::{
    ErrorBodySchema, ExecutionResultSchema, FieldSelectionSchema, IntentSchema,
    PublicUserSchema, QueryDocumentSchema, QueryErrorSchema,
};

/// OpenAPI document for the HTTP API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User intents API",
        description = "User records behind a typed schema, reachable in plain language.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::ai::ai,
        crate::inbound::http::graphql::graphql,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        AiRequest,
        AiResponse,
        IntentSchema,
        PublicUserSchema,
        QueryDocumentSchema,
        FieldSelectionSchema,
        ExecutionResultSchema,
        QueryErrorSchema,
        ErrorBodySchema,
    )),
    tags(
        (name = "ai", description = "Natural-language requests"),
        (name = "graphql", description = "Structured documents against the user schema"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
