//! Natural-language bridge.
//!
//! ```text
//! POST /ai {"message":"create a user named Alice Smith with email a@x.com and password p1"}
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;

use actix_web::{HttpResponse, post, web};
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use super::error::{ApiError, ApiResult};
use super::state::HttpState;
use crate::domain::{Intent, PipelineError};

/// Request body for `POST /ai`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AiRequest {
    /// Free-text instruction about users.
    #[schema(example = "list 5 users")]
    pub message: Option<String>,
}

/// Success body for `POST /ai`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AiResponse {
    /// Always `Success!`.
    #[schema(example = "Success!")]
    pub message: String,
    /// Intent the message resolved to.
    #[schema(value_type = Object)]
    pub intent: Intent,
    /// Executor data keyed by root field.
    #[schema(value_type = Object)]
    pub data: Value,
}

/// Run a free-text message through parse, build, and execute.
#[utoipa::path(
    post,
    path = "/ai",
    request_body = AiRequest,
    responses(
        (status = 200, description = "Message executed", body = AiResponse),
        (status = 400, description = "Missing message, or a parse, translation, or execution failure"),
        (status = 504, description = "Request deadline exceeded", body = crate::inbound::http::schemas::ErrorBodySchema),
        (status = 500, description = "Unexpected fault", body = crate::inbound::http::schemas::ErrorBodySchema)
    ),
    tags = ["ai"],
    operation_id = "ai"
)]
#[post("/ai")]
pub async fn ai(state: web::Data<HttpState>, body: web::Bytes) -> ApiResult<HttpResponse> {
    let message = decode_message(&body).ok_or(ApiError::MissingMessage)?;

    let outcome = AssertUnwindSafe(state.pipeline.run(&message))
        .catch_unwind()
        .await
        .map_err(|payload| {
            let message = panic_message(payload.as_ref());
            error!(error = %message, "intent pipeline panicked");
            ApiError::internal(message)
        })?
        .map_err(|error| {
            log_pipeline_error(&error);
            ApiError::from(error)
        })?;

    info!(operation = %outcome.intent.operation(), "message executed");
    Ok(HttpResponse::Ok().json(AiResponse {
        message: "Success!".to_owned(),
        intent: outcome.intent,
        data: outcome.data,
    }))
}

/// Extract a non-blank `message`; any other body shape counts as missing.
fn decode_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<AiRequest>(body)
        .ok()
        .and_then(|request| request.message)
        .filter(|message| !message.trim().is_empty())
}

fn log_pipeline_error(error: &PipelineError) {
    match error {
        PipelineError::Parse(_) => warn!(%error, "intent parse failed"),
        PipelineError::Build { intent, .. } => {
            warn!(%error, operation = %intent.operation(), "intent translation failed");
        }
        PipelineError::Execution { document, .. } => {
            warn!(%error, document = %document.redacted(), "document execution failed");
        }
        PipelineError::DeadlineExceeded { .. } => warn!(%error, "pipeline abandoned"),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "internal error".to_owned())
}
