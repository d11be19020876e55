//! HTTP adapter mapping for pipeline and request failures.
//!
//! Purpose: keep domain errors HTTP-agnostic while turning them into the
//! JSON bodies and status codes clients of `/ai` and `/graphql` rely on.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::{Value, json};
use thiserror::Error;

use crate::domain::PipelineError;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Body error for requests to `/ai` without a usable `message`.
pub const MISSING_MESSAGE_ERROR: &str = "Missing Message Field In Request Body";
/// Body error for `/ai` runs that outlive the request deadline.
pub const DEADLINE_EXCEEDED_ERROR: &str = "Request deadline exceeded";

/// Failures surfaced by HTTP handlers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// `/ai` was called without a non-empty string `message`.
    #[error("Missing Message Field In Request Body")]
    MissingMessage,
    /// The request body could not be decoded.
    #[error("{message}")]
    BadRequest { message: String },
    /// A pipeline stage failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    /// An unexpected fault escaped the pipeline.
    #[error("{message}")]
    Internal { message: String },
}

impl ApiError {
    /// Build a [`ApiError::BadRequest`].
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Build a [`ApiError::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::MissingMessage => json!({ "error": MISSING_MESSAGE_ERROR }),
            Self::BadRequest { message } | Self::Internal { message } => {
                json!({ "error": message })
            }
            Self::Pipeline(PipelineError::Parse(error)) => json!({
                "message": "Intent Parse Error!",
                "error": error.to_string(),
            }),
            Self::Pipeline(PipelineError::Build { intent, source }) => json!({
                "message": "Intent Translation Error!",
                "error": source.to_string(),
                "intent": intent,
            }),
            Self::Pipeline(PipelineError::Execution {
                intent,
                document,
                source,
            }) => json!({
                "message": "GraphQL Execution Error!",
                "errors": source.errors,
                "intent": intent,
                "gqlQuery": document.redacted().to_string(),
            }),
            Self::Pipeline(PipelineError::DeadlineExceeded { .. }) => {
                json!({ "error": DEADLINE_EXCEEDED_ERROR })
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingMessage | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Pipeline(PipelineError::DeadlineExceeded { .. }) => StatusCode::GATEWAY_TIMEOUT,
            Self::Pipeline(_) => StatusCode::BAD_REQUEST,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}

#[cfg(test)]
mod tests {
    //! Status and body mapping for every failure shape.

    use std::time::Duration;

    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::Map;

    use super::*;
    use crate::domain::ports::TextUnderstandingError;
    use crate::domain::query::{FieldSelection, QueryBuildError, QueryDocument};
    use crate::domain::schema::QueryError;
    use crate::domain::{ExecutionError, Intent, IntentParseError, OperationKind};

    async fn render(error: ApiError) -> (StatusCode, Value) {
        let response = error.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.expect("body bytes");
        let body = serde_json::from_slice(&bytes).expect("json body");
        (status, body)
    }

    fn get_intent() -> Intent {
        Intent::new(OperationKind::GetOne, Default::default())
    }

    #[rstest]
    #[case::missing(ApiError::MissingMessage, StatusCode::BAD_REQUEST)]
    #[case::bad_request(ApiError::bad_request("expected value"), StatusCode::BAD_REQUEST)]
    #[case::internal(ApiError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case::deadline(
        ApiError::Pipeline(PipelineError::DeadlineExceeded { deadline: Duration::from_secs(1) }),
        StatusCode::GATEWAY_TIMEOUT
    )]
    #[case::parse(
        ApiError::Pipeline(PipelineError::Parse(IntentParseError::Service(
            TextUnderstandingError::timeout("slow")
        ))),
        StatusCode::BAD_REQUEST
    )]
    fn maps_statuses(#[case] error: ApiError, #[case] expected: StatusCode) {
        assert_eq!(error.status_code(), expected);
    }

    #[actix_web::test]
    async fn missing_message_uses_the_fixed_text() {
        let (status, body) = render(ApiError::MissingMessage).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing Message Field In Request Body" }));
    }

    #[actix_web::test]
    async fn translation_errors_carry_the_intent() {
        let error = ApiError::from(PipelineError::Build {
            intent: get_intent(),
            source: QueryBuildError::MissingParameter {
                field: "id".to_owned(),
            },
        });

        let (status, body) = render(error).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Intent Translation Error!");
        assert_eq!(body["intent"]["operation"], "GetOne");
        assert!(body["error"].as_str().is_some_and(|text| text.contains("id")));
    }

    #[actix_web::test]
    async fn execution_errors_carry_errors_intent_and_rendered_query() {
        let error = ApiError::from(PipelineError::Execution {
            intent: get_intent(),
            document: QueryDocument::query(FieldSelection::new("hello")),
            source: ExecutionError {
                errors: vec![QueryError {
                    message: "boom".to_owned(),
                    path: vec!["hello".to_owned()],
                }],
                data: Some(Map::new()),
            },
        });

        let (status, body) = render(error).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "GraphQL Execution Error!");
        assert_eq!(body["errors"], json!([{ "message": "boom", "path": ["hello"] }]));
        assert_eq!(body["gqlQuery"], "query { hello }");
        assert_eq!(body["intent"]["operation"], "GetOne");
    }

    #[actix_web::test]
    async fn deadline_errors_use_the_fixed_text() {
        let error = ApiError::from(PipelineError::DeadlineExceeded {
            deadline: Duration::from_millis(10),
        });

        let (status, body) = render(error).await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body, json!({ "error": "Request deadline exceeded" }));
    }
}
