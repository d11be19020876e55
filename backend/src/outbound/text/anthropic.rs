//! Reqwest-backed adapter for the Anthropic Messages API.
//!
//! This adapter owns transport details only: request serialisation, timeout and
//! HTTP error mapping, and extraction of the reply text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::{MessageDto, MessagesRequestDto, MessagesResponseDto};
use crate::domain::ports::{TextUnderstanding, TextUnderstandingError};

/// Messages endpoint used when none is configured.
pub const DEFAULT_ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
/// Model used when none is configured.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Text-understanding adapter that POSTs one user turn per call.
///
/// Not `Debug`: holds the API key.
pub struct AnthropicTextUnderstanding {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicTextUnderstanding {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    /// ```rust,ignore
    /// let service = AnthropicTextUnderstanding::new(endpoint, api_key, model, timeout)?;
    /// ```
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    /// Override the completion token cap.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens.max(1);
        self
    }

    fn request_body<'a>(&'a self, system_prompt: &'a str, message: &'a str) -> MessagesRequestDto<'a> {
        MessagesRequestDto {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: system_prompt,
            messages: [MessageDto {
                role: "user",
                content: message,
            }],
        }
    }
}

#[async_trait]
impl TextUnderstanding for AnthropicTextUnderstanding {
    async fn complete(
        &self,
        system_prompt: &str,
        message: &str,
    ) -> Result<String, TextUnderstandingError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-api-key", self.api_key.as_str())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&self.request_body(system_prompt, message))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_reply(body.as_ref())
    }
}

fn parse_reply(body: &[u8]) -> Result<String, TextUnderstandingError> {
    let decoded: MessagesResponseDto = serde_json::from_slice(body).map_err(|error| {
        TextUnderstandingError::decode(format!("invalid Messages API payload: {error}"))
    })?;
    decoded.into_text().map_err(TextUnderstandingError::decode)
}

fn map_transport_error(error: reqwest::Error) -> TextUnderstandingError {
    if error.is_timeout() {
        TextUnderstandingError::timeout(error.to_string())
    } else {
        TextUnderstandingError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> TextUnderstandingError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => TextUnderstandingError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            TextUnderstandingError::timeout(message)
        }
        _ if status.is_client_error() => TextUnderstandingError::rejected(message),
        _ => TextUnderstandingError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
