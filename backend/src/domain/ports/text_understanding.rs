//! Driven port for the external text-understanding service.
//!
//! The intent parser owns the prompt and the response contract; adapters
//! only move text across the wire and classify transport failures.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while calling a text-understanding service.
    pub enum TextUnderstandingError {
        /// Network transport failed or the service answered with a server error.
        Transport { message: String } =>
            "text understanding transport failed: {message}",
        /// The call exceeded its timeout.
        Timeout { message: String } =>
            "text understanding timed out: {message}",
        /// The service rate-limited the request.
        RateLimited { message: String } =>
            "text understanding rate limited request: {message}",
        /// The service rejected the request (credentials, payload, model).
        Rejected { message: String } =>
            "text understanding rejected request: {message}",
        /// The response envelope could not be decoded.
        Decode { message: String } =>
            "text understanding response decode failed: {message}",
    }
}

/// Port for single-turn completions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextUnderstanding: Send + Sync {
    /// Complete `message` under `system_prompt` and return the raw reply text.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use user_intents::domain::ports::{FixtureTextUnderstanding, TextUnderstanding};
    ///
    /// let service = FixtureTextUnderstanding::replying(r#"{"operation":"Unknown"}"#);
    /// let reply = service.complete("classify", "hello").await?;
    /// assert!(reply.contains("Unknown"));
    /// # Ok::<(), user_intents::domain::ports::TextUnderstandingError>(())
    /// ```
    async fn complete(
        &self,
        system_prompt: &str,
        message: &str,
    ) -> Result<String, TextUnderstandingError>;
}

/// Fixture implementation returning a canned reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureTextUnderstanding {
    reply: String,
}

impl FixtureTextUnderstanding {
    /// Reply with `reply` to every message.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

impl Default for FixtureTextUnderstanding {
    fn default() -> Self {
        Self::replying(r#"{"operation":"Unknown","entity":"user","parameters":{}}"#)
    }
}

#[async_trait]
impl TextUnderstanding for FixtureTextUnderstanding {
    async fn complete(
        &self,
        _system_prompt: &str,
        _message: &str,
    ) -> Result<String, TextUnderstandingError> {
        Ok(self.reply.clone())
    }
}
