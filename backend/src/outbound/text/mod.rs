//! Text-understanding adapters.
//!
//! [`AnthropicTextUnderstanding`] calls the hosted Messages API;
//! [`KeywordTextUnderstanding`] classifies offline with regular expressions.

mod anthropic;
mod dto;
mod keyword;

pub use anthropic::{AnthropicTextUnderstanding, DEFAULT_ANTHROPIC_ENDPOINT, DEFAULT_ANTHROPIC_MODEL};
pub use keyword::KeywordTextUnderstanding;
