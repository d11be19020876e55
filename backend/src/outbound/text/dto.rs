//! Wire shapes for the Anthropic Messages API.
//!
//! Only the fields the adapter sends or reads are modelled; unknown response
//! fields are ignored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct MessagesRequestDto<'a> {
    pub(super) model: &'a str,
    pub(super) max_tokens: u32,
    pub(super) system: &'a str,
    pub(super) messages: [MessageDto<'a>; 1],
}

#[derive(Debug, Serialize)]
pub(super) struct MessageDto<'a> {
    pub(super) role: &'static str,
    pub(super) content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct MessagesResponseDto {
    #[serde(default)]
    pub(super) content: Vec<ContentBlockDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ContentBlockDto {
    #[serde(rename = "type")]
    pub(super) block_type: String,
    #[serde(default)]
    pub(super) text: Option<String>,
}

impl MessagesResponseDto {
    /// Concatenate every text block, in order.
    pub(super) fn into_text(self) -> Result<String, String> {
        let text = self
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");
        if text.trim().is_empty() {
            Err("response carried no text content".to_owned())
        } else {
            Ok(text)
        }
    }
}
