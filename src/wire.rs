//! Request and response body shapes for the messages endpoint.
//!
//! The endpoint speaks an Anthropic-messages-compatible JSON dialect: a user
//! message whose content is either a bare string or an ordered array of text
//! blocks, each optionally tagged with an ephemeral `cache_control` marker.
//! Thinking mode is requested through a `thinking` object carrying the token
//! budget.

use serde::{Deserialize, Serialize};

use crate::config::ProfileConfig;
use crate::input::Input;

/// Wire protocol version sent with every request
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Cache marker attached to a content block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheControl {
    /// Cache type; the endpoint currently only supports "ephemeral"
    #[serde(rename = "type")]
    pub control_type: String,
}

impl CacheControl {
    /// Ephemeral cache marker
    #[must_use]
    pub fn ephemeral() -> Self {
        Self {
            control_type: "ephemeral".to_string(),
        }
    }
}

/// One typed block inside a structured message content array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Block type, always "text" for requests
    #[serde(rename = "type")]
    pub block_type: String,
    /// Block text
    pub text: String,
    /// Optional cache marker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<CacheControl>,
}

impl ContentBlock {
    /// Plain text block
    #[must_use]
    pub fn text(text: &str) -> Self {
        Self {
            block_type: "text".to_string(),
            text: text.to_string(),
            cache_control: None,
        }
    }

    /// Text block marked cacheable
    #[must_use]
    pub fn cacheable(text: &str) -> Self {
        Self {
            block_type: "text".to_string(),
            text: text.to_string(),
            cache_control: Some(CacheControl::ephemeral()),
        }
    }
}

/// Message content: a bare string or an ordered block array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Single unstructured text block
    Text(String),
    /// Ordered sequence of typed blocks
    Blocks(Vec<ContentBlock>),
}

/// A single message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message role ("user")
    pub role: String,
    /// Message content
    pub content: MessageContent,
}

/// Thinking-mode configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThinkingConfig {
    /// Mode, always "enabled" when present
    #[serde(rename = "type")]
    pub mode: String,
    /// Token budget for internal reasoning
    pub budget_tokens: u32,
}

impl ThinkingConfig {
    /// Enable thinking with the given budget
    #[must_use]
    pub fn enabled(budget_tokens: u32) -> Self {
        Self {
            mode: "enabled".to_string(),
            budget_tokens,
        }
    }
}

/// Request body for the messages endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRequest {
    /// Protocol version
    pub anthropic_version: String,
    /// Model identifier
    pub model: String,
    /// Maximum output tokens
    pub max_tokens: u32,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Thinking-mode configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<ThinkingConfig>,
    /// Conversation messages
    pub messages: Vec<Message>,
}

impl MessageRequest {
    /// Build a request from a normalized profile and one input.
    ///
    /// Segments marked cacheable produce blocks with a cache marker only when
    /// the profile also enables caching; plain-text inputs always serialize
    /// as a bare string.
    #[must_use]
    pub fn from_profile(profile: &ProfileConfig, input: &Input) -> Self {
        let content = match input {
            Input::Text(text) => MessageContent::Text(text.clone()),
            Input::Segments(segments) => MessageContent::Blocks(
                segments
                    .iter()
                    .map(|segment| {
                        if segment.cacheable && profile.enable_caching {
                            ContentBlock::cacheable(&segment.text)
                        } else {
                            ContentBlock::text(&segment.text)
                        }
                    })
                    .collect(),
            ),
        };

        Self {
            anthropic_version: ANTHROPIC_VERSION.to_string(),
            model: profile.model.clone(),
            max_tokens: profile.max_tokens,
            temperature: Some(profile.temperature),
            thinking: profile.thinking_budget.map(ThinkingConfig::enabled),
            messages: vec![Message {
                role: "user".to_string(),
                content,
            }],
        }
    }
}

/// One content block in a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseBlock {
    /// Block type ("text" or "thinking")
    #[serde(rename = "type", default)]
    pub block_type: String,
    /// Block text
    #[serde(default)]
    pub text: String,
}

/// Token usage counters reported by the endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Usage {
    /// Input tokens processed
    #[serde(default)]
    pub input_tokens: u64,
    /// Output tokens generated
    #[serde(default)]
    pub output_tokens: u64,
    /// Tokens read from the prompt cache
    #[serde(default)]
    pub cache_read_input_tokens: u64,
    /// Tokens written to the prompt cache
    #[serde(default)]
    pub cache_creation_input_tokens: u64,
}

/// Response body from the messages endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Generated content blocks
    #[serde(default)]
    pub content: Vec<ResponseBlock>,
    /// Why generation stopped
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Usage counters, when reported
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl MessageResponse {
    /// Concatenated text of all "text" blocks (thinking blocks excluded)
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|block| block.block_type == "text")
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("")
    }
}
