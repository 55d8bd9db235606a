//! Model backend abstraction.
//!
//! The dialogue loop talks to the hosted model only through [`ModelBackend`],
//! which keeps the loop testable with scripted backends.

use crate::error::LlmError;
use crate::message::{ContentBlock, Turn};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A tool as advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name.
    pub name: String,
    /// What the tool does, for the model's benefit.
    pub description: String,
    /// JSON schema of the tool's input object.
    pub input_schema: JsonValue,
}

/// A request to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRequest {
    /// System prompt, if any.
    pub system: Option<String>,
    /// The conversation so far, oldest first.
    pub messages: Vec<Turn>,
    /// Tools the model may request.
    pub tools: Vec<ToolSchema>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Temperature for sampling (0.0 - 1.0).
    pub temperature: Option<f32>,
}

impl ModelRequest {
    /// Creates a request over the given conversation.
    #[must_use]
    pub fn new(messages: Vec<Turn>) -> Self {
        Self {
            system: None,
            messages,
            tools: Vec::new(),
            max_tokens: None,
            temperature: None,
        }
    }

    /// Adds a system prompt.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Sets the advertised tools.
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolSchema>) -> Self {
        self.tools = tools;
        self
    }

    /// Sets the max tokens.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A tool request extracted from a model response.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolRequest {
    /// Request identifier assigned by the model.
    pub id: String,
    /// Requested tool name.
    pub name: String,
    /// Tool arguments.
    pub input: JsonValue,
}

/// A response from the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Ordered content blocks, exactly as returned.
    pub content: Vec<ContentBlock>,
    /// Why generation stopped (e.g. `end_turn`, `tool_use`).
    pub stop_reason: Option<String>,
    /// Token usage statistics.
    #[serde(default)]
    pub usage: TokenUsage,
    /// Model that generated the response.
    #[serde(default)]
    pub model: String,
}

impl ModelResponse {
    /// Creates a response from content blocks.
    #[must_use]
    pub fn new(content: Vec<ContentBlock>) -> Self {
        Self {
            content,
            stop_reason: None,
            usage: TokenUsage::default(),
            model: String::new(),
        }
    }

    /// Concatenates the text of every text block.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Returns the tool requests in the order they were emitted.
    #[must_use]
    pub fn tool_requests(&self) -> Vec<ToolRequest> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => Some(ToolRequest {
                    id: id.clone(),
                    name: name.clone(),
                    input: input.clone(),
                }),
                _ => None,
            })
            .collect()
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens.
    pub input_tokens: u32,
    /// Number of output tokens.
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Returns the total number of tokens.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Trait for model backends.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Generates a response for the given request.
    ///
    /// # Errors
    ///
    /// Returns an error if the model call fails for any reason.
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse, LlmError>;

    /// Returns the model name.
    fn model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn model_request_builder() {
        let request = ModelRequest::new(vec![Turn::user("Hi")])
            .with_system("You are Sally.")
            .with_max_tokens(150)
            .with_temperature(0.2);

        assert_eq!(request.system, Some("You are Sally.".to_string()));
        assert_eq!(request.max_tokens, Some(150));
        assert_eq!(request.messages.len(), 1);
        assert!(request.tools.is_empty());
    }

    #[test]
    fn response_text_concatenates_blocks() {
        let response = ModelResponse::new(vec![
            ContentBlock::text("Our facial "),
            ContentBlock::tool_use("tu_1", "get_service_info", json!({})),
            ContentBlock::text("is lovely."),
        ]);
        assert_eq!(response.text(), "Our facial is lovely.");
    }

    #[test]
    fn tool_requests_keep_order() {
        let response = ModelResponse::new(vec![
            ContentBlock::tool_use("tu_1", "get_all_services", json!({})),
            ContentBlock::text("and"),
            ContentBlock::tool_use("tu_2", "search_by_price", json!({"max_price": 60})),
        ]);
        let ids: Vec<_> = response
            .tool_requests()
            .into_iter()
            .map(|request| request.id)
            .collect();
        assert_eq!(ids, vec!["tu_1", "tu_2"]);
    }

    #[test]
    fn token_usage_total() {
        let usage = TokenUsage {
            input_tokens: 100,
            output_tokens: 50,
        };
        assert_eq!(usage.total(), 150);
    }
}
