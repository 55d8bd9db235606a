//! Conversation turns in the shape the model consumes.
//!
//! A [`Turn`] serializes exactly as one entry of the Messages API `messages`
//! array, so stored history can be resubmitted without translation.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// The role of a turn's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The caller, or the system relaying tool output back to the model.
    User,
    /// The model.
    Assistant,
}

/// One block of structured turn content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Natural-language text.
    Text { text: String },
    /// A request from the model to run a tool.
    ToolUse {
        id: String,
        name: String,
        input: JsonValue,
    },
    /// The outcome of a tool request, correlated by `tool_use_id`.
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "is_false")]
        is_error: bool,
    },
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ContentBlock {
    /// Creates a text block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Creates a tool request block.
    #[must_use]
    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: JsonValue) -> Self {
        Self::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// Creates a successful tool result block.
    #[must_use]
    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Creates a tool result block carrying an error payload.
    #[must_use]
    pub fn tool_error(tool_use_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: error.into(),
            is_error: true,
        }
    }
}

/// Turn content: plain text or an ordered list of blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnContent {
    /// A plain utterance.
    Text(String),
    /// Structured blocks (assistant output, or tool results).
    Blocks(Vec<ContentBlock>),
}

/// One role-tagged entry in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Who produced this turn.
    pub role: Role,
    /// What was said.
    pub content: TurnContent,
}

impl Turn {
    /// Creates a user utterance.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Text(text.into()),
        }
    }

    /// Creates an assistant turn from the model's raw content blocks.
    #[must_use]
    pub fn assistant(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content: TurnContent::Blocks(blocks),
        }
    }

    /// Creates the user-role turn that carries tool results back to the model.
    #[must_use]
    pub fn tool_results(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Blocks(blocks),
        }
    }

    /// Returns true if this is something the caller actually said, as opposed
    /// to a system-synthesized tool-result carrier.
    #[must_use]
    pub fn is_user_utterance(&self) -> bool {
        self.role == Role::User && matches!(self.content, TurnContent::Text(_))
    }

    /// Returns the content blocks, or an empty slice for plain text.
    #[must_use]
    pub fn blocks(&self) -> &[ContentBlock] {
        match &self.content {
            TurnContent::Text(_) => &[],
            TurnContent::Blocks(blocks) => blocks,
        }
    }

    /// Returns the ids of the tool requests in this turn.
    pub fn tool_use_ids(&self) -> impl Iterator<Item = &str> {
        self.blocks().iter().filter_map(|block| match block {
            ContentBlock::ToolUse { id, .. } => Some(id.as_str()),
            _ => None,
        })
    }

    /// Returns the request ids answered by the tool results in this turn.
    pub fn tool_result_ids(&self) -> impl Iterator<Item = &str> {
        self.blocks().iter().filter_map(|block| match block {
            ContentBlock::ToolResult { tool_use_id, .. } => Some(tool_use_id.as_str()),
            _ => None,
        })
    }

    /// Returns true if this turn carries tool results.
    #[must_use]
    pub fn has_tool_results(&self) -> bool {
        self.tool_result_ids().next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_turn_serializes_as_plain_string() {
        let turn = Turn::user("Do you do facials?");
        let value = serde_json::to_value(&turn).expect("serialize");
        assert_eq!(value, json!({"role": "user", "content": "Do you do facials?"}));
    }

    #[test]
    fn assistant_turn_serializes_tagged_blocks() {
        let turn = Turn::assistant(vec![
            ContentBlock::text("Let me check."),
            ContentBlock::tool_use("tu_1", "get_service_info", json!({"service_name": "Facial"})),
        ]);
        let value = serde_json::to_value(&turn).expect("serialize");
        assert_eq!(
            value,
            json!({
                "role": "assistant",
                "content": [
                    {"type": "text", "text": "Let me check."},
                    {
                        "type": "tool_use",
                        "id": "tu_1",
                        "name": "get_service_info",
                        "input": {"service_name": "Facial"}
                    }
                ]
            })
        );
    }

    #[test]
    fn is_error_only_serialized_when_set() {
        let ok = serde_json::to_value(ContentBlock::tool_result("tu_1", "Facial: $80"))
            .expect("serialize");
        assert!(ok.get("is_error").is_none());

        let failed = serde_json::to_value(ContentBlock::tool_error("tu_2", "tool not found"))
            .expect("serialize");
        assert_eq!(failed["is_error"], json!(true));
    }

    #[test]
    fn stored_history_parses_back() {
        let stored = json!([
            {"role": "user", "content": "What's under $50?"},
            {"role": "assistant", "content": [
                {"type": "tool_use", "id": "tu_9", "name": "search_by_price", "input": {"max_price": 50}}
            ]},
            {"role": "user", "content": [
                {"type": "tool_result", "tool_use_id": "tu_9", "content": "Manicure - $35"}
            ]}
        ]);
        let turns: Vec<Turn> = serde_json::from_value(stored).expect("deserialize");

        assert!(turns[0].is_user_utterance());
        assert_eq!(turns[1].tool_use_ids().collect::<Vec<_>>(), vec!["tu_9"]);
        assert!(!turns[2].is_user_utterance());
        assert!(turns[2].has_tool_results());
    }
}
