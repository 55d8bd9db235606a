//! Tool registry.
//!
//! Tools are the lookups the model may request mid-turn (service catalog,
//! pricing). A registry is filled once at startup and then shared read-only.

use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// The value type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    /// Free text.
    String,
    /// A number.
    Number,
}

impl ParamKind {
    /// Infers a kind from a natural-language hint.
    ///
    /// A hint mentioning "number" (any case) is numeric; anything else is text.
    #[must_use]
    pub fn infer(hint: &str) -> Self {
        if hint.to_lowercase().contains("number") {
            Self::Number
        } else {
            Self::String
        }
    }

    /// Returns the JSON schema type name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
        }
    }
}

/// Description of one tool parameter.
///
/// Accepts either a bare hint string (`"number - Maximum price"`) or an
/// object with an explicit type (`{"hint": "...", "type": "number"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamSpec {
    /// Hint only; the kind is inferred from the text.
    Hint(String),
    /// Hint with an explicit kind.
    Typed {
        hint: String,
        #[serde(rename = "type")]
        kind: ParamKind,
    },
}

impl ParamSpec {
    /// Returns the human-readable hint.
    #[must_use]
    pub fn hint(&self) -> &str {
        match self {
            Self::Hint(hint) | Self::Typed { hint, .. } => hint,
        }
    }

    /// Returns the explicit kind, falling back to inference from the hint.
    #[must_use]
    pub fn kind(&self) -> ParamKind {
        match self {
            Self::Hint(hint) => ParamKind::infer(hint),
            Self::Typed { kind, .. } => *kind,
        }
    }
}

/// Definition of a tool available during conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Parameters by name.
    #[serde(default)]
    pub parameters: BTreeMap<String, ParamSpec>,
}

impl ToolDefinition {
    /// Creates a tool definition without parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Adds a parameter whose kind is inferred from its hint.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, hint: impl Into<String>) -> Self {
        self.parameters
            .insert(name.into(), ParamSpec::Hint(hint.into()));
        self
    }

    /// Adds a parameter with an explicit kind.
    #[must_use]
    pub fn with_typed_param(
        mut self,
        name: impl Into<String>,
        hint: impl Into<String>,
        kind: ParamKind,
    ) -> Self {
        self.parameters.insert(
            name.into(),
            ParamSpec::Typed {
                hint: hint.into(),
                kind,
            },
        );
        self
    }
}

/// Trait for tool execution.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool definition.
    fn definition(&self) -> ToolDefinition;

    /// Executes the tool with the given arguments, producing plain text.
    async fn execute(&self, arguments: &JsonValue) -> Result<String, ToolError>;
}

/// Registry of available tools, keyed by name.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Registers a tool, replacing any tool with the same name.
    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.definition().name;
        self.tools.insert(name, Arc::new(tool));
    }

    /// Registers a tool and returns the registry.
    #[must_use]
    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.register(tool);
        self
    }

    /// Gets a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Returns all definitions, ordered by tool name.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Greeter;

    #[async_trait]
    impl Tool for Greeter {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new("greet", "Greets someone").with_param("who", "string - Name")
        }

        async fn execute(&self, arguments: &JsonValue) -> Result<String, ToolError> {
            Ok(format!("Hello, {}!", arguments["who"].as_str().unwrap_or("friend")))
        }
    }

    #[test]
    fn param_kind_inference() {
        assert_eq!(ParamKind::infer("number - Maximum price"), ParamKind::Number);
        assert_eq!(ParamKind::infer("Max price (NUMBER)"), ParamKind::Number);
        assert_eq!(ParamKind::infer("string - Name of the service"), ParamKind::String);
        assert_eq!(ParamKind::infer(""), ParamKind::String);
    }

    #[test]
    fn explicit_kind_wins_over_hint() {
        let spec = ParamSpec::Typed {
            hint: "phone number of the caller".to_string(),
            kind: ParamKind::String,
        };
        assert_eq!(spec.kind(), ParamKind::String);
        assert_eq!(spec.hint(), "phone number of the caller");
    }

    #[test]
    fn definition_parses_both_parameter_forms() {
        let def: ToolDefinition = serde_json::from_value(json!({
            "name": "search_by_price",
            "description": "Find services under a specific price",
            "parameters": {
                "max_price": "number - Maximum price",
                "currency": {"hint": "ISO code", "type": "string"}
            }
        }))
        .expect("deserialize");

        assert_eq!(def.parameters["max_price"].kind(), ParamKind::Number);
        assert_eq!(def.parameters["currency"].kind(), ParamKind::String);
    }

    #[test]
    fn definition_without_parameters() {
        let def: ToolDefinition = serde_json::from_value(json!({
            "name": "get_all_services",
            "description": "List everything"
        }))
        .expect("deserialize");
        assert!(def.parameters.is_empty());
    }

    #[tokio::test]
    async fn registry_operations() {
        let registry = ToolRegistry::new().with_tool(Greeter);

        assert_eq!(registry.len(), 1);
        assert!(registry.get("nonexistent").is_none());

        let tool = registry.get("greet").expect("registered");
        let output = tool.execute(&json!({"who": "Sally"})).await.expect("execute");
        assert_eq!(output, "Hello, Sally!");

        assert_eq!(registry.definitions()[0].name, "greet");
    }
}
