//! HTTP client for a remote tool service.
//!
//! The service speaks a small JSON protocol on one endpoint:
//!
//! ```text
//! POST {"tool_name": "list_tools", "arguments": {}}  -> {"tools": [...]}
//! POST {"tool_name": "<name>", "arguments": {...}}   -> {"result": "..."}
//! errors                                             -> {"error": "..."}
//! ```

use crate::error::ToolError;
use crate::invoker::ToolInvoker;
use crate::tool::ToolDefinition;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::time::Duration;
use tracing::{debug, warn};

/// Reserved tool name that returns the tool definitions.
pub const LIST_TOOLS: &str = "list_tools";

/// Request body for the tool endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Tool to run, or [`LIST_TOOLS`].
    pub tool_name: String,
    /// Arguments for the tool.
    #[serde(default = "empty_object")]
    pub arguments: JsonValue,
}

fn empty_object() -> JsonValue {
    JsonValue::Object(Map::new())
}

/// Response body from the tool endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
}

impl ToolCallResponse {
    /// Successful tool output.
    #[must_use]
    pub fn result(result: impl Into<String>) -> Self {
        Self {
            result: Some(result.into()),
            ..Self::default()
        }
    }

    /// Error payload.
    #[must_use]
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Tool listing.
    #[must_use]
    pub fn tools(tools: Vec<ToolDefinition>) -> Self {
        Self {
            tools: Some(tools),
            ..Self::default()
        }
    }
}

/// Invoker that forwards every call to a remote tool service.
#[derive(Debug, Clone)]
pub struct RemoteToolInvoker {
    http: reqwest::Client,
    endpoint: String,
}

impl RemoteToolInvoker {
    /// Creates an invoker posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns `ListingFailed` if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ToolError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ToolError::ListingFailed {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call(
        &self,
        tool_name: &str,
        arguments: &JsonValue,
    ) -> Result<(StatusCode, ToolCallResponse), String> {
        let body = ToolCallRequest {
            tool_name: tool_name.to_string(),
            arguments: arguments.clone(),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("tool service unreachable: {e}"))?;

        let status = response.status();
        let parsed = response
            .json::<ToolCallResponse>()
            .await
            .map_err(|e| format!("tool service returned HTTP {status} with unreadable body: {e}"))?;

        Ok((status, parsed))
    }
}

/// Maps a tool service reply to the invocation outcome.
fn interpret_invocation(
    name: &str,
    status: StatusCode,
    response: ToolCallResponse,
) -> Result<String, ToolError> {
    if status.is_success() {
        if let Some(result) = response.result {
            return Ok(result);
        }
    }

    let reason = response
        .error
        .unwrap_or_else(|| format!("tool service returned HTTP {status} without a result"));

    if status == StatusCode::BAD_REQUEST && reason.starts_with("Unknown tool") {
        return Err(ToolError::UnknownTool {
            name: name.to_string(),
        });
    }

    Err(ToolError::ExecutionFailed {
        name: name.to_string(),
        reason,
    })
}

#[async_trait]
impl ToolInvoker for RemoteToolInvoker {
    async fn list_tools(&self) -> Result<Vec<ToolDefinition>, ToolError> {
        let (status, response) = self
            .call(LIST_TOOLS, &empty_object())
            .await
            .map_err(|reason| ToolError::ListingFailed { reason })?;

        match response.tools {
            Some(tools) if status.is_success() => {
                debug!(count = tools.len(), "fetched remote tool definitions");
                Ok(tools)
            }
            _ => Err(ToolError::ListingFailed {
                reason: response
                    .error
                    .unwrap_or_else(|| format!("tool service returned HTTP {status} without tools")),
            }),
        }
    }

    async fn invoke(&self, name: &str, arguments: &JsonValue) -> Result<String, ToolError> {
        let (status, response) = self.call(name, arguments).await.map_err(|reason| {
            warn!(tool = name, %reason, "remote tool call failed");
            ToolError::ExecutionFailed {
                name: name.to_string(),
                reason,
            }
        })?;

        interpret_invocation(name, status, response)
    }
}
