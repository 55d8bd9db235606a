//! Tool invocation seam.

use crate::error::ToolError;
use crate::tool::{ToolDefinition, ToolRegistry};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::debug;

/// Lists and runs tools on behalf of the dialogue loop.
///
/// Implementations may run tools in-process ([`LocalToolInvoker`]) or forward
/// to a tool service over HTTP (`RemoteToolInvoker`).
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Returns the definitions of every available tool.
    ///
    /// # Errors
    ///
    /// Returns `ListingFailed` if the definitions cannot be fetched.
    async fn list_tools(&self) -> Result<Vec<ToolDefinition>, ToolError>;

    /// Runs the named tool.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTool` for unregistered names, or the tool's own error.
    async fn invoke(&self, name: &str, arguments: &JsonValue) -> Result<String, ToolError>;
}

/// Invoker backed by an in-process [`ToolRegistry`].
#[derive(Debug, Clone)]
pub struct LocalToolInvoker {
    registry: Arc<ToolRegistry>,
}

impl LocalToolInvoker {
    /// Creates an invoker over the given registry.
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

#[async_trait]
impl ToolInvoker for LocalToolInvoker {
    async fn list_tools(&self) -> Result<Vec<ToolDefinition>, ToolError> {
        Ok(self.registry.definitions())
    }

    async fn invoke(&self, name: &str, arguments: &JsonValue) -> Result<String, ToolError> {
        let tool = self
            .registry
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool {
                name: name.to_string(),
            })?;

        debug!(tool = name, "invoking local tool");
        tool.execute(arguments).await
    }
}
