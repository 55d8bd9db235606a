//! Error types for the conversation crate.
//!
//! - `ToolError`: a tool could not produce a result (reported to the model)
//! - `HistoryError`: the history store failed (degraded, never surfaced)
//! - `DialogueError`: the turn itself failed (caller gets the fallback text)

use spa_receptionist_ai::LlmError;
use spa_receptionist_core::SessionKey;
use std::fmt;

/// Errors from tool listing and execution.
///
/// Every variant renders to text that is safe to hand back to the model as
/// a tool-result payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// The requested tool is not registered.
    UnknownTool { name: String },
    /// The tool ran and failed.
    ExecutionFailed { name: String, reason: String },
    /// The tool's arguments could not be decoded.
    InvalidInput { name: String, reason: String },
    /// The tool definitions could not be fetched.
    ListingFailed { reason: String },
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTool { name } => write!(f, "Unknown tool: {name}"),
            Self::ExecutionFailed { name, reason } => {
                write!(f, "tool '{name}' execution failed: {reason}")
            }
            Self::InvalidInput { name, reason } => {
                write!(f, "invalid input for tool '{name}': {reason}")
            }
            Self::ListingFailed { reason } => {
                write!(f, "failed to list tools: {reason}")
            }
        }
    }
}

impl std::error::Error for ToolError {}

/// Errors from history store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// Storage operation failed.
    StorageFailed { reason: String },
    /// Stored history could not be decoded.
    Corrupt { session: SessionKey, reason: String },
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StorageFailed { reason } => {
                write!(f, "history storage failed: {reason}")
            }
            Self::Corrupt { session, reason } => {
                write!(f, "stored history for session {session} is corrupt: {reason}")
            }
        }
    }
}

impl std::error::Error for HistoryError {}

/// Errors that abort a dialogue turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueError {
    /// The model call failed.
    ModelCall(LlmError),
    /// The tool definitions could not be fetched.
    ToolListing(ToolError),
    /// The model kept requesting tools past the configured limit.
    ToolLoopExceeded { max_rounds: usize },
}

impl fmt::Display for DialogueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelCall(e) => write!(f, "model call failed: {e}"),
            Self::ToolListing(e) => write!(f, "tool listing failed: {e}"),
            Self::ToolLoopExceeded { max_rounds } => {
                write!(f, "model requested tools for more than {max_rounds} rounds")
            }
        }
    }
}

impl std::error::Error for DialogueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ModelCall(e) => Some(e),
            Self::ToolListing(e) => Some(e),
            Self::ToolLoopExceeded { .. } => None,
        }
    }
}
