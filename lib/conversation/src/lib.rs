//! Conversation engine for the spa receptionist.
//!
//! This crate provides:
//!
//! - **Dialogue Loop**: model calls interleaved with tool lookups, one turn at a time
//! - **Tool Registry**: tools available during conversation, local or remote
//! - **Schema Translator**: tool definitions rendered as model input schemas
//! - **History Store**: per-session turn history, compacted before each write

pub mod compact;
pub mod dialogue;
pub mod error;
pub mod history;
pub mod invoker;
pub mod remote;
pub mod schema;
pub mod tool;

pub use compact::{compact, is_well_paired};
pub use dialogue::{DEFAULT_FALLBACK, DialogueConfig, DialogueLoop, TurnOutcome};
pub use error::{DialogueError, HistoryError, ToolError};
pub use history::{HistoryStore, InMemoryHistoryStore};
pub use invoker::{LocalToolInvoker, ToolInvoker};
pub use remote::{LIST_TOOLS, RemoteToolInvoker, ToolCallRequest, ToolCallResponse};
pub use schema::translate;
pub use tool::{ParamKind, ParamSpec, Tool, ToolDefinition, ToolRegistry};
