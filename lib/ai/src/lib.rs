//! Model-facing primitives for the spa receptionist.
//!
//! This crate provides:
//!
//! - **Turns and content blocks**: the conversation shape the model sees and
//!   that history is persisted in
//! - **Model backend**: the request/response seam the dialogue loop calls
//! - **Anthropic backend**: the hosted Messages API implementation

pub mod anthropic;
pub mod backend;
pub mod error;
pub mod message;

pub use anthropic::{AnthropicBackend, AnthropicConfig};
pub use backend::{ModelBackend, ModelRequest, ModelResponse, TokenUsage, ToolRequest, ToolSchema};
pub use error::LlmError;
pub use message::{ContentBlock, Role, Turn, TurnContent};
