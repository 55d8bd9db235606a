//! Database repositories for the spa receptionist.
//!
//! This module provides data access for:
//! - Conversation history, one row per session

pub mod conversation;

pub use conversation::{ConversationRecord, ConversationRepository};
