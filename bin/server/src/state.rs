//! Shared application state.

use crate::twiml::Twiml;
use spa_receptionist_conversation::{DialogueLoop, ToolInvoker};
use std::sync::Arc;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Dialogue loop for phone calls.
    pub voice: DialogueLoop,
    /// Dialogue loop for web chat.
    pub chat: DialogueLoop,
    /// Tools served on the tool endpoint.
    pub tools: Arc<dyn ToolInvoker>,
    /// TwiML renderer for voice responses.
    pub twiml: Twiml,
}
