//! JSON chat for the web widget.

use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use spa_receptionist_core::{ChatSessionId, SessionKey};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    /// Omitted on the first message; the reply carries a fresh one.
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
    pub session_id: String,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    request: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(request) = request.map_err(|e| ApiError::bad_request(e.body_text()))?;
    if request.message.trim().is_empty() {
        return Err(ApiError::bad_request("Message is required"));
    }

    let session = match request.session_id.filter(|id| !id.is_empty()) {
        Some(id) => SessionKey::new(id),
        None => SessionKey::from(ChatSessionId::new()),
    };
    let message = state.chat.respond(&request.message, &session).await;

    Ok(Json(ChatReply {
        message,
        session_id: session.to_string(),
    }))
}
