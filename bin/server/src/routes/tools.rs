//! Tool endpoint for remote invokers.

use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use spa_receptionist_conversation::{LIST_TOOLS, ToolCallRequest, ToolCallResponse, ToolError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Lists tools or runs one, answering `{"tools"}`, `{"result"}` or `{"error"}`.
pub async fn call(
    State(state): State<Arc<AppState>>,
    request: Result<Json<ToolCallRequest>, JsonRejection>,
) -> (StatusCode, Json<ToolCallResponse>) {
    let request = match request {
        Ok(Json(request)) => request,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ToolCallResponse::error(e.body_text())),
            );
        }
    };

    if request.tool_name == LIST_TOOLS {
        return match state.tools.list_tools().await {
            Ok(tools) => (StatusCode::OK, Json(ToolCallResponse::tools(tools))),
            Err(e) => {
                warn!(error = %e, "tool listing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ToolCallResponse::error(e.to_string())),
                )
            }
        };
    }

    debug!(tool = %request.tool_name, "tool call");
    match state
        .tools
        .invoke(&request.tool_name, &request.arguments)
        .await
    {
        Ok(result) => (StatusCode::OK, Json(ToolCallResponse::result(result))),
        Err(e @ ToolError::UnknownTool { .. }) => (
            StatusCode::BAD_REQUEST,
            Json(ToolCallResponse::error(e.to_string())),
        ),
        Err(e) => {
            warn!(tool = %request.tool_name, error = %e, "tool call failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ToolCallResponse::error(e.to_string())),
            )
        }
    }
}
