//! HTTP routes.
//!
//! - `/`, `/voice/*`: telephony webhooks answering in TwiML
//! - `/chat`: JSON chat for the web widget
//! - `/tools`: JSON tool endpoint for remote invokers

pub mod chat;
pub mod tools;
pub mod voice;

use crate::state::AppState;
use axum::http::{Method, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE])
        .allow_methods([Method::POST, Method::OPTIONS]);

    let chat = Router::new()
        .route("/chat", post(chat::chat))
        .layer(cors);

    Router::new()
        .route("/", get(voice::incoming).post(voice::incoming))
        .route("/voice/incoming", get(voice::incoming).post(voice::incoming))
        .route("/voice/gather", get(voice::gather).post(voice::gather))
        .route("/voice/process", post(voice::process))
        .route("/tools", post(tools::call))
        .merge(chat)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain")],
        "Not Found",
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::state::AppState;
    use crate::twiml::Twiml;
    use async_trait::async_trait;
    use spa_receptionist_ai::{LlmError, ModelBackend, ModelRequest, ModelResponse};
    use spa_receptionist_catalog::{Service, StaticCatalog, catalog_registry};
    use spa_receptionist_conversation::{
        DialogueConfig, DialogueLoop, HistoryStore, InMemoryHistoryStore, LocalToolInvoker,
        ToolInvoker,
    };
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays canned responses; fails once the script runs out.
    pub struct ScriptedBackend {
        script: Mutex<VecDeque<ModelResponse>>,
        pub requests: Mutex<Vec<ModelRequest>>,
    }

    impl ScriptedBackend {
        pub fn new(script: Vec<ModelResponse>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ModelBackend for ScriptedBackend {
        async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse, LlmError> {
            self.requests.lock().expect("lock").push(request.clone());
            self.script
                .lock()
                .expect("lock")
                .pop_front()
                .ok_or(LlmError::Timeout)
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    pub struct Harness {
        pub state: Arc<AppState>,
        pub backend: Arc<ScriptedBackend>,
        pub history: Arc<InMemoryHistoryStore>,
    }

    pub fn harness(script: Vec<ModelResponse>) -> Harness {
        let backend = Arc::new(ScriptedBackend::new(script));
        let history = Arc::new(InMemoryHistoryStore::new());
        let catalog = Arc::new(StaticCatalog::new(vec![
            Service::new("Manicure", 35.0, "30 minutes"),
            Service::new("Facial", 80.0, "60 minutes"),
        ]));
        let tools: Arc<dyn ToolInvoker> =
            Arc::new(LocalToolInvoker::new(Arc::new(catalog_registry(catalog))));
        let store: Arc<dyn HistoryStore> = history.clone();

        let voice = DialogueLoop::new(
            backend.clone(),
            tools.clone(),
            store.clone(),
            DialogueConfig::new("voice prompt").with_max_tokens(150),
        );
        let chat = DialogueLoop::new(
            backend.clone(),
            tools.clone(),
            store,
            DialogueConfig::new("chat prompt"),
        );

        Harness {
            state: Arc::new(AppState {
                voice,
                chat,
                tools,
                twiml: Twiml::default(),
            }),
            backend,
            history,
        }
    }

    pub async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        String::from_utf8(bytes.to_vec()).expect("utf8")
    }
}
