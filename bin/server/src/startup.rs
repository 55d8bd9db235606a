//! Builds the collaborators from configuration.

use crate::config::ServerConfig;
use crate::db::ConversationRepository;
use crate::error::StartupError;
use crate::prompt::{CHAT_SYSTEM_PROMPT, VOICE_SYSTEM_PROMPT};
use crate::state::AppState;
use crate::twiml::Twiml;
use spa_receptionist_ai::{AnthropicBackend, ModelBackend};
use spa_receptionist_catalog::{CatalogSource, FileCatalog, HttpCatalog, catalog_registry};
use spa_receptionist_conversation::{
    DialogueConfig, DialogueLoop, HistoryStore, InMemoryHistoryStore, LocalToolInvoker,
    RemoteToolInvoker, ToolInvoker,
};
use spa_receptionist_core::Result;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Connects to Postgres and applies migrations, or falls back to memory.
pub async fn history_store(config: &ServerConfig) -> Result<Arc<dyn HistoryStore>, StartupError> {
    let Some(url) = &config.database_url else {
        info!("no database configured, keeping history in memory");
        return Ok(Arc::new(InMemoryHistoryStore::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(url)
        .await
        .map_err(|e| StartupError::Database {
            details: e.to_string(),
        })?;

    info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| StartupError::Migration {
            details: e.to_string(),
        })?;

    Ok(Arc::new(ConversationRepository::new(pool)))
}

fn catalog_source(config: &ServerConfig) -> Result<Arc<dyn CatalogSource>, StartupError> {
    let timeout = Duration::from_secs(config.tools.timeout_seconds);
    match &config.catalog.url {
        Some(url) => {
            info!(%url, "reading catalog over HTTP");
            let source = HttpCatalog::new(url.clone(), timeout).map_err(|e| {
                StartupError::Component {
                    component: "catalog",
                    details: e.to_string(),
                }
            })?;
            Ok(Arc::new(source))
        }
        None => {
            info!(path = %config.catalog.path, "reading catalog from file");
            Ok(Arc::new(FileCatalog::new(&config.catalog.path)))
        }
    }
}

/// Builds the shared state for the router.
pub async fn build_state(config: &ServerConfig) -> Result<AppState, StartupError> {
    let backend: Arc<dyn ModelBackend> = Arc::new(
        AnthropicBackend::new(config.anthropic.clone()).map_err(|e| StartupError::Component {
            component: "model backend",
            details: e.to_string(),
        })?,
    );

    let history = history_store(config).await?;

    let local: Arc<dyn ToolInvoker> = Arc::new(LocalToolInvoker::new(Arc::new(
        catalog_registry(catalog_source(config)?),
    )));

    let dialogue_tools: Arc<dyn ToolInvoker> = match &config.tools.remote_url {
        Some(url) => {
            info!(%url, "dialogue tools served remotely");
            let remote = RemoteToolInvoker::new(
                url.clone(),
                Duration::from_secs(config.tools.timeout_seconds),
            )
            .map_err(|e| StartupError::Component {
                component: "remote tool client",
                details: e.to_string(),
            })?;
            Arc::new(remote)
        }
        None => local.clone(),
    };

    let limits = &config.dialogue;
    let dialogue = |prompt: &str, max_tokens: u32| {
        DialogueLoop::new(
            backend.clone(),
            dialogue_tools.clone(),
            history.clone(),
            DialogueConfig::new(prompt)
                .with_max_tokens(max_tokens)
                .with_max_exchanges(limits.max_exchanges)
                .with_max_tool_rounds(limits.max_tool_rounds),
        )
    };

    Ok(AppState {
        voice: dialogue(VOICE_SYSTEM_PROMPT, config.voice.max_tokens),
        chat: dialogue(CHAT_SYSTEM_PROMPT, config.chat.max_tokens),
        tools: local,
        twiml: Twiml::from(&config.voice),
    })
}
