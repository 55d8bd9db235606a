//! Conversation history repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use spa_receptionist_ai::Turn;
use spa_receptionist_conversation::{HistoryError, HistoryStore};
use spa_receptionist_core::SessionKey;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{debug, instrument};

/// A stored conversation.
#[derive(Debug, Clone)]
pub struct ConversationRecord {
    /// Session the history belongs to.
    pub session: SessionKey,
    /// Compacted turns, oldest first.
    pub turns: Vec<Turn>,
    /// When the history was last written.
    pub updated_at: DateTime<Utc>,
}

/// Row type for conversation queries.
#[derive(FromRow)]
struct ConversationRow {
    session_id: String,
    messages: Json<JsonValue>,
    updated_at: DateTime<Utc>,
}

impl ConversationRow {
    fn try_into_record(self) -> Result<ConversationRecord, HistoryError> {
        let session = SessionKey::new(self.session_id);
        let turns = serde_json::from_value(self.messages.0).map_err(|e| HistoryError::Corrupt {
            session: session.clone(),
            reason: e.to_string(),
        })?;

        Ok(ConversationRecord {
            session,
            turns,
            updated_at: self.updated_at,
        })
    }
}

fn storage_failed(e: sqlx::Error) -> HistoryError {
    HistoryError::StorageFailed {
        reason: e.to_string(),
    }
}

/// Repository for conversation history, backed by Postgres.
#[derive(Debug, Clone)]
pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    /// Creates a new repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds the conversation for a session.
    pub async fn find(&self, session: &SessionKey) -> Result<Option<ConversationRecord>, HistoryError> {
        let row: Option<ConversationRow> = sqlx::query_as(
            r#"
            SELECT session_id, messages, updated_at
            FROM conversations
            WHERE session_id = $1
            "#,
        )
        .bind(session.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_failed)?;

        row.map(ConversationRow::try_into_record).transpose()
    }

    /// Inserts or replaces the conversation for a session.
    pub async fn upsert(&self, session: &SessionKey, turns: &[Turn]) -> Result<(), HistoryError> {
        sqlx::query(
            r#"
            INSERT INTO conversations (session_id, messages, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (session_id) DO UPDATE
            SET messages = EXCLUDED.messages, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(session.as_str())
        .bind(Json(turns))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(storage_failed)?;

        Ok(())
    }
}

#[async_trait]
impl HistoryStore for ConversationRepository {
    #[instrument(skip(self), fields(session = %session))]
    async fn get(&self, session: &SessionKey) -> Result<Vec<Turn>, HistoryError> {
        match self.find(session).await? {
            Some(record) => {
                debug!(
                    turns = record.turns.len(),
                    updated_at = %record.updated_at,
                    "loaded history"
                );
                Ok(record.turns)
            }
            None => Ok(Vec::new()),
        }
    }

    #[instrument(skip(self, turns), fields(session = %session, turns = turns.len()))]
    async fn put(&self, session: &SessionKey, turns: &[Turn]) -> Result<(), HistoryError> {
        self.upsert(session, turns).await
    }
}
