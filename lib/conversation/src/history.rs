//! Conversation history storage.

use crate::error::HistoryError;
use async_trait::async_trait;
use spa_receptionist_ai::Turn;
use spa_receptionist_core::SessionKey;
use std::collections::HashMap;
use std::sync::RwLock;

/// Trait for history storage backends.
///
/// Writes replace the whole history for a key. Concurrent writers to the same
/// key are last-writer-wins.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Returns the stored history, or an empty list for an unknown key.
    async fn get(&self, session: &SessionKey) -> Result<Vec<Turn>, HistoryError>;

    /// Replaces the stored history.
    async fn put(&self, session: &SessionKey, turns: &[Turn]) -> Result<(), HistoryError>;
}

/// Process-local history store.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    sessions: RwLock<HashMap<SessionKey, Vec<Turn>>>,
}

impl InMemoryHistoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> HistoryError {
    HistoryError::StorageFailed {
        reason: "history lock poisoned".to_string(),
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn get(&self, session: &SessionKey) -> Result<Vec<Turn>, HistoryError> {
        let sessions = self.sessions.read().map_err(poisoned)?;
        Ok(sessions.get(session).cloned().unwrap_or_default())
    }

    async fn put(&self, session: &SessionKey, turns: &[Turn]) -> Result<(), HistoryError> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions.insert(session.clone(), turns.to_vec());
        Ok(())
    }
}
