//! Conversation registry abstraction.
//!
//! The host framework owns conversations; [`ConversationManager`] exposes lookup of the current
//! conversation for a session and lazy creation. [`InMemoryConversationManager`] keeps the mapping
//! in process memory (development, demo CLI, tests).

use crate::error::Result;
use crate::types::{ConversationId, SessionId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait ConversationManager: Send + Sync {
    /// Current conversation of the session, or `None` if the session has none yet.
    async fn get_current_conversation(&self, session_id: &SessionId)
        -> Result<Option<ConversationId>>;

    /// Creates a conversation, makes it current for the session, and returns its id.
    async fn create_conversation(&self, session_id: &SessionId) -> Result<ConversationId>;
}

/// In-process registry: one current conversation per session, ids are UUID v4.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationManager {
    current: Arc<RwLock<HashMap<SessionId, ConversationId>>>,
}

impl InMemoryConversationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions that have a current conversation.
    pub async fn len(&self) -> usize {
        self.current.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ConversationManager for InMemoryConversationManager {
    async fn get_current_conversation(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<ConversationId>> {
        Ok(self.current.read().await.get(session_id).cloned())
    }

    async fn create_conversation(&self, session_id: &SessionId) -> Result<ConversationId> {
        let id = ConversationId::new(Uuid::new_v4().to_string());
        self.current
            .write()
            .await
            .insert(session_id.clone(), id.clone());
        Ok(id)
    }
}
