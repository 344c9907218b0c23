//! Shared test helpers: mock MemoryClient and ConversationManager, event builders.
//!
//! - `MockMemoryClient` counts retrieve / persist calls; the returned memories and failure mode are
//!   configurable.
//! - `FailingConversationManager` always errors, to exercise the session id fallback scope.

#![allow(dead_code)]

use async_trait::async_trait;
use memos_core::{
    ConversationId, ConversationManager, Memory, MemoryClient, MemosError, MessageEvent, Result,
    SessionId, UnifiedMsgOrigin,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// How `persist` behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistMode {
    Succeed,
    Reject,
    Fail,
    Panic,
}

/// One recorded `persist` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistCall {
    pub user_message: String,
    pub ai_response: String,
    pub user_id: String,
    pub conversation_id: String,
}

#[derive(Debug)]
pub struct MockMemoryClient {
    memories: Vec<Memory>,
    fail_retrieve: bool,
    persist_mode: PersistMode,
    retrieve_calls: AtomicUsize,
    persist_calls: AtomicUsize,
    /// (query, user_id, conversation_id, limit) of every retrieve call.
    pub retrieved: Mutex<Vec<(String, String, String, usize)>>,
    pub persisted: Mutex<Vec<PersistCall>>,
}

impl MockMemoryClient {
    pub fn with_memories(memories: Vec<Memory>) -> Self {
        Self {
            memories,
            fail_retrieve: false,
            persist_mode: PersistMode::Succeed,
            retrieve_calls: AtomicUsize::new(0),
            persist_calls: AtomicUsize::new(0),
            retrieved: Mutex::new(Vec::new()),
            persisted: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::with_memories(Vec::new())
    }

    pub fn failing_retrieve(mut self) -> Self {
        self.fail_retrieve = true;
        self
    }

    pub fn persist_mode(mut self, mode: PersistMode) -> Self {
        self.persist_mode = mode;
        self
    }

    pub fn retrieve_calls(&self) -> usize {
        self.retrieve_calls.load(Ordering::SeqCst)
    }

    pub fn persist_calls(&self) -> usize {
        self.persist_calls.load(Ordering::SeqCst)
    }

    pub fn persisted(&self) -> Vec<PersistCall> {
        self.persisted.lock().unwrap().clone()
    }

    pub fn last_retrieve(&self) -> Option<(String, String, String, usize)> {
        self.retrieved.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl MemoryClient for MockMemoryClient {
    async fn retrieve(
        &self,
        query: &str,
        user_id: &SessionId,
        conversation_id: &ConversationId,
        limit: usize,
    ) -> Result<Vec<Memory>> {
        self.retrieve_calls.fetch_add(1, Ordering::SeqCst);
        self.retrieved.lock().unwrap().push((
            query.to_string(),
            user_id.to_string(),
            conversation_id.to_string(),
            limit,
        ));
        if self.fail_retrieve {
            return Err(MemosError::Retrieval("memory store unreachable".to_string()));
        }
        Ok(self.memories.iter().take(limit).cloned().collect())
    }

    async fn persist(
        &self,
        user_message: &str,
        ai_response: &str,
        user_id: &SessionId,
        conversation_id: &ConversationId,
    ) -> Result<bool> {
        self.persist_calls.fetch_add(1, Ordering::SeqCst);
        self.persisted.lock().unwrap().push(PersistCall {
            user_message: user_message.to_string(),
            ai_response: ai_response.to_string(),
            user_id: user_id.to_string(),
            conversation_id: conversation_id.to_string(),
        });
        match self.persist_mode {
            PersistMode::Succeed => Ok(true),
            PersistMode::Reject => Ok(false),
            PersistMode::Fail => Err(MemosError::Persistence("HTTP 500".to_string())),
            PersistMode::Panic => panic!("persist exploded"),
        }
    }
}

/// Registry that is always down.
#[derive(Debug, Default)]
pub struct FailingConversationManager;

#[async_trait]
impl ConversationManager for FailingConversationManager {
    async fn get_current_conversation(
        &self,
        _session_id: &SessionId,
    ) -> Result<Option<ConversationId>> {
        Err(MemosError::Conversation("registry unavailable".to_string()))
    }

    async fn create_conversation(&self, _session_id: &SessionId) -> Result<ConversationId> {
        Err(MemosError::Conversation("registry unavailable".to_string()))
    }
}

/// Event for a private chat with the given user id.
pub fn private_event(user: &str, message: &str) -> MessageEvent {
    MessageEvent::new(
        UnifiedMsgOrigin::new("telegram", "FriendMessage", user),
        message,
    )
}

pub fn as_client(client: &Arc<MockMemoryClient>) -> Arc<dyn MemoryClient> {
    client.clone()
}
