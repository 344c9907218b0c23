//! Core types: message origin, session and conversation ids, host request/response, and memory records.

use crate::error::{MemosError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unified message origin of an inbound event: `platform:message_type:session`.
///
/// `session` is the platform-specific addressing (user id for private chats, group id for groups)
/// and may itself contain `:`; only the first two separators split fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnifiedMsgOrigin {
    pub platform: String,
    pub message_type: String,
    pub session: String,
}

impl UnifiedMsgOrigin {
    pub fn new(
        platform: impl Into<String>,
        message_type: impl Into<String>,
        session: impl Into<String>,
    ) -> Self {
        Self {
            platform: platform.into(),
            message_type: message_type.into(),
            session: session.into(),
        }
    }
}

impl fmt::Display for UnifiedMsgOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.platform, self.message_type, self.session)
    }
}

impl FromStr for UnifiedMsgOrigin {
    type Err = MemosError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(platform), Some(message_type), Some(session))
                if !platform.is_empty() && !message_type.is_empty() && !session.is_empty() =>
            {
                Ok(Self::new(platform, message_type, session))
            }
            _ => Err(MemosError::InvalidOrigin(s.to_string())),
        }
    }
}

/// Stable session identity; used as the memory store's `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&UnifiedMsgOrigin> for SessionId {
    fn from(origin: &UnifiedMsgOrigin) -> Self {
        Self(origin.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Conversation identity scoped to a session, issued by the host's conversation registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Degraded scope used when the registry is unavailable: the session id itself.
    pub fn from_session(session_id: &SessionId) -> Self {
        Self(session_id.as_str().to_string())
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inbound event descriptor handed to both hooks by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEvent {
    pub unified_msg_origin: UnifiedMsgOrigin,
    /// Raw text of the user's message as received by the host; fallback for persistence.
    pub message_str: String,
}

impl MessageEvent {
    pub fn new(unified_msg_origin: UnifiedMsgOrigin, message_str: impl Into<String>) -> Self {
        Self {
            unified_msg_origin,
            message_str: message_str.into(),
        }
    }
}

/// Outgoing LLM request; `prompt` is the only field the middleware mutates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRequest {
    pub prompt: String,
    /// Target model name, if the host knows it (e.g. `qwen-max`, `gemini-1.5-pro`).
    pub model: Option<String>,
}

impl ProviderRequest {
    pub fn new(prompt: impl Into<String>, model: Option<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model,
        }
    }
}

/// Completed LLM response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub completion_text: String,
}

impl LlmResponse {
    pub fn new(completion_text: impl Into<String>) -> Self {
        Self {
            completion_text: completion_text.into(),
        }
    }
}

/// A memory record returned by the store. Ordering and relevance are decided by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: Option<String>,
    pub content: String,
    /// Relevance score, when the store provides one.
    pub score: Option<f32>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Memory {
    /// Creates a memory with only content set.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: None,
            content: content.into(),
            score: None,
            created_at: None,
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }
}

/// Host-facing LLM hook: runs around every LLM call. Implementations never fail the host's
/// request; errors are handled (and logged) inside the hook.
#[async_trait]
pub trait LlmHook: Send + Sync {
    /// Runs before the request is sent; may rewrite `request.prompt`.
    async fn on_llm_request(&self, _event: &MessageEvent, _request: &mut ProviderRequest) {}

    /// Runs after the response arrives. `request` is the in-flight request of this exchange when
    /// the host still holds it, so the hook can roll back prompt changes before history is saved.
    async fn on_llm_response(
        &self,
        _event: &MessageEvent,
        _response: &LlmResponse,
        _request: Option<&mut ProviderRequest>,
    ) {
    }
}
