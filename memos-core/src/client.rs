//! Memory store client abstraction.
//!
//! [`MemoryClient`] is the boundary to the memory store (e.g. the MemOS HTTP API). Implementations
//! own transport, auth, rate limiting and retries; callers make exactly one call per operation.

use crate::error::Result;
use crate::types::{ConversationId, Memory, SessionId};
use async_trait::async_trait;

#[async_trait]
pub trait MemoryClient: Send + Sync {
    /// Returns up to `limit` memories relevant to `query`, most relevant first.
    async fn retrieve(
        &self,
        query: &str,
        user_id: &SessionId,
        conversation_id: &ConversationId,
        limit: usize,
    ) -> Result<Vec<Memory>>;

    /// Stores one user/assistant exchange. `Ok(false)` means the store rejected it without a transport error.
    async fn persist(
        &self,
        user_message: &str,
        ai_response: &str,
        user_id: &SessionId,
        conversation_id: &ConversationId,
    ) -> Result<bool>;
}
