//! Session and conversation resolution for both hooks of an exchange.

use memos_core::{ConversationId, ConversationManager, MessageEvent, Result, SessionId};
use tracing::{debug, info};

/// Session id of an event: its unified message origin (`platform:message_type:session`).
/// Pure; the request and response hooks of one exchange always get the same id.
pub fn resolve_session(event: &MessageEvent) -> SessionId {
    SessionId::from(&event.unified_msg_origin)
}

/// Current conversation of the session, created in the registry when the session has none.
/// Registry errors are returned to the caller.
pub async fn resolve_conversation(
    manager: &dyn ConversationManager,
    session_id: &SessionId,
) -> Result<ConversationId> {
    if let Some(conversation_id) = manager.get_current_conversation(session_id).await? {
        debug!(
            session_id = %session_id,
            conversation_id = %conversation_id,
            "Using current conversation"
        );
        return Ok(conversation_id);
    }

    let conversation_id = manager.create_conversation(session_id).await?;
    info!(
        session_id = %session_id,
        conversation_id = %conversation_id,
        "Created new conversation for session"
    );
    Ok(conversation_id)
}
