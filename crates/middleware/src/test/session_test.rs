//! Unit tests for session id resolution and lazy conversation creation.

use crate::session::{resolve_conversation, resolve_session};
use memos_core::{
    ConversationManager, InMemoryConversationManager, MessageEvent, SessionId, UnifiedMsgOrigin,
};

fn event(platform: &str, message_type: &str, session: &str, text: &str) -> MessageEvent {
    MessageEvent::new(UnifiedMsgOrigin::new(platform, message_type, session), text)
}

#[test]
fn test_resolve_session_is_unified_origin() {
    let e = event("aiocqhttp", "GroupMessage", "123456", "hi");
    assert_eq!(resolve_session(&e).as_str(), "aiocqhttp:GroupMessage:123456");
}

#[test]
fn test_resolve_session_ignores_message_text() {
    let a = event("telegram", "FriendMessage", "1", "first");
    let b = event("telegram", "FriendMessage", "1", "second");
    assert_eq!(resolve_session(&a), resolve_session(&b));
}

#[test]
fn test_resolve_session_distinguishes_message_type() {
    let private = event("telegram", "FriendMessage", "1", "hi");
    let group = event("telegram", "GroupMessage", "1", "hi");
    assert_ne!(resolve_session(&private), resolve_session(&group));
}

#[tokio::test]
async fn test_resolve_conversation_creates_once() {
    let manager = InMemoryConversationManager::new();
    let session = SessionId::new("telegram:FriendMessage:1");

    let first = resolve_conversation(&manager, &session).await.unwrap();
    let second = resolve_conversation(&manager, &session).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(manager.len().await, 1);
}

#[tokio::test]
async fn test_resolve_conversation_uses_existing() {
    let manager = InMemoryConversationManager::new();
    let session = SessionId::new("telegram:FriendMessage:1");
    let existing = manager.create_conversation(&session).await.unwrap();

    let resolved = resolve_conversation(&manager, &session).await.unwrap();

    assert_eq!(resolved, existing);
}
