//! # memos-core
//!
//! Core types and traits for the MemOS memory integration: host-side [`MessageEvent`],
//! [`ProviderRequest`] and [`LlmResponse`], the [`MemoryClient`] and [`ConversationManager`]
//! collaborator traits, errors, and tracing initialization. Transport-agnostic; used by
//! memos-middleware, memory-inmemory and memos-cli.

pub mod client;
pub mod conversation;
pub mod error;
pub mod logger;
pub mod types;

pub use client::MemoryClient;
pub use conversation::{ConversationManager, InMemoryConversationManager};
pub use error::{MemosError, Result};
pub use logger::init_tracing;
pub use types::{
    ConversationId, LlmHook, LlmResponse, Memory, MessageEvent, ProviderRequest, SessionId,
    UnifiedMsgOrigin,
};
