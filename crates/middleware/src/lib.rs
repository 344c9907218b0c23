//! # MemOS middleware
//!
//! LLM hook middleware that gives a chat pipeline long-term memory: memories are injected into
//! the prompt before each LLM call and the exchange is saved to the memory store after it.

pub mod background;
pub mod config;
mod memos_middleware;
pub mod pending;
pub mod session;

#[cfg(test)]
mod test;

pub use background::{BackgroundSaver, SaveJob};
pub use config::MemosConfig;
pub use memos_middleware::{InjectOutcome, MemosMiddleware, SaveOutcome};
pub use pending::PendingPrompts;
pub use session::{resolve_conversation, resolve_session};
