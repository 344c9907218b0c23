//! # MemOS Middleware
//!
//! Adds long-term memory to LLM calls.
//!
//! ## MemosMiddleware
//!
//! - **Request hook** ([`MemosMiddleware::inject_memories`]): remembers the original prompt for the
//!   session, retrieves memories for it, and rewrites the prompt with the formatted memories.
//! - **Response hook** ([`MemosMiddleware::save_memories`]): takes the original prompt back,
//!   restores it into the in-flight request so the host saves a clean history, and schedules a
//!   background save of the exchange.
//!
//! Without a memory client (no API key, invalid config, or the client failed to build) both hooks
//! are no-ops.
//! Neither hook returns an error to the host; failures are logged with session id and phase.

use crate::background::{BackgroundSaver, SaveJob};
use crate::config::MemosConfig;
use crate::pending::PendingPrompts;
use crate::session::{resolve_conversation, resolve_session};
use async_trait::async_trait;
use memos_core::{
    ConversationId, ConversationManager, LlmHook, LlmResponse, MemoryClient, MessageEvent,
    ProviderRequest, Result, SessionId,
};
use prompt::{detect_model_type, format_memory_prompt, resolve_language};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Result of the request hook, for callers that want to observe it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectOutcome {
    /// Degraded mode; nothing was done.
    Disabled,
    /// No memories found; prompt unchanged.
    NoMemories,
    /// Prompt rewritten with `count` memories.
    Injected { count: usize },
    /// Retrieval failed; prompt unchanged.
    Failed,
}

/// Result of the response hook. Background save failures never change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Degraded mode; nothing was done.
    Disabled,
    /// Missing user message or AI response; nothing scheduled.
    NothingToSave,
    /// Background save spawned.
    Scheduled,
}

/// Middleware that injects memories before LLM requests and saves exchanges after responses.
pub struct MemosMiddleware {
    client: Option<Arc<dyn MemoryClient>>,
    conversations: Arc<dyn ConversationManager>,
    /// pub(crate) for unit tests in src/test.
    pub(crate) config: MemosConfig,
    pub(crate) pending: PendingPrompts,
    saver: BackgroundSaver,
}

impl MemosMiddleware {
    /// Creates the middleware. `client: None` or a config that fails
    /// [`MemosConfig::validate`] means degraded mode.
    pub fn new(
        config: MemosConfig,
        client: Option<Arc<dyn MemoryClient>>,
        conversations: Arc<dyn ConversationManager>,
    ) -> Self {
        let client = match config.validate() {
            Ok(()) => client,
            Err(e) => {
                error!(
                    error = %e,
                    "Invalid MemOS config, memory injection and saving are disabled"
                );
                return Self::assemble(config, None, conversations);
            }
        };
        if client.is_none() {
            warn!("Memory client not initialized, memory injection and saving are disabled");
        }
        Self::assemble(config, client, conversations)
    }

    /// Builds the memory client with `connect` when the config is valid and an API key is
    /// configured. An invalid config, a missing key or a `connect` error puts the middleware in
    /// degraded mode; it is reported here once.
    pub fn from_config<F>(
        config: MemosConfig,
        conversations: Arc<dyn ConversationManager>,
        connect: F,
    ) -> Self
    where
        F: FnOnce(&MemosConfig) -> Result<Arc<dyn MemoryClient>>,
    {
        if let Err(e) = config.validate() {
            error!(
                error = %e,
                "Invalid MemOS config, memory injection and saving are disabled"
            );
            return Self::assemble(config, None, conversations);
        }
        let client = if config.api_key.is_none() {
            warn!("MemOS API key not configured");
            None
        } else {
            match connect(&config) {
                Ok(client) => Some(client),
                Err(e) => {
                    error!(error = %e, "Failed to initialize MemOS memory client");
                    None
                }
            }
        };
        Self::new(config, client, conversations)
    }

    fn assemble(
        config: MemosConfig,
        client: Option<Arc<dyn MemoryClient>>,
        conversations: Arc<dyn ConversationManager>,
    ) -> Self {
        if client.is_some() {
            info!(
                base_url = %config.base_url,
                memory_limit = config.memory_limit,
                prompt_language = %config.prompt_language,
                "MemOS middleware loaded"
            );
        }
        let pending = PendingPrompts::new(config.pending_ttl());
        Self {
            client,
            conversations,
            config,
            pending,
            saver: BackgroundSaver::new(),
        }
    }

    /// False in degraded mode.
    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    pub fn config(&self) -> &MemosConfig {
        &self.config
    }

    /// Number of requests whose response has not been handled yet.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of background saves not yet reaped.
    pub fn saves_in_flight(&self) -> usize {
        self.saver.in_flight()
    }

    /// Waits up to `grace` for background saves, then aborts the rest.
    pub async fn shutdown(&self, grace: Duration) -> usize {
        self.saver.shutdown(grace).await
    }

    /// Resolves the conversation; on registry failure falls back to the session id as scope.
    async fn conversation_or_session(&self, session_id: &SessionId, phase: &str) -> ConversationId {
        match resolve_conversation(self.conversations.as_ref(), session_id).await {
            Ok(conversation_id) => conversation_id,
            Err(e) => {
                error!(
                    session_id = %session_id,
                    phase,
                    error = %e,
                    "Conversation resolution failed, using session id as conversation scope"
                );
                ConversationId::from_session(session_id)
            }
        }
    }

    /// Request hook: retrieves memories for the prompt and injects them.
    #[instrument(skip(self, event, request), fields(origin = %event.unified_msg_origin))]
    pub async fn inject_memories(
        &self,
        event: &MessageEvent,
        request: &mut ProviderRequest,
    ) -> InjectOutcome {
        let Some(client) = self.client.as_ref() else {
            debug!("step: inject_memories skipped (memory client not initialized)");
            return InjectOutcome::Disabled;
        };

        let session_id = resolve_session(event);
        let conversation_id = self.conversation_or_session(&session_id, "inject_memories").await;
        info!(
            session_id = %session_id,
            conversation_id = %conversation_id,
            "step: inject_memories started"
        );

        let original = request.prompt.clone();
        if self
            .pending
            .insert(session_id.clone(), original.clone())
            .is_some()
        {
            debug!(
                session_id = %session_id,
                "Replaced unconsumed pending prompt of an earlier request"
            );
        }
        debug!(session_id = %session_id, prompt_len = original.len(), "Stored original prompt");

        let memories = match client
            .retrieve(&original, &session_id, &conversation_id, self.config.memory_limit)
            .await
        {
            Ok(memories) => memories,
            Err(e) => {
                error!(
                    session_id = %session_id,
                    phase = "inject_memories",
                    error = %e,
                    "Memory retrieval failed, sending request without memories"
                );
                return InjectOutcome::Failed;
            }
        };

        if memories.is_empty() {
            info!(session_id = %session_id, "step: inject_memories done (no relevant memories)");
            return InjectOutcome::NoMemories;
        }

        let language = resolve_language(&self.config.prompt_language, &original);
        let model_type = detect_model_type(request.model.as_deref());
        info!(
            session_id = %session_id,
            language = %language,
            model_type = %model_type,
            "Formatting memory prompt"
        );

        request.prompt = format_memory_prompt(&original, &memories, &language, model_type);
        debug!(session_id = %session_id, prompt = %request.prompt, "Prompt after memory injection");
        info!(
            session_id = %session_id,
            count = memories.len(),
            original_len = original.len(),
            injected_len = request.prompt.len(),
            "step: inject_memories done"
        );
        InjectOutcome::Injected {
            count: memories.len(),
        }
    }

    /// Response hook: restores the original prompt into `request` and schedules a background save.
    #[instrument(skip(self, event, response, request), fields(origin = %event.unified_msg_origin))]
    pub async fn save_memories(
        &self,
        event: &MessageEvent,
        response: &LlmResponse,
        request: Option<&mut ProviderRequest>,
    ) -> SaveOutcome {
        let Some(client) = self.client.as_ref() else {
            debug!("step: save_memories skipped (memory client not initialized)");
            return SaveOutcome::Disabled;
        };

        let session_id = resolve_session(event);
        let conversation_id = self.conversation_or_session(&session_id, "save_memories").await;
        info!(
            session_id = %session_id,
            conversation_id = %conversation_id,
            "step: save_memories started"
        );

        let mut user_message = String::new();
        match self.pending.take(&session_id) {
            Some(original) => {
                match request {
                    Some(request) => {
                        request.prompt = original.clone();
                        debug!(
                            session_id = %session_id,
                            prompt_len = original.len(),
                            "Restored original prompt into in-flight request"
                        );
                    }
                    None => warn!(
                        session_id = %session_id,
                        "No in-flight request handle, skipping prompt restoration"
                    ),
                }
                user_message = original;
            }
            None => warn!(
                session_id = %session_id,
                "No pending prompt for session, falling back to event message"
            ),
        }
        if user_message.is_empty() {
            user_message = event.message_str.clone();
        }
        if user_message.is_empty() {
            warn!(session_id = %session_id, "No user message found, skipping memory save");
            return SaveOutcome::NothingToSave;
        }

        let ai_response = response.completion_text.clone();
        if ai_response.is_empty() {
            warn!(session_id = %session_id, "No AI response content, skipping memory save");
            return SaveOutcome::NothingToSave;
        }

        debug!(
            session_id = %session_id,
            user_message_len = user_message.len(),
            ai_response_len = ai_response.len(),
            "Scheduling background memory save"
        );
        self.saver.spawn(
            client.clone(),
            SaveJob {
                user_message,
                ai_response,
                session_id: session_id.clone(),
                conversation_id,
            },
        );
        info!(session_id = %session_id, "step: save_memories done (save scheduled)");
        SaveOutcome::Scheduled
    }
}

#[async_trait]
impl LlmHook for MemosMiddleware {
    async fn on_llm_request(&self, event: &MessageEvent, request: &mut ProviderRequest) {
        self.inject_memories(event, request).await;
    }

    async fn on_llm_response(
        &self,
        event: &MessageEvent,
        response: &LlmResponse,
        request: Option<&mut ProviderRequest>,
    ) {
        self.save_memories(event, response, request).await;
    }
}
