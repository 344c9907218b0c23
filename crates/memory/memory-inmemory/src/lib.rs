//! # In-Memory Memory Client
//!
//! This crate provides an in-process implementation of [`memos_core::MemoryClient`].
//!
//! ## InMemoryMemoryClient
//!
//! Keeps every persisted exchange per user and answers `retrieve` by keyword overlap.
//!
//! **Advantages**:
//! - No network, no credentials
//! - Deterministic, suitable for tests and the demo CLI
//!
//! **Limitations**:
//! - Data is lost on restart
//! - Lexical overlap only (ASCII words and individual CJK ideographs), no embeddings
//!
//! ## Thread Safety
//!
//! The store uses `Arc<RwLock<>>` to ensure thread-safe concurrent access.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use memos_core::{ConversationId, Memory, MemoryClient, Result, SessionId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// One persisted user/assistant exchange.
#[derive(Debug, Clone)]
struct StoredExchange {
    id: Uuid,
    conversation_id: ConversationId,
    content: String,
    terms: HashSet<String>,
    created_at: DateTime<Utc>,
}

/// In-process memory store keyed by user (session) id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMemoryClient {
    exchanges: Arc<RwLock<HashMap<SessionId, Vec<StoredExchange>>>>,
}

impl InMemoryMemoryClient {
    /// Creates a new empty client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of exchanges stored for all users.
    pub async fn len(&self) -> usize {
        self.exchanges.read().await.values().map(Vec::len).sum()
    }

    /// Returns true if nothing has been persisted.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of exchanges stored under one conversation of a user.
    pub async fn conversation_len(
        &self,
        user_id: &SessionId,
        conversation_id: &ConversationId,
    ) -> usize {
        self.exchanges
            .read()
            .await
            .get(user_id)
            .map(|list| {
                list.iter()
                    .filter(|e| &e.conversation_id == conversation_id)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Clears all exchanges.
    pub async fn clear(&self) {
        self.exchanges.write().await.clear();
    }

    /// Splits text into lowercase ASCII alphanumeric words and single CJK ideographs.
    fn terms(text: &str) -> HashSet<String> {
        let mut terms = HashSet::new();
        let mut word = String::new();
        for c in text.chars() {
            if c.is_ascii_alphanumeric() {
                word.push(c.to_ascii_lowercase());
                continue;
            }
            if !word.is_empty() {
                terms.insert(std::mem::take(&mut word));
            }
            if ('\u{4e00}'..='\u{9fff}').contains(&c) {
                terms.insert(c.to_string());
            }
        }
        if !word.is_empty() {
            terms.insert(word);
        }
        terms
    }

    /// Overlap score in [0, 1]: shared terms over query terms.
    fn overlap(query: &HashSet<String>, terms: &HashSet<String>) -> f32 {
        if query.is_empty() {
            return 0.0;
        }
        let shared = query.intersection(terms).count();
        shared as f32 / query.len() as f32
    }
}

#[async_trait]
impl MemoryClient for InMemoryMemoryClient {
    async fn retrieve(
        &self,
        query: &str,
        user_id: &SessionId,
        conversation_id: &ConversationId,
        limit: usize,
    ) -> Result<Vec<Memory>> {
        info!(
            user_id = %user_id,
            conversation_id = %conversation_id,
            limit,
            "Querying in-memory memory client"
        );
        let query_terms = Self::terms(query);
        let exchanges = self.exchanges.read().await;
        let Some(list) = exchanges.get(user_id) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<(f32, &StoredExchange)> = list
            .iter()
            .map(|e| (Self::overlap(&query_terms, &e.terms), e))
            .filter(|(score, _)| *score > 0.0)
            .collect();
        // Highest score first; ties go to the newest exchange.
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.1.created_at.cmp(&a.1.created_at))
        });

        let results: Vec<Memory> = scored
            .into_iter()
            .take(limit)
            .map(|(score, e)| Memory {
                id: Some(e.id.to_string()),
                content: e.content.clone(),
                score: Some(score),
                created_at: Some(e.created_at),
            })
            .collect();

        info!(
            user_id = %user_id,
            count = results.len(),
            "In-memory memory client retrieve returned"
        );
        Ok(results)
    }

    async fn persist(
        &self,
        user_message: &str,
        ai_response: &str,
        user_id: &SessionId,
        conversation_id: &ConversationId,
    ) -> Result<bool> {
        let content = format!("User: {}\nAssistant: {}", user_message, ai_response);
        let exchange = StoredExchange {
            id: Uuid::new_v4(),
            conversation_id: conversation_id.clone(),
            terms: Self::terms(&content),
            content,
            created_at: Utc::now(),
        };
        info!(
            id = %exchange.id,
            user_id = %user_id,
            conversation_id = %conversation_id,
            "Writing exchange to in-memory memory client"
        );
        self.exchanges
            .write()
            .await
            .entry(user_id.clone())
            .or_default()
            .push(exchange);
        Ok(true)
    }
}
