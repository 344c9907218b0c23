//! Pending prompts: the original (un-augmented) prompt of each in-flight request, keyed by session.
//!
//! Written by the request hook, taken (read-once) by the response hook. One entry per session;
//! a newer request for the same session replaces the older entry (last request wins). Entries
//! whose response never arrives expire after the configured TTL.

use dashmap::DashMap;
use memos_core::SessionId;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
struct PendingPrompt {
    original: String,
    stored_at: Instant,
}

/// Per-session store of original prompts. Insert and take are atomic per key, so exchanges of
/// different sessions never see each other's entries.
#[derive(Debug)]
pub struct PendingPrompts {
    entries: DashMap<SessionId, PendingPrompt>,
    ttl: Duration,
}

impl PendingPrompts {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    fn is_expired(&self, entry: &PendingPrompt) -> bool {
        entry.stored_at.elapsed() >= self.ttl
    }

    /// Stores the original prompt for the session. Returns the unexpired prompt it replaced, if any.
    pub fn insert(&self, session_id: SessionId, original: String) -> Option<String> {
        self.purge_expired();
        let replaced = self.entries.insert(
            session_id,
            PendingPrompt {
                original,
                stored_at: Instant::now(),
            },
        );
        replaced
            .filter(|p| !self.is_expired(p))
            .map(|p| p.original)
    }

    /// Removes and returns the session's original prompt; expired entries are removed and ignored.
    pub fn take(&self, session_id: &SessionId) -> Option<String> {
        let (_, entry) = self.entries.remove(session_id)?;
        if self.is_expired(&entry) {
            debug!(session_id = %session_id, "Dropped expired pending prompt");
            return None;
        }
        Some(entry.original)
    }

    /// Drops every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            debug!(purged, "Purged expired pending prompts");
        }
        purged
    }

    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.entries.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
