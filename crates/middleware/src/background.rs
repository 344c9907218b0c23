//! Background memory saving.
//!
//! Each save runs as its own tokio task with exactly one `persist` attempt. A completion callback
//! ([`on_save_complete`]) is the only observer of the result: it logs success, rejection, errors,
//! panics and cancellation, and never propagates anything to the hook that scheduled the save.

use memos_core::{ConversationId, MemoryClient, Result, SessionId};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::{AbortHandle, JoinError, JoinSet};
use tracing::{error, info, warn};

/// Owned inputs of one background save; the task reads nothing else.
#[derive(Debug, Clone)]
pub struct SaveJob {
    pub user_message: String,
    pub ai_response: String,
    pub session_id: SessionId,
    pub conversation_id: ConversationId,
}

/// Aborts the persist task when the observing task is dropped or aborted.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Tracks outstanding background saves so they can be drained on shutdown.
#[derive(Debug, Default)]
pub struct BackgroundSaver {
    tasks: Mutex<JoinSet<()>>,
}

impl BackgroundSaver {
    pub fn new() -> Self {
        Self::default()
    }

    fn tasks(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Spawns the save and returns immediately. Must be called from within a tokio runtime.
    pub fn spawn(&self, client: Arc<dyn MemoryClient>, job: SaveJob) {
        let session_id = job.session_id.clone();
        let persist = tokio::spawn(async move {
            client
                .persist(
                    &job.user_message,
                    &job.ai_response,
                    &job.session_id,
                    &job.conversation_id,
                )
                .await
        });
        let guard = AbortOnDrop(persist.abort_handle());

        let mut tasks = self.tasks();
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            let outcome = persist.await;
            drop(guard);
            on_save_complete(&session_id, outcome);
        });
    }

    /// Number of saves not yet reaped (running, or finished since the last spawn).
    pub fn in_flight(&self) -> usize {
        self.tasks().len()
    }

    /// Waits up to `grace` for outstanding saves, then aborts the rest. Returns how many were aborted.
    pub async fn shutdown(&self, grace: Duration) -> usize {
        let mut tasks = std::mem::take(&mut *self.tasks());
        if tasks.is_empty() {
            return 0;
        }
        info!(outstanding = tasks.len(), "step: waiting for background memory saves");

        let drained = tokio::time::timeout(grace, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;
        if drained.is_ok() {
            info!("step: background memory saves drained");
            return 0;
        }

        let aborted = tasks.len();
        tasks.abort_all();
        while tasks.join_next().await.is_some() {}
        warn!(aborted, "Background memory saves aborted at shutdown");
        aborted
    }
}

/// Completion callback of a background save: logs the outcome, never re-raises.
pub(crate) fn on_save_complete(
    session_id: &SessionId,
    outcome: std::result::Result<Result<bool>, JoinError>,
) {
    match outcome {
        Ok(Ok(true)) => info!(session_id = %session_id, "Saved conversation to memory store"),
        Ok(Ok(false)) => warn!(session_id = %session_id, "Memory store rejected conversation save"),
        Ok(Err(e)) => error!(
            session_id = %session_id,
            error = %e,
            "Background memory save failed"
        ),
        Err(e) if e.is_cancelled() => info!(
            session_id = %session_id,
            "Background memory save cancelled"
        ),
        Err(e) => error!(
            session_id = %session_id,
            error = %e,
            "Background memory save task panicked"
        ),
    }
}
