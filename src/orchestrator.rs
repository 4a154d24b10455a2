//! Drives one in-flight generation request at a time.
//!
//! Each send spawns a reader task that opens the stream, decodes it and
//! forwards updates over a bounded channel tagged with the session id. The
//! orchestrator applies updates only from the live session; anything tagged
//! with an older id is dropped. Superseding a session flips its cancel flag,
//! so its reader stops at the next chunk boundary and drops the response
//! body.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chat_store::Role;
use futures_util::StreamExt;
use generation_api::{await_or_cancel, decode_stream, CancellationSignal, StreamEvent};
use tokio::sync::mpsc;

use crate::error::ProviderError;
use crate::prompt::{build_request, RequestSettings};
use crate::provider::{BoxFuture, ChunkStream, GenerationProvider};
use crate::store::{ConversationKey, ConversationStore};

pub type SessionId = u64;

/// Updates buffered between reader tasks and the orchestrator.
pub const UPDATE_CHANNEL_CAPACITY: usize = 64;

const FAILURE_PREFIX: &str = "Error: Could not connect to AI service";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Sending,
    Streaming,
    Failed,
}

#[derive(Debug)]
enum Update {
    Opened,
    Event(StreamEvent),
    Completed,
    Failed(ProviderError),
}

#[derive(Debug)]
struct SessionUpdate {
    session_id: SessionId,
    update: Update,
}

#[derive(Debug)]
struct StreamSession {
    id: SessionId,
    target: ConversationKey,
    cancel: CancellationSignal,
    received: String,
    tokens: usize,
}

/// Transcript text recorded for a failed send.
#[must_use]
pub fn failure_message(error: &ProviderError) -> String {
    format!("{FAILURE_PREFIX} ({error}).")
}

pub struct SessionOrchestrator {
    provider: Arc<dyn GenerationProvider>,
    settings: RequestSettings,
    phase: Phase,
    session: Option<StreamSession>,
    next_session_id: SessionId,
    updates_tx: mpsc::Sender<SessionUpdate>,
    updates_rx: mpsc::Receiver<SessionUpdate>,
    last_failure: Option<String>,
}

impl std::fmt::Debug for SessionOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionOrchestrator")
            .field("phase", &self.phase)
            .field("session", &self.session)
            .field("provider", &self.provider.profile())
            .finish_non_exhaustive()
    }
}

impl SessionOrchestrator {
    #[must_use]
    pub fn new(provider: Arc<dyn GenerationProvider>, settings: RequestSettings) -> Self {
        let (updates_tx, updates_rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            provider,
            settings,
            phase: Phase::Idle,
            session: None,
            next_session_id: 1,
            updates_tx,
            updates_rx,
            last_failure: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True while a session is live, from send until completion or failure.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|session| session.id)
    }

    /// Conversation the live session writes into.
    #[must_use]
    pub fn target(&self) -> Option<ConversationKey> {
        self.session.as_ref().map(|session| session.target)
    }

    /// Token text applied so far by the live session.
    #[must_use]
    pub fn streamed_text(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.received.as_str())
    }

    #[must_use]
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    /// Starts a generation for `text` in the active conversation.
    ///
    /// Blank text is ignored. A live session is superseded first, so none of
    /// its later events reach the store.
    pub async fn send(&mut self, store: &mut ConversationStore, text: &str) -> Option<SessionId> {
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!("ignoring blank send");
            return None;
        }

        if let Some(previous) = self.session.take() {
            previous.cancel.store(true, Ordering::Release);
            tracing::info!(session_id = previous.id, "superseded live generation session");
        }

        let target = store.active_key();
        let request = build_request(store.active_index(), store.transcript(), text, &self.settings);
        self.set_phase(Phase::Sending);
        store.append_message(Role::User, text).await;

        let session_id = self.next_session_id;
        self.next_session_id += 1;
        let cancel: CancellationSignal = Arc::new(AtomicBool::new(false));
        let open = self.provider.open_stream(request, Arc::clone(&cancel));
        tokio::spawn(read_session(
            session_id,
            open,
            Arc::clone(&cancel),
            self.updates_tx.clone(),
        ));

        tracing::debug!(session_id, "started generation session");
        self.session = Some(StreamSession {
            id: session_id,
            target,
            cancel,
            received: String::new(),
            tokens: 0,
        });
        Some(session_id)
    }

    /// Stops listening to the live session without starting another.
    pub fn abandon(&mut self) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };

        session.cancel.store(true, Ordering::Release);
        tracing::info!(session_id = session.id, "abandoned generation session");
        self.set_phase(Phase::Idle);
        true
    }

    /// Abandons the live session if its conversation was deleted.
    pub fn release_if_target_gone(&mut self, store: &ConversationStore) -> bool {
        match self.target() {
            Some(target) if !store.contains(target) => self.abandon(),
            _ => false,
        }
    }

    /// Waits for the next update and applies it.
    ///
    /// Returns `false` without waiting when no session is live.
    pub async fn pump(&mut self, store: &mut ConversationStore) -> bool {
        if self.session.is_none() {
            return false;
        }

        match self.updates_rx.recv().await {
            Some(update) => {
                self.apply(store, update).await;
                true
            }
            None => false,
        }
    }

    /// Applies every update already delivered, without waiting.
    ///
    /// Returns the number of updates that belonged to the live session.
    pub async fn drain_pending(&mut self, store: &mut ConversationStore) -> usize {
        let mut applied = 0usize;
        while let Ok(update) = self.updates_rx.try_recv() {
            if self.apply(store, update).await {
                applied += 1;
            }
        }
        applied
    }

    /// Pumps until no session is live.
    pub async fn run_until_idle(&mut self, store: &mut ConversationStore) {
        while self.pump(store).await {}
    }

    async fn apply(&mut self, store: &mut ConversationStore, message: SessionUpdate) -> bool {
        let SessionUpdate { session_id, update } = message;
        let Some(target) = self
            .session
            .as_ref()
            .filter(|session| session.id == session_id)
            .map(|session| session.target)
        else {
            tracing::debug!(session_id, "discarding update from stale session");
            return false;
        };

        match update {
            Update::Opened => {
                self.set_phase(Phase::Streaming);
                if !store.append_message_to(target, Role::Assistant, "").await {
                    self.abandon_missing_target(session_id);
                }
            }
            Update::Event(StreamEvent::Token { text }) => {
                if let Some(session) = self.session.as_mut() {
                    session.received.push_str(&text);
                    session.tokens += 1;
                }
                if !store.append_to_last_message_of(target, &text).await {
                    self.abandon_missing_target(session_id);
                }
            }
            Update::Event(StreamEvent::DecodeError { line, message }) => {
                tracing::warn!(session_id, %line, %message, "skipping undecodable stream line");
            }
            Update::Completed => {
                let tokens = self.session.take().map_or(0, |session| session.tokens);
                tracing::info!(session_id, tokens, "generation session completed");
                self.set_phase(Phase::Idle);
            }
            Update::Failed(error) => {
                self.session = None;
                self.set_phase(Phase::Failed);
                tracing::warn!(session_id, %error, "generation session failed");

                let text = failure_message(&error);
                if !store.append_message_to(target, Role::System, text.clone()).await {
                    tracing::debug!(session_id, "failed session's conversation no longer exists");
                }
                self.last_failure = Some(text);
                self.set_phase(Phase::Idle);
            }
        }
        true
    }

    fn abandon_missing_target(&mut self, session_id: SessionId) {
        tracing::info!(session_id, "target conversation was deleted");
        self.abandon();
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            tracing::debug!(from = ?self.phase, to = ?phase, "session phase changed");
            self.phase = phase;
        }
    }
}

async fn read_session(
    session_id: SessionId,
    open: BoxFuture<'static, Result<ChunkStream, ProviderError>>,
    cancel: CancellationSignal,
    updates: mpsc::Sender<SessionUpdate>,
) {
    let terminal = match forward_stream(session_id, open, &cancel, &updates).await {
        Ok(()) => Update::Completed,
        Err(ProviderError::Cancelled) => {
            tracing::debug!(session_id, "reader stopped; response body dropped");
            return;
        }
        Err(error) => Update::Failed(error),
    };

    if deliver(&updates, session_id, terminal, &cancel).await.is_err() {
        tracing::debug!(session_id, "terminal update not delivered");
    }
}

async fn forward_stream(
    session_id: SessionId,
    open: BoxFuture<'static, Result<ChunkStream, ProviderError>>,
    cancel: &CancellationSignal,
    updates: &mpsc::Sender<SessionUpdate>,
) -> Result<(), ProviderError> {
    let chunks = await_or_cancel(open, Some(cancel)).await??;
    deliver(updates, session_id, Update::Opened, cancel).await?;

    let mut events = Box::pin(decode_stream(chunks));
    while let Some(event) = await_or_cancel(events.next(), Some(cancel)).await? {
        deliver(updates, session_id, Update::Event(event?), cancel).await?;
    }
    Ok(())
}

async fn deliver(
    updates: &mpsc::Sender<SessionUpdate>,
    session_id: SessionId,
    update: Update,
    cancel: &CancellationSignal,
) -> Result<(), ProviderError> {
    await_or_cancel(updates.send(SessionUpdate { session_id, update }), Some(cancel))
        .await?
        .map_err(|_| ProviderError::Cancelled)
}
