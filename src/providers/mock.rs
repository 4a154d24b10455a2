use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use futures_util::stream;
use generation_api::{CancellationSignal, GenerateRequest};
use tokio::sync::mpsc;

use super::SCRIPTED_PROVIDER_ID;
use crate::error::ProviderError;
use crate::provider::{BoxFuture, ChunkStream, GenerationProvider, ProviderProfile};

type ChunkSender = mpsc::UnboundedSender<Result<Vec<u8>, ProviderError>>;
type ChunkReceiver = mpsc::UnboundedReceiver<Result<Vec<u8>, ProviderError>>;

/// Encodes one token as a wire event line.
#[must_use]
pub fn sse_event(token: &str) -> Vec<u8> {
    format!("data: {}\n\n", serde_json::json!({ "token": token })).into_bytes()
}

/// Outcome of one `open_stream` call on a [`ScriptedProvider`].
#[derive(Debug)]
pub enum ScriptedResponse {
    /// Stream these raw chunks, then close.
    Chunks(Vec<Vec<u8>>),
    /// Fail the open as a non-success status would.
    Reject { status: u16, message: String },
    /// Fail the open as a refused connection would.
    ConnectionError(String),
    /// Chunks arrive as the paired [`ManualStream`] pushes them.
    Manual(ChunkReceiver),
}

impl ScriptedResponse {
    /// One chunk per token.
    #[must_use]
    pub fn tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Self {
        Self::Chunks(tokens.into_iter().map(sse_event).collect())
    }

    #[must_use]
    pub fn reject(status: u16, message: impl Into<String>) -> Self {
        Self::Reject {
            status,
            message: message.into(),
        }
    }
}

/// Test-side handle feeding a [`ScriptedResponse::Manual`] stream.
///
/// Dropping it (or calling [`ManualStream::finish`]) closes the stream.
#[derive(Debug)]
pub struct ManualStream {
    sender: ChunkSender,
}

impl ManualStream {
    #[must_use]
    pub fn channel() -> (Self, ScriptedResponse) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, ScriptedResponse::Manual(receiver))
    }

    /// Returns `false` once the reader has dropped the stream.
    pub fn push(&self, chunk: impl Into<Vec<u8>>) -> bool {
        self.sender.send(Ok(chunk.into())).is_ok()
    }

    pub fn push_token(&self, token: &str) -> bool {
        self.push(sse_event(token))
    }

    /// Drops the connection mid-body.
    pub fn fail(&self, message: impl Into<String>) -> bool {
        self.sender
            .send(Err(ProviderError::transport(message)))
            .is_ok()
    }

    /// Whether the reading side has gone away.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    pub fn finish(self) {}
}

/// Deterministic in-process provider that replays queued responses in order.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<ScriptedResponse>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedProvider {
    #[must_use]
    pub fn new(responses: impl IntoIterator<Item = ScriptedResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push_response(&self, response: ScriptedResponse) {
        lock_unpoisoned(&self.responses).push_back(response);
    }

    /// Requests received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<GenerateRequest> {
        lock_unpoisoned(&self.requests).clone()
    }
}

impl GenerationProvider for ScriptedProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: SCRIPTED_PROVIDER_ID.to_string(),
            endpoint: "scripted://generate-stream".to_string(),
        }
    }

    fn open_stream(
        &self,
        request: GenerateRequest,
        _cancel: CancellationSignal,
    ) -> BoxFuture<'static, Result<ChunkStream, ProviderError>> {
        lock_unpoisoned(&self.requests).push(request);
        let response = lock_unpoisoned(&self.responses).pop_front();

        let outcome = match response {
            Some(ScriptedResponse::Chunks(chunks)) => {
                let chunks: ChunkStream =
                    Box::pin(stream::iter(chunks.into_iter().map(Ok::<_, ProviderError>)));
                Ok(chunks)
            }
            Some(ScriptedResponse::Reject { status, message }) => {
                Err(ProviderError::rejected(status, message))
            }
            Some(ScriptedResponse::ConnectionError(message)) => {
                Err(ProviderError::transport(message))
            }
            Some(ScriptedResponse::Manual(receiver)) => {
                let chunks: ChunkStream =
                    Box::pin(stream::unfold(receiver, |mut receiver| async move {
                        receiver.recv().await.map(|item| (item, receiver))
                    }));
                Ok(chunks)
            }
            None => Err(ProviderError::transport("no scripted response left")),
        };

        Box::pin(async move { outcome })
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
