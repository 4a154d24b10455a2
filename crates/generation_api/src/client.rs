use std::future::Future;
use std::pin::Pin;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;

use crate::config::GenerationApiConfig;
use crate::error::{parse_error_message, GenerationApiError};
use crate::events::StreamEvent;
use crate::payload::GenerateRequest;
use crate::sse::decode_stream;
use crate::url::normalize_generation_url;

/// Optional cancellation signal shared across request and stream loops.
pub type CancellationSignal = Arc<AtomicBool>;

/// Raw response body chunks in arrival order.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, GenerationApiError>> + Send>>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug)]
pub struct GenerationClient {
    http: Client,
    config: GenerationApiConfig,
}

#[derive(Debug, Clone, Default)]
pub struct StreamResult {
    pub events: Vec<StreamEvent>,
}

impl StreamResult {
    /// Concatenated token text in arrival order.
    pub fn text(&self) -> String {
        self.events.iter().filter_map(StreamEvent::token).collect()
    }
}

impl GenerationClient {
    pub fn new(config: GenerationApiConfig) -> Result<Self, GenerationApiError> {
        let http = Client::builder().build().map_err(GenerationApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GenerationApiConfig {
        &self.config
    }

    pub fn normalized_endpoint(&self) -> String {
        normalize_generation_url(&self.config.base_url)
    }

    pub fn build_headers(&self) -> Result<HeaderMap, GenerationApiError> {
        let mut out = HeaderMap::new();
        out.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        if let Some(user_agent) = self.config.user_agent.as_deref() {
            out.insert(
                USER_AGENT,
                HeaderValue::from_str(user_agent).map_err(|_| {
                    GenerationApiError::Unknown("invalid user agent header value".to_string())
                })?,
            );
        }
        for (key, value) in &self.config.extra_headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
                    GenerationApiError::Unknown(format!("invalid header key: {key}"))
                })?,
                HeaderValue::from_str(value).map_err(|_| {
                    GenerationApiError::Unknown(format!("invalid header value for {key}"))
                })?,
            );
        }
        Ok(out)
    }

    pub fn build_request(
        &self,
        request: &GenerateRequest,
    ) -> Result<reqwest::RequestBuilder, GenerationApiError> {
        let endpoint = self.normalized_endpoint();
        reqwest::Url::parse(&endpoint)
            .map_err(|error| GenerationApiError::InvalidBaseUrl(format!("{endpoint}: {error}")))?;

        Ok(self
            .http
            .post(endpoint)
            .headers(self.build_headers()?)
            .json(request))
    }

    /// Sends the request and returns the response body as a chunk stream.
    ///
    /// Any non-success status is a hard failure carrying the parsed error body.
    /// No retry is attempted.
    pub async fn open(
        &self,
        request: &GenerateRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<ByteStream, GenerationApiError> {
        if is_cancelled(cancellation) {
            return Err(GenerationApiError::Cancelled);
        }

        let response = await_or_cancel(self.build_request(request)?.send(), cancellation).await??;
        let status = response.status();
        if !status.is_success() {
            let body = await_or_cancel(response.text(), cancellation)
                .await?
                .unwrap_or_default();
            let message = parse_error_message(status, &body);
            tracing::warn!(status = status.as_u16(), %message, "generation request rejected");
            return Err(GenerationApiError::Status(status, message));
        }

        let chunks = response.bytes_stream().map(|chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(GenerationApiError::from)
        });
        Ok(Box::pin(chunks))
    }

    /// Streams decoded events into `on_event` until the connection closes.
    ///
    /// Returns the number of token events delivered.
    pub async fn stream_with_handler<F>(
        &self,
        request: &GenerateRequest,
        cancellation: Option<&CancellationSignal>,
        mut on_event: F,
    ) -> Result<usize, GenerationApiError>
    where
        F: FnMut(StreamEvent),
    {
        let chunks = self.open(request, cancellation).await?;
        let mut events = Box::pin(decode_stream(chunks));
        let mut tokens = 0usize;

        loop {
            let Some(event) = await_or_cancel(events.next(), cancellation).await? else {
                break;
            };
            let event = event?;
            if matches!(event, StreamEvent::Token { .. }) {
                tokens += 1;
            }
            on_event(event);
        }

        if is_cancelled(cancellation) {
            return Err(GenerationApiError::Cancelled);
        }

        Ok(tokens)
    }

    pub async fn stream(
        &self,
        request: &GenerateRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<StreamResult, GenerationApiError> {
        let mut events = Vec::new();
        self.stream_with_handler(request, cancellation, |event| {
            events.push(event);
        })
        .await?;

        Ok(StreamResult { events })
    }
}

pub fn is_cancelled(cancel: Option<&CancellationSignal>) -> bool {
    cancel.is_some_and(|token| token.load(Ordering::Acquire))
}

/// Awaits `future` while polling `cancellation`, giving up as soon as it is set.
pub async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancellationSignal>,
) -> Result<F::Output, GenerationApiError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(GenerationApiError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(cancellation) {
                return Err(GenerationApiError::Cancelled);
            }
            return Ok(output);
        }
    }
}
