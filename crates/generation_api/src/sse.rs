use futures_util::{future, stream, Stream, StreamExt};

use crate::events::{StreamEvent, TokenPayload};

/// Marker that prefixes every event line on the wire.
pub const DATA_PREFIX: &str = "data:";

/// Incremental decoder for `data: <json>` line streams.
///
/// Chunks may split a line anywhere, including inside a multi-byte UTF-8
/// sequence, so pending input is buffered as raw bytes and only complete
/// lines are decoded. Each stream gets its own decoder.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: Vec<u8>,
}

impl StreamDecoder {
    /// Feed arbitrary bytes into the decoder and drain events for every complete line.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();

        while let Some(newline) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=newline).collect();
            let decoded = String::from_utf8_lossy(&raw[..raw.len() - 1]);
            let line = decoded.strip_suffix('\r').unwrap_or(decoded.as_ref());

            if let Some(event) = decode_line(line) {
                events.push(event);
            }
        }

        events
    }

    /// Decode a complete payload string in one shot.
    ///
    /// A trailing line without a newline is treated as incomplete and dropped.
    pub fn parse_lines(input: &str) -> Vec<StreamEvent> {
        let mut decoder = Self::default();
        decoder.feed(input.as_bytes())
    }

    /// Number of buffered bytes that do not yet form a complete line.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// True when nothing but whitespace is buffered.
    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.iter().all(u8::is_ascii_whitespace)
    }

    /// Ends the stream, discarding any unterminated trailing line.
    ///
    /// Returns the number of discarded bytes.
    pub fn finish(self) -> usize {
        if !self.is_empty_buffer() {
            tracing::debug!(
                discarded = self.buffer.len(),
                "discarding incomplete trailing stream line"
            );
        }
        self.buffer.len()
    }
}

fn decode_line(line: &str) -> Option<StreamEvent> {
    let payload = line.strip_prefix(DATA_PREFIX)?.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<TokenPayload>(payload) {
        Ok(TokenPayload { token }) => Some(StreamEvent::Token { text: token }),
        Err(error) => Some(StreamEvent::DecodeError {
            line: line.to_string(),
            message: error.to_string(),
        }),
    }
}

/// Lazily decode a chunk stream into events, preserving arrival order.
///
/// A chunk error is forwarded in place; decoding of later chunks continues with
/// the same buffer. When the chunk stream ends, any trailing partial line is
/// discarded.
pub fn decode_stream<S, E>(chunks: S) -> impl Stream<Item = Result<StreamEvent, E>>
where
    S: Stream<Item = Result<Vec<u8>, E>>,
{
    chunks
        .map(Some)
        .chain(stream::once(future::ready(None)))
        .scan(StreamDecoder::default(), |decoder, chunk| {
            let batch: Vec<Result<StreamEvent, E>> = match chunk {
                Some(Ok(bytes)) => decoder.feed(&bytes).into_iter().map(Ok).collect(),
                Some(Err(error)) => vec![Err(error)],
                None => {
                    std::mem::take(decoder).finish();
                    Vec::new()
                }
            };
            future::ready(Some(stream::iter(batch)))
        })
        .flatten()
}
