use serde::{Deserialize, Serialize};

/// Event produced by [`crate::StreamDecoder`] for one complete `data:` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// One incremental unit of generated text.
    Token { text: String },
    /// A `data:` line whose payload did not decode. Never fatal to the stream.
    DecodeError { line: String, message: String },
}

impl StreamEvent {
    /// Returns the token text when this is a token event.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Token { text } => Some(text),
            Self::DecodeError { .. } => None,
        }
    }
}

/// Wire payload carried after the `data:` marker.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenPayload {
    pub token: String,
}
