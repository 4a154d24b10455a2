//! Transport-only client primitives for the streaming generation endpoint.
//!
//! This crate owns request building, endpoint normalization, error-body
//! parsing and incremental decoding of the `data: {"token": ...}` event
//! stream. It holds no conversation state; callers own transcripts and decide
//! what a decoded token means.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod payload;
pub mod sse;
pub mod url;

pub use client::{await_or_cancel, is_cancelled, ByteStream, CancellationSignal, GenerationClient};
pub use config::GenerationApiConfig;
pub use error::GenerationApiError;
pub use events::StreamEvent;
pub use payload::GenerateRequest;
pub use sse::{decode_stream, StreamDecoder};
pub use url::normalize_generation_url;

pub use reqwest::StatusCode;
