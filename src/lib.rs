//! Conversation state and streaming ingestion core for a chat client.
//!
//! # Public API Overview
//! - [`ConversationStore`] owns the conversation list and the active
//!   transcript, committing every mutation to a [`chat_store::DurableStore`].
//! - [`SessionOrchestrator`] runs one generation request at a time, feeding
//!   decoded tokens into the store and superseding stale sessions.
//! - [`GenerationProvider`] is the seam to the streaming backend, with an
//!   HTTP implementation and a scripted one for tests.
//! - [`ChatClient`] wires all of it from a [`ChatConfig`].

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod store;
pub mod title;

pub use chat_store::{Conversation, Message, Role};
pub use client::ChatClient;
pub use config::ChatConfig;
pub use error::{ConfigError, ProviderError};
pub use orchestrator::{failure_message, Phase, SessionId, SessionOrchestrator};
pub use prompt::{build_prompt, RequestSettings};
pub use provider::{ChunkStream, GenerationProvider, ProviderProfile};
pub use store::{ConversationKey, ConversationStore, LoadSource};
pub use title::{creation_title, display_title};
