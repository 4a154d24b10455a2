use serde::{Deserialize, Serialize};

/// Default token budget for one generated reply.
pub const DEFAULT_MAX_TOKENS: u32 = 200;
/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Request body for the streaming generation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Backend-side context key; the client sends the conversation index.
    pub session_id: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f64,
    /// When true the backend discards any context it kept for `session_id`.
    pub new_context: bool,
}

impl GenerateRequest {
    pub fn new(session_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            prompt: prompt.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            new_context: true,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_new_context(mut self, new_context: bool) -> Self {
        self.new_context = new_context;
        self
    }
}
