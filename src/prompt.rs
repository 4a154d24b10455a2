use chat_store::Message;
use generation_api::payload::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use generation_api::GenerateRequest;

use crate::config::ChatConfig;

/// Sampling parameters attached to every generation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestSettings {
    pub max_tokens: u32,
    pub temperature: f64,
    pub new_context: bool,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            new_context: true,
        }
    }
}

impl From<&ChatConfig> for RequestSettings {
    fn from(config: &ChatConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            new_context: config.new_context,
        }
    }
}

/// Renders prior messages as `ROLE: content` lines and appends the new user turn.
///
/// With no history the prompt is the bare user text.
#[must_use]
pub fn build_prompt(history: &[Message], user_text: &str) -> String {
    if history.is_empty() {
        return user_text.to_string();
    }

    let mut prompt = history
        .iter()
        .map(|message| format!("{}: {}", message.role.prompt_label(), message.content))
        .collect::<Vec<_>>()
        .join("\n");
    prompt.push_str("\nUSER: ");
    prompt.push_str(user_text);
    prompt
}

#[must_use]
pub fn build_request(
    conversation_index: usize,
    history: &[Message],
    user_text: &str,
    settings: &RequestSettings,
) -> GenerateRequest {
    GenerateRequest::new(
        conversation_index.to_string(),
        build_prompt(history, user_text),
    )
    .with_max_tokens(settings.max_tokens)
    .with_temperature(settings.temperature)
    .with_new_context(settings.new_context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_turn_is_bare_text() {
        assert_eq!(build_prompt(&[], "hello"), "hello");
    }

    #[test]
    fn history_is_rendered_as_labelled_lines() {
        let history = vec![
            Message::user("hi"),
            Message::assistant("hello, how can I help?"),
            Message::system("Error: Could not connect to AI service."),
        ];

        assert_eq!(
            build_prompt(&history, "explain traits"),
            "USER: hi\nASSISTANT: hello, how can I help?\nSYSTEM: Error: Could not connect to AI service.\nUSER: explain traits"
        );
    }

    #[test]
    fn request_carries_index_and_settings() {
        let settings = RequestSettings {
            max_tokens: 32,
            temperature: 1.5,
            new_context: false,
        };
        let request = build_request(3, &[], "ping", &settings);

        assert_eq!(request.session_id, "3");
        assert_eq!(request.prompt, "ping");
        assert_eq!(request.max_tokens, 32);
        assert_eq!(request.temperature, 1.5);
        assert!(!request.new_context);
    }
}
