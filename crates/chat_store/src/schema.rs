use serde::{Deserialize, Serialize};

/// Title given to a synthesized empty conversation.
pub const DEFAULT_TITLE: &str = "New Chat";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Uppercase label used when rendering a transcript into a prompt.
    #[must_use]
    pub fn prompt_label(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Assistant => "ASSISTANT",
            Self::System => "SYSTEM",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub title: String,
    pub messages: Vec<Message>,
}

impl Conversation {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            messages: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_messages(title: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            title: title.into(),
            messages,
        }
    }

    /// Converts to the persisted record, encoding messages as a nested JSON string.
    pub fn to_record(&self) -> Result<StoredChat, serde_json::Error> {
        Ok(StoredChat {
            title: self.title.clone(),
            content: serde_json::to_string(&self.messages)?,
        })
    }

    /// Restores a conversation from its persisted record.
    ///
    /// Unreadable message content loads as an empty transcript; the title is kept.
    #[must_use]
    pub fn from_record(record: StoredChat) -> Self {
        let messages = if record.content.trim().is_empty() {
            Vec::new()
        } else {
            match serde_json::from_str::<Vec<Message>>(&record.content) {
                Ok(messages) => messages,
                Err(error) => {
                    tracing::warn!(
                        title = %record.title,
                        %error,
                        "stored conversation content is unreadable; loading empty transcript"
                    );
                    Vec::new()
                }
            }
        };

        Self {
            title: record.title,
            messages,
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}

/// One entry of the persisted `"chats"` snapshot.
///
/// `content` holds the JSON-encoded message array rather than a nested value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredChat {
    pub title: String,
    #[serde(default)]
    pub content: String,
}
