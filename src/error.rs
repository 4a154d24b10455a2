use std::path::PathBuf;

use generation_api::GenerationApiError;
use thiserror::Error;

/// Failure opening or reading a generation stream.
///
/// Never surfaced to callers of the orchestrator; it is rendered into the
/// transcript as a system message instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request cancelled")]
    Cancelled,
}

impl ProviderError {
    #[must_use]
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}

impl From<GenerationApiError> for ProviderError {
    fn from(error: GenerationApiError) -> Self {
        match error {
            GenerationApiError::Status(status, message) => Self::Rejected {
                status: status.as_u16(),
                message,
            },
            GenerationApiError::Cancelled => Self::Cancelled,
            other => Self::Transport(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not resolve the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    #[error("could not build the generation client: {0}")]
    Client(String),
}

impl ConfigError {
    #[must_use]
    pub fn invalid(key: &'static str, value: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidValue {
            key,
            value: value.into(),
            reason,
        }
    }
}
