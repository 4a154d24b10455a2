use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatStoreError {
    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse stored value for key '{key}': {source}")]
    JsonParse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize value for key '{key}': {source}")]
    JsonSerialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse seed data from {origin}: {source}")]
    SeedParse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage backend unavailable: {message}")]
    Unavailable { message: String },
}

impl ChatStoreError {
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn json_parse(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::JsonParse {
            key: key.into(),
            source,
        }
    }

    #[must_use]
    pub fn json_serialize(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::JsonSerialize {
            key: key.into(),
            source,
        }
    }

    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}
