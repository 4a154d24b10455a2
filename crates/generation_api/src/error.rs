use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Error as JsonError, Value};

#[derive(Debug)]
pub enum GenerationApiError {
    InvalidBaseUrl(String),
    Request(reqwest::Error),
    Status(StatusCode, String),
    Serde(JsonError),
    Cancelled,
    Unknown(String),
}

impl GenerationApiError {
    /// Returns the HTTP status for rejected requests.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status(status, _) => Some(*status),
            Self::Request(error) => error.status(),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    pub detail: Option<Value>,
    pub error: Option<ErrorPayloadFields>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayloadFields {
    pub message: Option<String>,
}

impl ErrorPayload {
    fn message(&self) -> Option<String> {
        if let Some(detail) = &self.detail {
            match detail {
                Value::String(text) if !text.trim().is_empty() => return Some(text.clone()),
                Value::Array(items) => {
                    let joined = items
                        .iter()
                        .filter_map(|item| item.get("msg").and_then(Value::as_str))
                        .collect::<Vec<_>>()
                        .join("; ");
                    if !joined.is_empty() {
                        return Some(joined);
                    }
                }
                _ => {}
            }
        }

        self.error
            .as_ref()
            .and_then(|fields| fields.message.as_deref())
            .filter(|message| !message.trim().is_empty())
            .map(ToString::to_string)
    }
}

impl fmt::Display for GenerationApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBaseUrl(value) => write!(f, "invalid base URL: {value}"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status(status, message) => write!(f, "HTTP {status} {message}"),
            Self::Serde(error) => write!(f, "serialization error: {error}"),
            Self::Cancelled => write!(f, "request was cancelled"),
            Self::Unknown(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for GenerationApiError {}

impl From<reqwest::Error> for GenerationApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for GenerationApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

/// Builds a human-readable message for a non-success response body.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Some(message) = serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .and_then(|payload| payload.message())
    {
        return message;
    }

    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}
