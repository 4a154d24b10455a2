use std::collections::BTreeMap;

use crate::url::DEFAULT_GENERATION_BASE_URL;

/// Transport configuration for generation requests.
///
/// No read timeout is applied; an unresponsive backend surfaces only when the
/// connection itself errors.
#[derive(Debug, Clone)]
pub struct GenerationApiConfig {
    /// Base URL of the generation server.
    pub base_url: String,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// Additional headers merged into request headers.
    pub extra_headers: BTreeMap<String, String>,
}

impl Default for GenerationApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GENERATION_BASE_URL.to_string(),
            user_agent: None,
            extra_headers: BTreeMap::new(),
        }
    }
}

impl GenerationApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn insert_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }
}
