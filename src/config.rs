//! Client configuration.
//!
//! Values resolve in three layers: built-in defaults, then an optional JSON
//! file named by `CHATLINE_CONFIG_PATH`, then individual environment
//! variables.

use std::env;
use std::path::{Path, PathBuf};

use chat_store::store_root;
use generation_api::payload::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use generation_api::url::DEFAULT_GENERATION_BASE_URL;
use serde::Deserialize;

use crate::error::ConfigError;

pub const CONFIG_PATH_ENV: &str = "CHATLINE_CONFIG_PATH";
pub const API_URL_ENV: &str = "CHATLINE_API_URL";
pub const MAX_TOKENS_ENV: &str = "CHATLINE_MAX_TOKENS";
pub const TEMPERATURE_ENV: &str = "CHATLINE_TEMPERATURE";
pub const NEW_CONTEXT_ENV: &str = "CHATLINE_NEW_CONTEXT";
pub const STORE_DIR_ENV: &str = "CHATLINE_STORE_DIR";
pub const SEED_PATH_ENV: &str = "CHATLINE_SEED_PATH";
pub const LOG_ENV: &str = "CHATLINE_LOG";

pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    pub api_url: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub new_context: bool,
    pub store_dir: PathBuf,
    pub seed_path: Option<PathBuf>,
    pub log_filter: String,
}

/// Shape of the optional JSON config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub new_context: Option<bool>,
    pub store_dir: Option<PathBuf>,
    pub seed_path: Option<PathBuf>,
    pub log: Option<String>,
}

impl ChatConfig {
    /// Defaults rooted at `cwd`.
    #[must_use]
    pub fn with_defaults(cwd: &Path) -> Self {
        Self {
            api_url: DEFAULT_GENERATION_BASE_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            new_context: true,
            store_dir: store_root(cwd),
            seed_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let cwd = env::current_dir().map_err(ConfigError::CurrentDir)?;
        let mut config = Self::with_defaults(&cwd);

        if let Some(path) = env_string_opt(CONFIG_PATH_ENV) {
            config.apply_file(FileConfig::load(Path::new(&path))?);
        }
        config.apply_env()?;
        config.validate()?;

        tracing::debug!(
            api_url = %config.api_url,
            store_dir = %config.store_dir.display(),
            "resolved chat configuration"
        );
        Ok(config)
    }

    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(api_url) = file.api_url {
            self.api_url = api_url;
        }
        if let Some(max_tokens) = file.max_tokens {
            self.max_tokens = max_tokens;
        }
        if let Some(temperature) = file.temperature {
            self.temperature = temperature;
        }
        if let Some(new_context) = file.new_context {
            self.new_context = new_context;
        }
        if let Some(store_dir) = file.store_dir {
            self.store_dir = store_dir;
        }
        if file.seed_path.is_some() {
            self.seed_path = file.seed_path;
        }
        if let Some(log) = file.log {
            self.log_filter = log;
        }
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(api_url) = env_string_opt(API_URL_ENV) {
            self.api_url = api_url.trim().to_string();
        }
        if let Some(raw) = env_string_opt(MAX_TOKENS_ENV) {
            self.max_tokens = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid(MAX_TOKENS_ENV, &raw, "expected an integer"))?;
        }
        if let Some(raw) = env_string_opt(TEMPERATURE_ENV) {
            self.temperature = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid(TEMPERATURE_ENV, &raw, "expected a number"))?;
        }
        if let Some(new_context) = env_bool(NEW_CONTEXT_ENV)? {
            self.new_context = new_context;
        }
        if let Some(store_dir) = env_string_opt(STORE_DIR_ENV) {
            self.store_dir = PathBuf::from(store_dir);
        }
        if let Some(seed_path) = env_string_opt(SEED_PATH_ENV) {
            self.seed_path = Some(PathBuf::from(seed_path));
        }
        if let Some(log) = env_string_opt(LOG_ENV) {
            self.log_filter = log;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::invalid(API_URL_ENV, &self.api_url, "must not be empty"));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::invalid(MAX_TOKENS_ENV, "0", "must be positive"));
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(ConfigError::invalid(
                TEMPERATURE_ENV,
                self.temperature.to_string(),
                "must be a finite non-negative number",
            ));
        }
        Ok(())
    }
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

fn env_bool(key: &'static str) -> Result<Option<bool>, ConfigError> {
    let Some(raw) = env_string_opt(key) else {
        return Ok(None);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::invalid(key, raw, "expected a boolean")),
    }
}
