use std::sync::Arc;

use crate::config::ChatConfig;
use crate::error::ConfigError;
use crate::provider::GenerationProvider;

mod http;
mod mock;

pub use http::HttpProvider;
pub use mock::{sse_event, ManualStream, ScriptedProvider, ScriptedResponse};

pub const HTTP_PROVIDER_ID: &str = "http";
pub const SCRIPTED_PROVIDER_ID: &str = "scripted";

pub fn provider_for_config(config: &ChatConfig) -> Result<Arc<dyn GenerationProvider>, ConfigError> {
    Ok(Arc::new(HttpProvider::from_config(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn provider_for_config_targets_normalized_endpoint() {
        let mut config = ChatConfig::with_defaults(Path::new("/tmp"));
        config.api_url = "http://127.0.0.1:9001/".to_string();

        let provider = provider_for_config(&config).expect("http provider should build");
        let profile = provider.profile();

        assert_eq!(profile.provider_id, HTTP_PROVIDER_ID);
        assert_eq!(profile.endpoint, "http://127.0.0.1:9001/generate-stream");
    }
}
