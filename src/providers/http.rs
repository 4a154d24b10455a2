use std::sync::Arc;

use futures_util::StreamExt;
use generation_api::{
    CancellationSignal, GenerateRequest, GenerationApiConfig, GenerationClient,
};

use super::HTTP_PROVIDER_ID;
use crate::config::ChatConfig;
use crate::error::{ConfigError, ProviderError};
use crate::provider::{BoxFuture, ChunkStream, GenerationProvider, ProviderProfile};

const USER_AGENT: &str = concat!("chatline/", env!("CARGO_PKG_VERSION"));

/// Provider backed by the streaming HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    client: Arc<GenerationClient>,
}

impl HttpProvider {
    pub fn new(config: GenerationApiConfig) -> Result<Self, ConfigError> {
        let client =
            GenerationClient::new(config).map_err(|error| ConfigError::Client(error.to_string()))?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    pub fn from_config(config: &ChatConfig) -> Result<Self, ConfigError> {
        Self::new(GenerationApiConfig::new(config.api_url.clone()).with_user_agent(USER_AGENT))
    }
}

impl GenerationProvider for HttpProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: HTTP_PROVIDER_ID.to_string(),
            endpoint: self.client.normalized_endpoint(),
        }
    }

    fn open_stream(
        &self,
        request: GenerateRequest,
        cancel: CancellationSignal,
    ) -> BoxFuture<'static, Result<ChunkStream, ProviderError>> {
        let client = Arc::clone(&self.client);

        Box::pin(async move {
            let chunks = client.open(&request, Some(&cancel)).await?;
            let chunks: ChunkStream =
                Box::pin(chunks.map(|chunk| chunk.map_err(ProviderError::from)));
            Ok(chunks)
        })
    }
}
