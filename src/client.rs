use std::sync::Arc;

use chat_store::{bundled_seed, load_seed_file, Conversation, DurableStore, FileBackend};

use crate::config::ChatConfig;
use crate::error::ConfigError;
use crate::orchestrator::{Phase, SessionId, SessionOrchestrator};
use crate::prompt::RequestSettings;
use crate::provider::GenerationProvider;
use crate::providers::provider_for_config;
use crate::store::{ConversationKey, ConversationStore};

/// Owned chat state for one UI: the conversation store plus the session
/// orchestrator that writes into it.
#[derive(Debug)]
pub struct ChatClient {
    store: ConversationStore,
    orchestrator: SessionOrchestrator,
}

impl ChatClient {
    /// Wires a file-backed store, the seed list and the HTTP provider.
    pub async fn open(config: &ChatConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let provider = provider_for_config(config)?;
        let durable = DurableStore::new(FileBackend::new(&config.store_dir));
        let seed = resolve_seed(config).await;

        tracing::info!(
            store_dir = %config.store_dir.display(),
            endpoint = %provider.profile().endpoint,
            "opening chat client"
        );
        Ok(Self::from_parts(durable, seed, provider, RequestSettings::from(config)).await)
    }

    pub async fn from_parts(
        durable: DurableStore,
        seed: Vec<Conversation>,
        provider: Arc<dyn GenerationProvider>,
        settings: RequestSettings,
    ) -> Self {
        Self {
            store: ConversationStore::load(durable, seed).await,
            orchestrator: SessionOrchestrator::new(provider, settings),
        }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn orchestrator(&self) -> &SessionOrchestrator {
        &self.orchestrator
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.orchestrator.phase()
    }

    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.orchestrator.is_streaming()
    }

    pub async fn send(&mut self, text: &str) -> Option<SessionId> {
        self.orchestrator.send(&mut self.store, text).await
    }

    pub async fn select(&mut self, index: usize) -> bool {
        self.store.select(index).await
    }

    pub async fn create(&mut self) -> ConversationKey {
        self.store.create().await
    }

    pub async fn rename(&mut self, index: usize, title: &str) -> bool {
        self.store.rename(index, title).await
    }

    /// Deletes the conversation at `index`, abandoning a session that targets it.
    pub async fn delete(&mut self, index: usize) -> bool {
        let deleted = self.store.delete(index).await;
        if deleted {
            self.orchestrator.release_if_target_gone(&self.store);
        }
        deleted
    }

    pub async fn pump(&mut self) -> bool {
        self.orchestrator.pump(&mut self.store).await
    }

    pub async fn drain_pending(&mut self) -> usize {
        self.orchestrator.drain_pending(&mut self.store).await
    }

    pub async fn run_until_idle(&mut self) {
        self.orchestrator.run_until_idle(&mut self.store).await;
    }

    pub fn abandon(&mut self) -> bool {
        self.orchestrator.abandon()
    }
}

async fn resolve_seed(config: &ChatConfig) -> Vec<Conversation> {
    let Some(path) = config.seed_path.as_deref() else {
        return bundled_seed();
    };

    match load_seed_file(path).await {
        Ok(seed) => seed,
        Err(error) => {
            tracing::warn!(%error, "configured seed is unusable; using bundled seed");
            bundled_seed()
        }
    }
}
