use std::sync::Arc;

use crate::backend::StorageBackend;
use crate::error::ChatStoreError;
use crate::schema::{Conversation, StoredChat};

/// Key under which the conversation snapshot is stored.
pub const CHATS_KEY: &str = "chats";

/// Snapshot persistence for the whole conversation list.
///
/// [`DurableStore::load`] and [`DurableStore::save`] never fail: backend
/// errors are logged and the caller's in-memory state stays authoritative.
/// The `try_` variants expose the underlying error.
#[derive(Clone)]
pub struct DurableStore {
    backend: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for DurableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurableStore").finish_non_exhaustive()
    }
}

impl DurableStore {
    pub fn new(backend: impl StorageBackend) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    #[must_use]
    pub fn from_shared(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub async fn try_load(&self) -> Result<Option<Vec<Conversation>>, ChatStoreError> {
        let Some(raw) = self.backend.get(CHATS_KEY).await? else {
            return Ok(None);
        };

        let records: Vec<StoredChat> = serde_json::from_str(&raw)
            .map_err(|source| ChatStoreError::json_parse(CHATS_KEY, source))?;

        Ok(Some(
            records.into_iter().map(Conversation::from_record).collect(),
        ))
    }

    /// Loads the stored list; missing, corrupt or unreachable data is `None`.
    pub async fn load(&self) -> Option<Vec<Conversation>> {
        match self.try_load().await {
            Ok(Some(conversations)) if !conversations.is_empty() => {
                tracing::debug!(count = conversations.len(), "loaded stored conversations");
                Some(conversations)
            }
            Ok(_) => None,
            Err(error) => {
                tracing::warn!(%error, "could not load stored conversations; treating store as empty");
                None
            }
        }
    }

    pub async fn try_save(&self, conversations: &[Conversation]) -> Result<(), ChatStoreError> {
        let records = conversations
            .iter()
            .map(Conversation::to_record)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| ChatStoreError::json_serialize(CHATS_KEY, source))?;
        let value = serde_json::to_string(&records)
            .map_err(|source| ChatStoreError::json_serialize(CHATS_KEY, source))?;

        self.backend.set(CHATS_KEY, value).await
    }

    /// Persists the list, returning whether the write reached the backend.
    pub async fn save(&self, conversations: &[Conversation]) -> bool {
        match self.try_save(conversations).await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(%error, "could not persist conversations; keeping in-memory state");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::schema::Message;

    #[tokio::test]
    async fn empty_snapshot_is_treated_as_absent() {
        let backend = MemoryBackend::new();
        backend.insert_raw(CHATS_KEY, "[]");
        let store = DurableStore::new(backend);

        assert_eq!(store.load().await, None);
        assert_eq!(store.try_load().await.expect("valid json"), Some(Vec::new()));
    }

    #[tokio::test]
    async fn save_writes_nested_content_string() {
        let backend = MemoryBackend::new();
        let store = DurableStore::new(backend.clone());
        let conversation = Conversation::with_messages("Greeting", vec![Message::user("hi")]);

        assert!(store.save(&[conversation]).await);

        let raw = backend.raw(CHATS_KEY).expect("snapshot should be written");
        let records: Vec<StoredChat> = serde_json::from_str(&raw).expect("records");
        assert_eq!(records[0].title, "Greeting");
        assert_eq!(records[0].content, r#"[{"role":"user","content":"hi"}]"#);
    }
}
