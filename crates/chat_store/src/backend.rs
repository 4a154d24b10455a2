use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::ChatStoreError;
use crate::paths::key_file_name;

pub type BoxFuture<'a, T> = futures_util::future::BoxFuture<'a, T>;

/// String-keyed get/set storage underneath [`crate::DurableStore`].
pub trait StorageBackend: Send + Sync + 'static {
    /// Returns the stored value, or `None` when the key was never written.
    fn get(&self, key: &str) -> BoxFuture<'static, Result<Option<String>, ChatStoreError>>;

    /// Replaces the stored value for `key`.
    fn set(&self, key: &str, value: String) -> BoxFuture<'static, Result<(), ChatStoreError>>;
}

/// Stores each key as one JSON file under a root directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key_file_name(key))
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> BoxFuture<'static, Result<Option<String>, ChatStoreError>> {
        let path = self.path_for(key);

        Box::pin(async move {
            match tokio::fs::read_to_string(&path).await {
                Ok(value) => Ok(Some(value)),
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(source) => Err(ChatStoreError::io("reading stored value", path, source)),
            }
        })
    }

    fn set(&self, key: &str, value: String) -> BoxFuture<'static, Result<(), ChatStoreError>> {
        let root = self.root.clone();
        let path = self.path_for(key);

        Box::pin(async move {
            tokio::fs::create_dir_all(&root)
                .await
                .map_err(|source| ChatStoreError::io("creating store directory", &root, source))?;

            // Write to a sibling temp file, then rename over the target.
            let temp_path = path.with_extension("json.tmp");
            tokio::fs::write(&temp_path, value)
                .await
                .map_err(|source| ChatStoreError::io("writing stored value", &temp_path, source))?;
            if let Err(source) = tokio::fs::rename(&temp_path, &path).await {
                if let Err(error) = tokio::fs::remove_file(&temp_path).await {
                    tracing::warn!(
                        path = %temp_path.display(),
                        %error,
                        "failed to remove temporary store file"
                    );
                }
                return Err(ChatStoreError::io("replacing stored value", &path, source));
            }

            Ok(())
        })
    }
}

/// In-memory backend; clones share the same map.
///
/// Can be switched offline to exercise degraded persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    values: Arc<Mutex<HashMap<String, String>>>,
    offline: Arc<AtomicBool>,
    writes: Arc<Mutex<usize>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw stored value, bypassing serialization.
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        lock_unpoisoned(&self.values).insert(key.into(), value.into());
    }

    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        lock_unpoisoned(&self.values).get(key).cloned()
    }

    /// Number of successful `set` calls.
    #[must_use]
    pub fn write_count(&self) -> usize {
        *lock_unpoisoned(&self.writes)
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), ChatStoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ChatStoreError::unavailable("memory backend is offline"));
        }
        Ok(())
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> BoxFuture<'static, Result<Option<String>, ChatStoreError>> {
        let result = self.ensure_online().map(|()| self.raw(key));
        Box::pin(async move { result })
    }

    fn set(&self, key: &str, value: String) -> BoxFuture<'static, Result<(), ChatStoreError>> {
        let result = self.ensure_online().map(|()| {
            lock_unpoisoned(&self.values).insert(key.to_string(), value);
            *lock_unpoisoned(&self.writes) += 1;
        });
        Box::pin(async move { result })
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
