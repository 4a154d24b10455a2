use std::path::Path;

use crate::error::ChatStoreError;
use crate::schema::{Conversation, StoredChat};

const BUNDLED_SEED: &str = include_str!("../assets/chats.json");

/// Parses a seed list in the stored record format.
pub fn parse_seed(origin: &str, raw: &str) -> Result<Vec<Conversation>, ChatStoreError> {
    let records: Vec<StoredChat> =
        serde_json::from_str(raw).map_err(|source| ChatStoreError::SeedParse {
            origin: origin.to_string(),
            source,
        })?;

    Ok(records.into_iter().map(Conversation::from_record).collect())
}

/// Seed list shipped with the crate, used on first run.
#[must_use]
pub fn bundled_seed() -> Vec<Conversation> {
    parse_seed("bundled seed", BUNDLED_SEED).unwrap_or_else(|error| {
        tracing::warn!(%error, "bundled seed is unreadable; ignoring it");
        Vec::new()
    })
}

pub async fn load_seed_file(path: &Path) -> Result<Vec<Conversation>, ChatStoreError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ChatStoreError::io("reading seed file", path, source))?;
    parse_seed(&path.display().to_string(), &raw)
}
