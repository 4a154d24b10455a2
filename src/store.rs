//! Conversation list and active transcript.
//!
//! Every mutation is followed by [`ConversationStore::commit`] before the
//! method returns, so the durable snapshot never lags the in-memory view by
//! more than the mutation in progress. Invalid operations (out-of-range
//! indices, blank renames, appends to an empty transcript) are logged no-ops.

use chat_store::{Conversation, DurableStore, Message, Role};

use crate::title::{creation_title, display_title};

/// Transient handle for one live conversation.
///
/// Keys are never persisted; they stay valid across selection changes and
/// index shifts, and die with the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationKey(u64);

/// Where the initial conversation list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Stored,
    Seed,
    Default,
}

#[derive(Debug)]
pub struct ConversationStore {
    durable: DurableStore,
    conversations: Vec<Conversation>,
    keys: Vec<ConversationKey>,
    active: usize,
    transcript: Vec<Message>,
    next_key: u64,
    load_source: LoadSource,
}

impl ConversationStore {
    /// Loads the stored list, falling back to `seed` and then to a single
    /// default conversation. The first entry becomes active.
    pub async fn load(durable: DurableStore, seed: Vec<Conversation>) -> Self {
        let (conversations, load_source) = match durable.load().await {
            Some(stored) => (stored, LoadSource::Stored),
            None if !seed.is_empty() => (seed, LoadSource::Seed),
            None => (vec![Conversation::default()], LoadSource::Default),
        };
        tracing::info!(
            source = ?load_source,
            count = conversations.len(),
            "loaded conversations"
        );

        let mut store = Self {
            durable,
            conversations: Vec::new(),
            keys: Vec::new(),
            active: 0,
            transcript: Vec::new(),
            next_key: 0,
            load_source,
        };
        let keys = conversations.iter().map(|_| store.mint_key()).collect();
        store.keys = keys;
        store.transcript = conversations[0].messages.clone();
        store.conversations = conversations;

        if load_source != LoadSource::Stored {
            store.commit().await;
        }
        store
    }

    #[must_use]
    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    pub fn list_conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    /// Always false once loaded; the list is never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active
    }

    #[must_use]
    pub fn active_key(&self) -> ConversationKey {
        self.keys[self.active]
    }

    pub fn active_conversation(&self) -> &Conversation {
        &self.conversations[self.active]
    }

    pub fn active_title(&self) -> &str {
        &self.conversations[self.active].title
    }

    /// The active transcript, the source of truth for the active conversation.
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    #[must_use]
    pub fn key_at(&self, index: usize) -> Option<ConversationKey> {
        self.keys.get(index).copied()
    }

    #[must_use]
    pub fn index_of(&self, key: ConversationKey) -> Option<usize> {
        self.keys.iter().position(|candidate| *candidate == key)
    }

    #[must_use]
    pub fn contains(&self, key: ConversationKey) -> bool {
        self.index_of(key).is_some()
    }

    /// Messages of the conversation behind `key`, live transcript included.
    pub fn messages_of(&self, key: ConversationKey) -> Option<&[Message]> {
        let index = self.index_of(key)?;
        if index == self.active {
            Some(&self.transcript)
        } else {
            Some(&self.conversations[index].messages)
        }
    }

    /// Titles shortened for a sidebar of `max_chars` columns.
    pub fn display_titles(&self, max_chars: usize) -> Vec<String> {
        self.conversations
            .iter()
            .map(|conversation| display_title(&conversation.title, max_chars))
            .collect()
    }

    pub async fn select(&mut self, index: usize) -> bool {
        let Some(conversation) = self.conversations.get(index) else {
            tracing::debug!(index, len = self.len(), "ignoring select of missing conversation");
            return false;
        };

        self.active = index;
        self.transcript = conversation.messages.clone();
        self.commit().await;
        true
    }

    /// Inserts a new empty conversation at the front and makes it active.
    pub async fn create(&mut self) -> ConversationKey {
        self.create_titled(creation_title()).await
    }

    pub async fn create_titled(&mut self, title: impl Into<String>) -> ConversationKey {
        let key = self.mint_key();
        self.conversations.insert(0, Conversation::new(title));
        self.keys.insert(0, key);
        self.active = 0;
        self.transcript.clear();
        self.commit().await;
        key
    }

    /// Replaces the title at `index` with the trimmed `title`; blank titles are ignored.
    pub async fn rename(&mut self, index: usize, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            tracing::debug!(index, "ignoring blank rename");
            return false;
        }
        if index >= self.conversations.len() {
            tracing::debug!(index, len = self.len(), "ignoring rename of missing conversation");
            return false;
        }

        self.conversations[index].title = title.to_string();
        self.commit().await;
        true
    }

    pub async fn delete(&mut self, index: usize) -> bool {
        if index >= self.conversations.len() {
            tracing::debug!(index, len = self.len(), "ignoring delete of missing conversation");
            return false;
        }

        // Park the live transcript in its slot before indices move.
        self.sync_active_slot();
        self.conversations.remove(index);
        self.keys.remove(index);

        if self.conversations.is_empty() {
            let key = self.mint_key();
            self.conversations.push(Conversation::default());
            self.keys.push(key);
            self.active = 0;
            self.transcript.clear();
        } else if index == self.active {
            self.active = 0;
            self.transcript = self.conversations[0].messages.clone();
        } else if index < self.active {
            self.active -= 1;
        }

        self.commit().await;
        true
    }

    pub async fn append_message(&mut self, role: Role, content: impl Into<String>) {
        self.transcript.push(Message::new(role, content));
        self.commit().await;
    }

    /// Appends to the conversation behind `key` whether or not it is active.
    ///
    /// Returns `false` when the conversation no longer exists.
    pub async fn append_message_to(
        &mut self,
        key: ConversationKey,
        role: Role,
        content: impl Into<String>,
    ) -> bool {
        let Some(index) = self.index_of(key) else {
            return false;
        };

        let message = Message::new(role, content);
        if index == self.active {
            self.transcript.push(message);
        } else {
            self.conversations[index].messages.push(message);
        }
        self.commit().await;
        true
    }

    pub async fn append_to_last_message(&mut self, delta: &str) -> bool {
        let Some(last) = self.transcript.last_mut() else {
            tracing::warn!("cannot extend last message of an empty transcript");
            return false;
        };

        last.content.push_str(delta);
        self.commit().await;
        true
    }

    /// Extends the newest message of the conversation behind `key`.
    ///
    /// Returns `false` when the conversation is gone or has no messages.
    pub async fn append_to_last_message_of(&mut self, key: ConversationKey, delta: &str) -> bool {
        let Some(index) = self.index_of(key) else {
            return false;
        };

        let messages = if index == self.active {
            &mut self.transcript
        } else {
            &mut self.conversations[index].messages
        };
        let Some(last) = messages.last_mut() else {
            tracing::warn!(index, "cannot extend last message of an empty transcript");
            return false;
        };

        last.content.push_str(delta);
        self.commit().await;
        true
    }

    /// Writes the active transcript into its slot and persists the whole list.
    ///
    /// Returns whether the snapshot reached durable storage; the in-memory
    /// state is updated either way.
    pub async fn commit(&mut self) -> bool {
        self.sync_active_slot();
        self.durable.save(&self.conversations).await
    }

    fn sync_active_slot(&mut self) {
        if let Some(slot) = self.conversations.get_mut(self.active) {
            slot.messages.clone_from(&self.transcript);
        }
    }

    fn mint_key(&mut self) -> ConversationKey {
        let key = ConversationKey(self.next_key);
        self.next_key += 1;
        key
    }
}
