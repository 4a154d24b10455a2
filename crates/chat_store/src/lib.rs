mod backend;
mod error;
mod paths;
mod schema;
mod seed;
mod store;

pub use backend::{BoxFuture, FileBackend, MemoryBackend, StorageBackend};
pub use error::ChatStoreError;
pub use paths::{key_file_name, store_root, STORE_DIR};
pub use schema::{Conversation, Message, Role, StoredChat, DEFAULT_TITLE};
pub use seed::{bundled_seed, load_seed_file, parse_seed};
pub use store::{DurableStore, CHATS_KEY};
