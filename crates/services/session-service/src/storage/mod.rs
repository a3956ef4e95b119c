//! Key-value storage tiers backing the session.

mod file_store;
mod key_value;
mod session_storage;

pub use file_store::FileStore;
pub use key_value::{KeyValueStore, MemoryStore};
pub use session_storage::{SessionStorage, Tier};

#[cfg(any(test, feature = "test-utils"))]
pub use key_value::MockKeyValueStore;
