//! Settings blobs persisted to the durable tier.

use std::sync::Arc;

use tracing::{debug, warn};

use common::AppResult;
use domain::SettingsBlob;

use crate::storage::KeyValueStore;

/// Reads and writes settings blobs under their fixed storage keys.
#[derive(Clone)]
pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load a blob. Missing or unreadable blobs yield the defaults.
    pub fn load<T: SettingsBlob>(&self) -> T {
        let raw = match self.store.get(T::STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(e) => {
                warn!(key = T::STORAGE_KEY, "Settings could not be read: {}", e);
                return T::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(key = T::STORAGE_KEY, "Ignoring unreadable settings: {}", e);
            T::default()
        })
    }

    pub fn save<T: SettingsBlob>(&self, settings: &T) -> AppResult<()> {
        let raw = serde_json::to_string(settings)?;
        self.store.set(T::STORAGE_KEY, &raw)?;
        debug!(key = T::STORAGE_KEY, "Saved settings");
        Ok(())
    }

    /// Drop the stored blob so the next load yields defaults
    pub fn reset<T: SettingsBlob>(&self) -> AppResult<()> {
        self.store.remove(T::STORAGE_KEY)
    }
}
