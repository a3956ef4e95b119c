//! Session Service Library
//!
//! Current-user identity, role derivation from the admin allow-list,
//! two-tier persistence and the reactive identity stream. Embedded by the
//! combined binary and consumed by the route guards.

pub mod config;
pub mod identity;
pub mod navigation;
pub mod repository;
pub mod roster;
pub mod service;
pub mod settings_store;
pub mod storage;

use std::sync::Arc;

use tracing::info;

use common::AppResult;

use crate::config::SessionServiceConfig;
use crate::navigation::NavigationHistory;
use crate::repository::InMemoryDirectory;
use crate::roster::AdminRoster;
use crate::service::SessionManager;
use crate::settings_store::SettingsStore;
use crate::storage::{FileStore, KeyValueStore, MemoryStore, SessionStorage};

/// Everything the session layer wires together.
pub struct SessionComponents {
    pub service: Arc<SessionManager>,
    pub roster: Arc<AdminRoster>,
    pub navigator: Arc<NavigationHistory>,
    pub settings: SettingsStore,
    pub storage: SessionStorage,
}

/// Build the session layer from configuration and restore any stored session.
pub async fn bootstrap(config: &SessionServiceConfig) -> AppResult<SessionComponents> {
    let durable: Arc<dyn KeyValueStore> = match config.durable_file() {
        Some(path) => {
            info!(path = %path.display(), "Using file-backed durable storage");
            Arc::new(FileStore::open(path)?)
        }
        None => Arc::new(MemoryStore::new()),
    };
    let storage = SessionStorage::new(durable, Arc::new(MemoryStore::new()));

    let roster = Arc::new(AdminRoster::with_defaults(&config.extra_admin_emails));
    let navigator = Arc::new(NavigationHistory::new());
    let directory = Arc::new(InMemoryDirectory::seeded());

    let service = SessionManager::start(
        directory,
        roster.clone(),
        storage.clone(),
        navigator.clone(),
        config.latency,
    )
    .await;

    Ok(SessionComponents {
        service: Arc::new(service),
        roster,
        navigator,
        settings: SettingsStore::new(storage.durable()),
        storage,
    })
}
