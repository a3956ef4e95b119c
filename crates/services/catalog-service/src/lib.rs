//! Catalog Service Library
//!
//! In-memory donation listings with simulated latency, plus the search,
//! statistics and lifecycle rules the screens build on. Independent of the
//! session layer: donor attribution arrives with the submission form.

pub mod config;
pub mod query;
pub mod repository;
pub mod service;
pub mod workflow;

use std::sync::Arc;

use tracing::info;

use crate::config::CatalogServiceConfig;
use crate::repository::ProductStore;
use crate::service::CatalogManager;
use crate::workflow::ListingWorkflow;

/// Catalog service and the workflow layered on it.
pub struct CatalogComponents {
    pub service: Arc<CatalogManager>,
    pub workflow: ListingWorkflow,
}

/// Build the catalog layer from configuration.
pub fn bootstrap(config: &CatalogServiceConfig) -> CatalogComponents {
    let store = if config.seed_demo {
        ProductStore::seeded()
    } else {
        ProductStore::new()
    };
    info!(seeded = config.seed_demo, "Catalog ready");

    let service = Arc::new(CatalogManager::new(Arc::new(store), config.latency));
    CatalogComponents {
        workflow: ListingWorkflow::new(service.clone()),
        service,
    }
}
