//! Catalog service configuration.

use std::env;

use common::{parse_flag, LatencyConfig};

/// Catalog service configuration.
#[derive(Debug, Clone)]
pub struct CatalogServiceConfig {
    /// Start with the three demo listings
    pub seed_demo: bool,
    /// Simulated round-trip delays
    pub latency: LatencyConfig,
}

impl CatalogServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            seed_demo: env::var("CATALOG_SEED_DEMO")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
            latency: LatencyConfig::from_env(),
        }
    }
}

impl Default for CatalogServiceConfig {
    fn default() -> Self {
        Self {
            seed_demo: true,
            latency: LatencyConfig::default(),
        }
    }
}
