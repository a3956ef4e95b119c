//! Session service configuration.

use std::env;
use std::path::PathBuf;

use common::{parse_list, LatencyConfig};

/// Session service configuration.
#[derive(Debug, Clone)]
pub struct SessionServiceConfig {
    /// Extra admin emails appended to the compiled-in allow-list
    pub extra_admin_emails: Vec<String>,
    /// Directory holding the durable session file; in-memory when unset
    pub storage_dir: Option<PathBuf>,
    /// Simulated round-trip delays
    pub latency: LatencyConfig,
}

impl SessionServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            extra_admin_emails: env::var("ADMIN_EMAILS")
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
            storage_dir: env::var("SESSION_STORAGE_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            latency: LatencyConfig::from_env(),
        }
    }

    /// Location of the durable session file, if any
    pub fn durable_file(&self) -> Option<PathBuf> {
        self.storage_dir.as_ref().map(|dir| dir.join(DURABLE_FILE_NAME))
    }
}

impl Default for SessionServiceConfig {
    fn default() -> Self {
        Self {
            extra_admin_emails: Vec::new(),
            storage_dir: None,
            latency: LatencyConfig::default(),
        }
    }
}

/// File name of the durable tier inside `storage_dir`
pub const DURABLE_FILE_NAME: &str = "local-storage.json";
