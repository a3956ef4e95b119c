//! Two-tier identity persistence.
//!
//! "Remember me" sign-ins go to the durable tier, everything else to the
//! ephemeral tier. Writing one tier clears the session keys from the other,
//! so at most one persisted identity exists at a time.

use std::sync::Arc;

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use common::AppResult;
use domain::{User, STORAGE_KEY_CURRENT_USER, STORAGE_KEY_TOKEN, TOKEN_PREFIX};

use super::{KeyValueStore, MemoryStore};

/// Storage tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Survives restarts
    Durable,
    /// Lives as long as the process
    Ephemeral,
}

impl Tier {
    pub fn from_remember_me(remember_me: bool) -> Self {
        if remember_me {
            Tier::Durable
        } else {
            Tier::Ephemeral
        }
    }

    fn other(self) -> Self {
        match self {
            Tier::Durable => Tier::Ephemeral,
            Tier::Ephemeral => Tier::Durable,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Durable => write!(f, "durable"),
            Tier::Ephemeral => write!(f, "ephemeral"),
        }
    }
}

/// Session keys stored in either tier
const SESSION_KEYS: [&str; 2] = [STORAGE_KEY_CURRENT_USER, STORAGE_KEY_TOKEN];

/// Durable and ephemeral stores addressed by tier.
#[derive(Clone)]
pub struct SessionStorage {
    durable: Arc<dyn KeyValueStore>,
    ephemeral: Arc<dyn KeyValueStore>,
}

impl SessionStorage {
    pub fn new(durable: Arc<dyn KeyValueStore>, ephemeral: Arc<dyn KeyValueStore>) -> Self {
        Self { durable, ephemeral }
    }

    /// Both tiers in memory
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    pub fn tier(&self, tier: Tier) -> &dyn KeyValueStore {
        match tier {
            Tier::Durable => self.durable.as_ref(),
            Tier::Ephemeral => self.ephemeral.as_ref(),
        }
    }

    /// Shared handle to the durable store
    pub fn durable(&self) -> Arc<dyn KeyValueStore> {
        self.durable.clone()
    }

    // =========================================================================
    // Typed Operations
    // =========================================================================

    /// Read and deserialize a JSON value
    pub fn get_json<T: DeserializeOwned>(&self, tier: Tier, key: &str) -> AppResult<Option<T>> {
        match self.tier(tier).get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serialize and write a JSON value
    pub fn set_json<T: Serialize>(&self, tier: Tier, key: &str, value: &T) -> AppResult<()> {
        let raw = serde_json::to_string(value)?;
        self.tier(tier).set(key, &raw)
    }

    // =========================================================================
    // Session Operations
    // =========================================================================

    /// Persist `user` and a fresh token to `tier`, clearing the other tier.
    pub fn persist(&self, user: &User, tier: Tier) -> AppResult<()> {
        self.set_json(tier, STORAGE_KEY_CURRENT_USER, user)?;
        self.tier(tier).set(STORAGE_KEY_TOKEN, &issue_token())?;
        self.clear_tier(tier.other())?;

        info!(email = %user.email, tier = %tier, "Persisted session");
        Ok(())
    }

    /// Load the persisted identity, preferring the durable tier.
    ///
    /// A record that fails to deserialize is returned as an error; the
    /// caller decides whether to clear storage.
    pub fn load(&self) -> AppResult<Option<(User, Tier)>> {
        for tier in [Tier::Durable, Tier::Ephemeral] {
            if let Some(user) = self.get_json::<User>(tier, STORAGE_KEY_CURRENT_USER)? {
                debug!(email = %user.email, tier = %tier, "Found stored identity");
                return Ok(Some((user, tier)));
            }
        }
        Ok(None)
    }

    /// Token stored alongside the identity in `tier`
    pub fn token(&self, tier: Tier) -> AppResult<Option<String>> {
        self.tier(tier).get(STORAGE_KEY_TOKEN)
    }

    /// Remove the session keys from both tiers
    pub fn clear(&self) -> AppResult<()> {
        self.clear_tier(Tier::Durable)?;
        self.clear_tier(Tier::Ephemeral)?;
        debug!("Cleared session storage");
        Ok(())
    }

    fn clear_tier(&self, tier: Tier) -> AppResult<()> {
        let store = self.tier(tier);
        for key in SESSION_KEYS {
            store.remove(key)?;
        }
        Ok(())
    }
}

/// Opaque placeholder token. Never validated.
fn issue_token() -> String {
    format!("{}{}", TOKEN_PREFIX, Utc::now().timestamp_millis())
}
