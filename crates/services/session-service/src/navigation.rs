//! Navigation requests issued by the session service and the guards.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use tracing::info;

use domain::NavigationTarget;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Receives navigation requests.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: NavigationTarget);
}

/// Entries kept by `NavigationHistory::new`
pub const HISTORY_LIMIT: usize = 50;

/// Navigator that records where the application was sent, keeping the
/// most recent entries only.
#[derive(Debug)]
pub struct NavigationHistory {
    visited: Mutex<VecDeque<NavigationTarget>>,
    limit: usize,
}

impl NavigationHistory {
    pub fn new() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }

    /// Keep at most `limit` entries (at least one)
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            visited: Mutex::new(VecDeque::with_capacity(limit)),
            limit,
        }
    }

    fn entries(&self) -> MutexGuard<'_, VecDeque<NavigationTarget>> {
        // A panic while pushing cannot leave the deque half-written.
        self.visited
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Most recent navigation, if any
    pub fn current(&self) -> Option<NavigationTarget> {
        self.entries().back().cloned()
    }

    /// Oldest first
    pub fn history(&self) -> Vec<NavigationTarget> {
        self.entries().iter().cloned().collect()
    }
}

impl Default for NavigationHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for NavigationHistory {
    fn navigate(&self, target: NavigationTarget) {
        info!(url = %target.url(), "Navigating");
        let mut entries = self.entries();
        if entries.len() == self.limit {
            entries.pop_front();
        }
        entries.push_back(target);
    }
}
