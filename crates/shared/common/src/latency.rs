//! Simulated round-trip delays.
//!
//! Every service operation resolves after a fixed nominal delay. Dropping the
//! returned future cancels the wait.

use std::time::Duration;

use crate::config::LatencyConfig;

/// Nominal delays, in milliseconds, used by the services
pub mod delays {
    pub const LOGIN_MS: u64 = 800;
    pub const REGISTER_MS: u64 = 1500;
    pub const DUPLICATE_REGISTER_MS: u64 = 800;
    pub const PROFILE_UPDATE_MS: u64 = 800;
    pub const PROMOTE_MS: u64 = 800;
    pub const PASSWORD_MS: u64 = 1000;

    pub const LIST_PRODUCTS_MS: u64 = 500;
    pub const LOOKUP_PRODUCT_MS: u64 = 300;
    pub const ADD_PRODUCT_MS: u64 = 800;
    pub const UPDATE_PRODUCT_MS: u64 = 500;
    pub const DELETE_PRODUCT_MS: u64 = 300;
    pub const USER_PRODUCTS_MS: u64 = 500;
    pub const FILTER_PRODUCTS_MS: u64 = 300;
}

/// Sleep for `millis` scaled by the latency configuration.
pub async fn simulate(config: &LatencyConfig, millis: u64) {
    let delay = config.apply(Duration::from_millis(millis));
    if delay.is_zero() {
        return;
    }
    tokio::time::sleep(delay).await;
}
