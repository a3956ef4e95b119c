//! Common utilities shared across the services.
//!
//! This crate provides:
//! - Unified error handling
//! - Configuration structures
//! - Simulated latency helpers

pub mod config;
pub mod error;
pub mod latency;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
pub use latency::{delays, simulate};
