//! Shared configuration structures.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Simulated network latency applied by the in-process services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct LatencyConfig {
    /// When false every simulated delay resolves immediately
    pub enabled: bool,
    /// Percentage applied to each nominal delay (100 = as specified)
    pub scale_percent: u32,
}

impl LatencyConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env::var("SIMULATED_LATENCY")
                .ok()
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.enabled),
            scale_percent: env::var("LATENCY_SCALE_PERCENT")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.scale_percent),
        }
    }

    /// No delays at all. Used by tests and scripted runs.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            scale_percent: 0,
        }
    }

    /// Effective delay for a nominal duration
    pub fn apply(&self, nominal: Duration) -> Duration {
        if !self.enabled {
            return Duration::ZERO;
        }
        nominal * self.scale_percent / 100
    }
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scale_percent: 100,
        }
    }
}

/// Interpret common truthy spellings; anything else is false.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Split a comma separated environment value, dropping blanks.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaling() {
        let half = LatencyConfig {
            enabled: true,
            scale_percent: 50,
        };
        assert_eq!(half.apply(Duration::from_millis(800)), Duration::from_millis(400));
        assert_eq!(
            LatencyConfig::default().apply(Duration::from_millis(300)),
            Duration::from_millis(300)
        );
    }

    #[test]
    fn test_disabled_is_zero() {
        let config = LatencyConfig::disabled();
        assert_eq!(config.apply(Duration::from_millis(1500)), Duration::ZERO);
    }

    #[test]
    fn test_parse_helpers() {
        assert!(parse_flag(" TRUE "));
        assert!(parse_flag("1"));
        assert!(!parse_flag("off"));
        assert_eq!(
            parse_list("a@x.com, ,b@y.org,"),
            vec!["a@x.com".to_string(), "b@y.org".to_string()]
        );
    }
}
