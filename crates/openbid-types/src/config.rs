//! Configuration for the OpenBid engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{RetryPolicy, constants};

/// Tuning knobs for the bidding engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum wait for an auction's exclusive section before giving up
    /// with a lease timeout.
    pub lease_timeout: Duration,
    /// Retry schedule for store commits inside the exclusive section.
    pub commit_retry: RetryPolicy,
    /// How long a terminal auction's gate must sit unused before the
    /// registry may evict it.
    pub idle_eviction: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lease_timeout: Duration::from_millis(constants::DEFAULT_LEASE_TIMEOUT_MS),
            commit_retry: RetryPolicy::default(),
            idle_eviction: Duration::from_secs(constants::DEFAULT_IDLE_EVICTION_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_config_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.lease_timeout.as_millis(), 250);
        assert_eq!(cfg.commit_retry.max_attempts, 3);
        assert_eq!(cfg.idle_eviction.as_secs(), 300);
    }

    #[test]
    fn engine_config_serde_roundtrip() {
        let cfg = EngineConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.lease_timeout, back.lease_timeout);
        assert_eq!(cfg.commit_retry, back.commit_retry);
        assert_eq!(cfg.idle_eviction, back.idle_eviction);
    }
}
