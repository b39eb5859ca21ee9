//! Cache configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_TTL_SECONDS: u64 = 600;
const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 120;
const DEFAULT_MAX_ENTRIES: usize = 1024;

/// Cache behaviour from `setaccio.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the response cache.
    pub enabled: bool,
    /// Seconds an entry stays servable after insertion.
    pub ttl_seconds: u64,
    /// Seconds between proactive eviction sweeps.
    pub sweep_interval_seconds: u64,
    /// Maximum cached result pages; least-recently-used beyond that.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            sweep_interval_seconds: DEFAULT_SWEEP_INTERVAL_SECONDS,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }

    /// Entry limit as NonZeroUsize, clamping to 1 if zero.
    pub fn max_entries_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.max_entries).unwrap_or(NonZeroUsize::MIN)
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            ttl_seconds: settings.ttl_seconds.get(),
            sweep_interval_seconds: settings.sweep_interval_seconds.get(),
            max_entries: settings.max_entries.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.ttl(), Duration::from_secs(600));
        assert_eq!(config.sweep_interval(), Duration::from_secs(120));
        assert_eq!(config.max_entries, 1024);
    }

    #[test]
    fn non_zero_clamps_to_min() {
        let config = CacheConfig {
            max_entries: 0,
            ..Default::default()
        };
        assert_eq!(config.max_entries_non_zero().get(), 1);
    }
}
