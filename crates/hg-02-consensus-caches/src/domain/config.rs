//! Cache configuration

use super::errors::{CacheError, CacheResult};
use serde::{Deserialize, Serialize};

/// Sizing of the consensus caches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Events retained per participant (the log keeps up to twice this).
    pub participant_events_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            participant_events_size: 5000,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> CacheResult<()> {
        if self.participant_events_size == 0 {
            return Err(CacheError::InvalidConfig(
                "participant_events_size cannot be 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Builder-style method to set the per-participant window
    pub fn with_participant_events_size(mut self, size: usize) -> Self {
        self.participant_events_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CacheConfig::default();
        assert_eq!(config.participant_events_size, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = CacheConfig::new().with_participant_events_size(0);
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));
    }
}
