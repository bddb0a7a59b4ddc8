//! Configuration Module
//!
//! Handles loading and validating cache construction options from environment variables.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::{
    DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR, DEFAULT_LRU_CAPACITY, DEFAULT_TTL_MS,
};
use crate::error::{CacheError, Result};

/// Cache construction parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Age in milliseconds after which a TTL map entry is treated as absent
    pub time_to_live_ms: u64,
    /// Initial bucket count of the TTL map, must be a power of two
    pub initial_capacity: usize,
    /// Occupancy ratio that doubles the TTL map's bucket count
    pub load_factor: f32,
    /// Maximum number of live entries in the LRU cache
    pub lru_capacity: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_MS` - Entry time-to-live in milliseconds (default: 60000)
    /// - `CACHE_INITIAL_CAPACITY` - Initial bucket count (default: 8)
    /// - `CACHE_LOAD_FACTOR` - Resize threshold (default: 0.75)
    /// - `LRU_CAPACITY` - LRU cache capacity (default: 1000)
    ///
    /// Missing or unparsable values fall back to their defaults. Call
    /// [`Config::validate`] before handing the result to a constructor.
    pub fn from_env() -> Self {
        Self {
            time_to_live_ms: env::var("CACHE_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TTL_MS),
            initial_capacity: env::var("CACHE_INITIAL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_INITIAL_CAPACITY),
            load_factor: env::var("CACHE_LOAD_FACTOR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_LOAD_FACTOR),
            lru_capacity: env::var("LRU_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_LRU_CAPACITY),
        }
    }

    // == Time To Live ==
    /// Returns the configured time-to-live as a `Duration`.
    pub fn time_to_live(&self) -> Duration {
        Duration::from_millis(self.time_to_live_ms)
    }

    // == Validate ==
    /// Checks every option, returning the first violation found.
    pub fn validate(&self) -> Result<()> {
        validate_bucket_count(self.initial_capacity)?;
        validate_load_factor(self.load_factor)?;
        validate_capacity(self.lru_capacity)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_to_live_ms: DEFAULT_TTL_MS,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
            lru_capacity: DEFAULT_LRU_CAPACITY,
        }
    }
}

// == Validation Helpers ==
/// Bucket indexing masks with `count - 1`, so the count must be a power of two.
pub(crate) fn validate_bucket_count(count: usize) -> Result<()> {
    if count.is_power_of_two() {
        Ok(())
    } else {
        Err(CacheError::InvalidCapacity(format!(
            "bucket count must be a power of two, got {}",
            count
        )))
    }
}

pub(crate) fn validate_load_factor(load_factor: f32) -> Result<()> {
    if load_factor.is_finite() && load_factor > 0.0 {
        Ok(())
    } else {
        Err(CacheError::InvalidLoadFactor(format!(
            "load factor must be finite and positive, got {}",
            load_factor
        )))
    }
}

pub(crate) fn validate_capacity(capacity: usize) -> Result<()> {
    if capacity == 0 {
        return Err(CacheError::InvalidCapacity(
            "capacity must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.time_to_live_ms, 60_000);
        assert_eq!(config.initial_capacity, 8);
        assert_eq!(config.load_factor, 0.75);
        assert_eq!(config.lru_capacity, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_TTL_MS");
        env::remove_var("CACHE_INITIAL_CAPACITY");
        env::remove_var("CACHE_LOAD_FACTOR");
        env::remove_var("LRU_CAPACITY");

        let config = Config::from_env();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_time_to_live() {
        let config = Config {
            time_to_live_ms: 1500,
            ..Config::default()
        };
        assert_eq!(config.time_to_live(), Duration::from_millis(1500));
    }

    #[test]
    fn test_validate_rejects_non_power_of_two() {
        let config = Config {
            initial_capacity: 12,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidCapacity(_))
        ));

        let config = Config {
            initial_capacity: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidCapacity(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_load_factor() {
        for load_factor in [0.0, -0.5, f32::NAN, f32::INFINITY] {
            let config = Config {
                load_factor,
                ..Config::default()
            };
            assert!(matches!(
                config.validate(),
                Err(CacheError::InvalidLoadFactor(_))
            ));
        }
    }

    #[test]
    fn test_validate_rejects_zero_lru_capacity() {
        let config = Config {
            lru_capacity: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidCapacity(_))
        ));
    }

    #[test]
    fn test_config_deserialize_with_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"time_to_live_ms": 500, "lru_capacity": 2}"#).unwrap();
        assert_eq!(config.time_to_live_ms, 500);
        assert_eq!(config.lru_capacity, 2);
        assert_eq!(config.initial_capacity, 8);
        assert_eq!(config.load_factor, 0.75);
    }
}
