//! Store configuration.
//!
//! The mock store waits a simulated network latency before answering every
//! call. The default is a fixed half-second; tests use
//! [`StoreConfig::instant`].

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Mock store configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    /// Lower bound of the simulated latency window, in milliseconds.
    pub latency_min_ms: u64,

    /// Upper bound of the simulated latency window, in milliseconds.
    pub latency_max_ms: u64,

    /// Capacity of the change event channel.
    pub event_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            latency_min_ms: 500,
            latency_max_ms: 500,
            event_capacity: 1024,
        }
    }
}

impl StoreConfig {
    /// No simulated latency. Calls still yield to the scheduler once.
    pub fn instant() -> Self {
        Self {
            latency_min_ms: 0,
            latency_max_ms: 0,
            ..Self::default()
        }
    }

    /// A fixed latency for every call.
    pub fn fixed(latency: Duration) -> Self {
        let ms = latency.as_millis() as u64;
        Self {
            latency_min_ms: ms,
            latency_max_ms: ms,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ROLEGRAPH_STORE_LATENCY_MS`: lower (and, alone, fixed) latency (default: 500)
    /// - `ROLEGRAPH_STORE_LATENCY_MAX_MS`: upper latency bound (default: the lower bound)
    /// - `ROLEGRAPH_EVENT_CAPACITY`: change event channel capacity (default: 1024)
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();

        let latency_min_ms =
            parse_env("ROLEGRAPH_STORE_LATENCY_MS")?.unwrap_or(default.latency_min_ms);
        let latency_max_ms = parse_env("ROLEGRAPH_STORE_LATENCY_MAX_MS")?.unwrap_or(latency_min_ms);
        let event_capacity =
            parse_env("ROLEGRAPH_EVENT_CAPACITY")?.unwrap_or(default.event_capacity);

        let config = Self {
            latency_min_ms,
            latency_max_ms,
            event_capacity,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the latency window and channel capacity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.latency_max_ms < self.latency_min_ms {
            return Err(ConfigError::InvalidValue {
                key: "ROLEGRAPH_STORE_LATENCY_MAX_MS".to_string(),
                message: format!(
                    "upper bound {} is below lower bound {}",
                    self.latency_max_ms, self.latency_min_ms
                ),
            });
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "ROLEGRAPH_EVENT_CAPACITY".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Pick a latency from the configured window.
    pub fn sample_latency(&self) -> Duration {
        use rand::Rng;

        let ms = if self.latency_max_ms > self.latency_min_ms {
            rand::thread_rng().gen_range(self.latency_min_ms..=self.latency_max_ms)
        } else {
            self.latency_min_ms
        };
        Duration::from_millis(ms)
    }
}

/// Read and parse an optional environment variable.
pub fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
