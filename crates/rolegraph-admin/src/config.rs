//! Admin service configuration.
//!
//! Loaded from environment variables with defaults suited to running the
//! console locally against the mock store.

use rolegraph_model::Permission;
use rolegraph_store::config::parse_env;
use rolegraph_store::{ConfigError, StoreConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for [`crate::AdminApi`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminConfig {
    /// Mock store settings.
    pub store: StoreConfig,

    /// Deadline for each API call in milliseconds; `None` waits indefinitely.
    pub operation_timeout_ms: Option<u64>,

    /// Permissions the console offers as checkboxes. The engine accepts any
    /// permission string; this list only drives presentation.
    pub permission_vocabulary: Vec<Permission>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            operation_timeout_ms: None,
            permission_vocabulary: Permission::standard(),
        }
    }
}

impl AdminConfig {
    /// Configuration with no simulated latency, for tests.
    pub fn instant() -> Self {
        Self {
            store: StoreConfig::instant(),
            ..Self::default()
        }
    }

    /// Set the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Get the per-call deadline.
    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout_ms.map(Duration::from_millis)
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables (in addition to those read by [`StoreConfig::from_env`]):
    /// - `ROLEGRAPH_OPERATION_TIMEOUT_MS`: per-call deadline (default: none)
    /// - `ROLEGRAPH_PERMISSIONS`: comma-separated vocabulary (default: `Read,Write,Delete`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let store = StoreConfig::from_env()?;
        let operation_timeout_ms = parse_env("ROLEGRAPH_OPERATION_TIMEOUT_MS")?;
        let permission_vocabulary = match std::env::var("ROLEGRAPH_PERMISSIONS") {
            Ok(raw) => parse_vocabulary(&raw)?,
            Err(_) => Permission::standard(),
        };

        let config = Self {
            store,
            operation_timeout_ms,
            permission_vocabulary,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the store settings and the per-call deadline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.validate()?;
        if self.operation_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "ROLEGRAPH_OPERATION_TIMEOUT_MS".to_string(),
                message: "must be greater than zero; unset it to wait indefinitely".to_string(),
            });
        }
        Ok(())
    }
}

/// Parse a comma-separated permission list, skipping blanks and repeats.
fn parse_vocabulary(raw: &str) -> Result<Vec<Permission>, ConfigError> {
    let mut vocabulary: Vec<Permission> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        let permission = Permission::new(name);
        if !vocabulary.contains(&permission) {
            vocabulary.push(permission);
        }
    }

    if vocabulary.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "ROLEGRAPH_PERMISSIONS".to_string(),
            message: "at least one permission is required".to_string(),
        });
    }
    Ok(vocabulary)
}
