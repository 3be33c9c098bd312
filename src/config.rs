//! Store configuration
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! name = "sessions"
//! initial_capacity = 4096
//! metrics = true
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound for `initial_capacity` (2^24 slots)
///
/// Reservation is eager across the table, key index and recency heap; larger
/// stores still grow past this on demand.
pub const MAX_INITIAL_CAPACITY: usize = 1 << 24;

fn default_name() -> String {
    "kdb".into()
}

fn default_metrics() -> bool {
    true
}

/// Configuration for a [`Kdb`](crate::Kdb) store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Label used in log fields and metric labels
    pub name: String,
    /// Slots reserved up front in the table, key index and recency heap
    pub initial_capacity: usize,
    /// Record Prometheus counters for this store
    pub metrics: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            initial_capacity: 0,
            metrics: default_metrics(),
        }
    }
}

impl StoreConfig {
    /// Create a config with a specific name (other fields default)
    pub fn with_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::ConfigParse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| Error::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidConfig("store name must not be empty".into()));
        }
        if self.initial_capacity > MAX_INITIAL_CAPACITY {
            return Err(Error::InvalidConfig(format!(
                "initial_capacity {} exceeds maximum {}",
                self.initial_capacity, MAX_INITIAL_CAPACITY
            )));
        }
        Ok(())
    }
}
