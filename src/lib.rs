// kdb - in-process key/value store with recycled slots
// Values are reachable by key or by a numeric alias (their slot index)

#![warn(rust_2018_idioms)]

pub mod config;
pub mod metrics;
pub mod storage;

// Re-exports for convenience
pub use config::StoreConfig;
pub use storage::kdb::{Alias, Clock, Kdb, ManualClock, StoreStats, SystemClock};

/// kdb error types
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Invalid alias: {0:?}")]
        InvalidAlias(String),

        #[error("Failed to read config {path}: {source}")]
        ConfigRead {
            path: String,
            #[source]
            source: std::io::Error,
        },

        #[error("Failed to parse config {path}: {message}")]
        ConfigParse { path: String, message: String },

        #[error("Invalid config: {0}")]
        InvalidConfig(String),
    }

    pub type Result<T> = std::result::Result<T, Error>;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_format() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_error_display() {
        let err = error::Error::InvalidAlias("x1".into());
        assert_eq!(err.to_string(), "Invalid alias: \"x1\"");
    }
}
