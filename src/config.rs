//! Configuration for point factories and store fronts.
//!
//! # Example
//!
//! ```rust
//! use pointstore::Config;
//!
//! let json = r#"{
//!     "resolution": { "precision": 16, "shift": 16 },
//!     "stream_buffer": 128
//! }"#;
//! let config = Config::from_json(json)?;
//! assert_eq!(config.stream_buffer, 128);
//! # Ok::<(), pointstore::PointStoreError>(())
//! ```

use crate::error::{PointStoreError, Result};
use crate::point::Resolution;
use serde::{Deserialize, Serialize};

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Fixed grid resolution for factories built from this config.
    /// `None` keeps every coordinate bit.
    #[serde(default)]
    pub resolution: Option<Resolution>,

    /// Channel capacity for asynchronous region streams.
    #[serde(default = "Config::default_stream_buffer")]
    pub stream_buffer: usize,
}

impl Config {
    const fn default_stream_buffer() -> usize {
        64
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn with_stream_buffer(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Stream buffer must be greater than zero");
        self.stream_buffer = capacity;
        self
    }

    /// Checks values that serde alone cannot enforce.
    pub fn validate(&self) -> Result<()> {
        if self.stream_buffer == 0 {
            return Err(PointStoreError::InvalidInput(
                "stream_buffer must be greater than zero".into(),
            ));
        }
        if let Some(resolution) = self.resolution {
            resolution.validate()?;
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolution: None,
            stream_buffer: Self::default_stream_buffer(),
        }
    }
}
