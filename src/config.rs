//! Runtime configuration.
//!
//! Settings are read from a TOML file. Every field has a default, so an
//! empty file (or no file) is a valid configuration:
//!
//! ```toml
//! [console]
//! address = 0xffffffff
//!
//! [emitter]
//! digits = "suppress_leading"
//! max_sequence_len = 4096
//!
//! [machine]
//! max_cycles = 100000
//! trace = false
//! ```

use crate::device::CONSOLE_ADDRESS;
use crate::emit::DigitPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub console: ConsoleConfig,
    pub emitter: EmitterConfig,
    pub machine: MachineConfig,
}

/// Where the console register lives on the machine bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub address: u32,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self { address: CONSOLE_ADDRESS }
    }
}

/// Emitter behaviour for the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    pub digits: DigitPolicy,
    /// Longest sequence `emit-str` accepts, terminator excluded.
    pub max_sequence_len: usize,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            digits: DigitPolicy::AllPlaces,
            max_sequence_len: 4096,
        }
    }
}

/// Execution limits for the word machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    pub max_cycles: u64,
    pub trace: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            max_cycles: 100_000,
            trace: false,
        }
    }
}

impl Config {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&text)
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.console.address, 0xffff_ffff);
        assert_eq!(config.emitter.digits, DigitPolicy::AllPlaces);
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_toml(
            r#"
            [console]
            address = 0x1000

            [emitter]
            digits = "suppress_leading"
            "#,
        )
        .unwrap();

        assert_eq!(config.console.address, 0x1000);
        assert_eq!(config.emitter.digits, DigitPolicy::SuppressLeading);
        assert_eq!(config.emitter.max_sequence_len, 4096);
        assert_eq!(config.machine, MachineConfig::default());
    }

    #[test]
    fn test_bad_config_is_an_error() {
        assert!(Config::from_toml("[emitter]\ndigits = \"sometimes\"").is_err());
        assert!(Config::load("/nonexistent/mmio-console.toml").is_err());
    }
}
