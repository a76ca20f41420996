//! Codec configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via MQWIRE_CONFIG)
//! 3. Environment variables

use crate::codec::{Decoder, EncodeOptions, Settings};
use crate::constants::is_supported_version;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Seeds for the decoder and defaults for the encoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Version assumed before a CONNECT is decoded. Unset means 4.
    pub protocol_version: Option<u8>,
    /// Decode as if the peer announced bridge mode.
    pub bridge_mode: bool,
    /// Version used when encoding anything but CONNECT.
    pub encode_protocol_version: u8,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            protocol_version: None,
            bridge_mode: false,
            encode_protocol_version: 4,
        }
    }
}

impl CodecConfig {
    /// Loads configuration from file, then applies environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("MQWIRE_CONFIG") {
            config = Self::from_file(&path)?;
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: CodecConfig = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: CodecConfig = serde_yaml::from_str(yaml)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(version) = var("MQWIRE_PROTOCOL_VERSION") {
            if let Ok(v) = version.parse() {
                self.protocol_version = Some(v);
            }
        }

        if let Some(bridge) = var("MQWIRE_BRIDGE_MODE") {
            self.bridge_mode = bridge == "true" || bridge == "1";
        }

        if let Some(version) = var("MQWIRE_ENCODE_PROTOCOL_VERSION") {
            if let Ok(v) = version.parse() {
                self.encode_protocol_version = v;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(version) = self.protocol_version {
            if !is_supported_version(version) {
                return Err(ConfigError::Validation(format!(
                    "protocol_version must be 3, 4 or 5, got {}",
                    version
                )));
            }
        }
        if !is_supported_version(self.encode_protocol_version) {
            return Err(ConfigError::Validation(format!(
                "encode_protocol_version must be 3, 4 or 5, got {}",
                self.encode_protocol_version
            )));
        }
        Ok(())
    }

    pub fn settings(&self) -> Settings {
        Settings {
            protocol_version: self.protocol_version.unwrap_or(4),
            bridge_mode: self.bridge_mode,
        }
    }

    pub fn decoder(&self) -> Decoder {
        Decoder::with_settings(self.settings())
    }

    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions::new(self.encode_protocol_version)
    }
}

impl Decoder {
    pub fn with_config(config: &CodecConfig) -> Self {
        config.decoder()
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file '{}': {}", .0.display(), .1)]
    Parse(PathBuf, String),

    #[error("invalid configuration: {0}")]
    Validation(String),
}
