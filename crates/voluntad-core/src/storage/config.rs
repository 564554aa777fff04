//! TOML-based application configuration.
//!
//! Stores operator settings:
//! - Gateway base URL, request timeout, and an optional access-token
//!   override (the token normally lives in the OS keyring)
//! - Enforcement retry policy and diagnostic flags
//!
//! Configuration is stored at `~/.config/voluntad/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// Stimulus gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Bearer token override. When unset, the token is read from the
    /// OS keyring.
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Enforcement worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnforcementConfig {
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,
    #[serde(default = "default_retry_backoff_secs")]
    pub retry_backoff_secs: u64,
    /// Diagnostic override: run the check even when today is already
    /// marked enforced. Bypasses only the zap-sent skip.
    #[serde(default)]
    pub override_already_enforced: bool,
    /// Pin the escalation roll for reproducing dispatch intensities.
    #[serde(default)]
    pub escalation_seed: Option<u64>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/voluntad/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub enforcement: EnforcementConfig,
}

// Default functions
fn default_base_url() -> String {
    "https://api.pavlok.com".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_retry_max_attempts() -> u32 {
    3
}
fn default_retry_backoff_secs() -> u64 {
    30
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            access_token: None,
        }
    }
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            retry_max_attempts: default_retry_max_attempts(),
            retry_backoff_secs: default_retry_backoff_secs(),
            override_already_enforced: false,
            escalation_seed: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            enforcement: EnforcementConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/voluntad"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let pointer = format!("/{}", key.replace('.', "/"));
        match json.pointer(&pointer)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. Returns an error if the key
    /// is unknown or the value does not parse as the field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        let pointer = format!("/{}", key.replace('.', "/"));
        let slot = json
            .pointer_mut(&pointer)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let parse_err = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        *slot = match &*slot {
            serde_json::Value::Bool(_) => {
                serde_json::Value::Bool(value.parse().map_err(|_| {
                    parse_err(format!("cannot parse '{value}' as bool"))
                })?)
            }
            serde_json::Value::Number(_) => {
                let n: u64 = value
                    .parse()
                    .map_err(|_| parse_err(format!("cannot parse '{value}' as number")))?;
                serde_json::Value::Number(n.into())
            }
            serde_json::Value::String(_) => serde_json::Value::String(value.to_string()),
            // Optional fields deserialize from null; numbers first, then text.
            serde_json::Value::Null => match value.parse::<u64>() {
                Ok(n) => serde_json::Value::Number(n.into()),
                Err(_) => serde_json::Value::String(value.to_string()),
            },
            _ => return Err(parse_err("cannot set a structured value".into())),
        };

        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}
