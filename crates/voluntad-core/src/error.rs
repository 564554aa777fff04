//! Core error types for voluntad-core.
//!
//! The gateway error carries the transient/permanent classification that
//! drives the enforcement worker's retry decision.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for voluntad-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Stimulus gateway errors
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Scheduling errors
    #[error("schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Credential store errors
    #[error("credential store error: {0}")]
    Credentials(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors from the external stimulus gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The gateway rejected the request.
    #[error("stimulus rejected (HTTP {status}): {body}")]
    Http { status: u16, body: String },

    /// The bearer credential was rejected.
    #[error("authentication rejected (HTTP {status})")]
    Auth { status: u16 },

    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// No bearer credential is configured.
    #[error("no gateway access token configured")]
    MissingCredential,
}

impl GatewayError {
    /// Whether the worker should retry the same invocation.
    ///
    /// Network failures and server-side errors are transient; rejected
    /// requests and auth failures are permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::Network(_) => true,
            GatewayError::Http { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            GatewayError::Auth { .. } | GatewayError::MissingCredential => false,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Network(err.to_string())
    }
}

/// Errors when computing or registering the enforcement trigger.
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// Hour/minute pair out of range
    #[error("invalid check time {hour:02}:{minute:02}")]
    InvalidTime { hour: u8, minute: u8 },

    /// The target wall-clock time does not exist in the local timezone
    #[error("cannot resolve local time {0}")]
    UnresolvableLocalTime(chrono::NaiveDateTime),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown configuration key
    #[error("unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        assert!(GatewayError::Http { status: 500, body: String::new() }.is_transient());
        assert!(GatewayError::Http { status: 503, body: String::new() }.is_transient());
        assert!(GatewayError::Http { status: 429, body: String::new() }.is_transient());
        assert!(GatewayError::Network("connection refused".into()).is_transient());
    }

    #[test]
    fn rejections_are_permanent() {
        assert!(!GatewayError::Http { status: 400, body: String::new() }.is_transient());
        assert!(!GatewayError::Http { status: 422, body: String::new() }.is_transient());
        assert!(!GatewayError::Auth { status: 401 }.is_transient());
        assert!(!GatewayError::MissingCredential.is_transient());
    }
}
