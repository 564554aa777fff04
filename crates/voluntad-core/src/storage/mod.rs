mod blobs;
mod config;

pub use config::{Config, EnforcementConfig, GatewayConfig};

pub(crate) use blobs::{read_json, write_json};

use std::path::PathBuf;

/// Returns `~/.config/voluntad[-dev]/` based on VOLUNTAD_ENV.
///
/// Set VOLUNTAD_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("VOLUNTAD_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("voluntad-dev")
    } else {
        base_dir.join("voluntad")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
