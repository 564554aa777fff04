//! Shared helpers for CLI commands.

use std::sync::Arc;

use voluntad_core::{Config, CoreError, EnforcementWorker, HttpStimulusGateway, PactStore};

pub fn open_store() -> Result<Arc<PactStore>, Box<dyn std::error::Error>> {
    Ok(Arc::new(PactStore::open_default()?))
}

pub fn runtime() -> Result<tokio::runtime::Runtime, Box<dyn std::error::Error>> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

/// Worker wired to the configured gateway.
pub fn build_worker(
    store: Arc<PactStore>,
    config: &Config,
) -> Result<EnforcementWorker<HttpStimulusGateway>, CoreError> {
    let gateway = HttpStimulusGateway::from_config(&config.gateway)?;
    Ok(EnforcementWorker::new(
        store,
        gateway,
        config.enforcement.clone(),
    ))
}

/// Parse "HH:MM" into an hour/minute pair.
pub fn parse_hhmm(value: &str) -> Result<(u8, u8), Box<dyn std::error::Error>> {
    let (hour, minute) = value
        .split_once(':')
        .ok_or_else(|| format!("expected HH:MM, got '{value}'"))?;
    Ok((hour.parse()?, minute.parse()?))
}
