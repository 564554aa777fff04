//! Stimulus gateway -- the external aversive-feedback device API.
//!
//! The engine only ever sees the [`StimulusGateway`] trait; the HTTP
//! implementation targets the device cloud's v5 stimulus endpoint with a
//! bearer credential. 2xx is success, anything else is classified by
//! [`GatewayError::is_transient`] for the worker's retry decision.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use url::Url;

use crate::error::{CoreError, GatewayError, Result};
use crate::pact::StimulusType;
use crate::storage::GatewayConfig;

/// Keyring key holding the gateway bearer token.
pub const ACCESS_TOKEN_KEY: &str = "gateway_access_token";

/// Thin wrapper around the OS keyring for credential storage.
pub mod keyring_store {
    const SERVICE: &str = "voluntad";

    pub fn get(key: &str) -> Result<Option<String>, Box<dyn std::error::Error>> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set(key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        entry.set_password(value)?;
        Ok(())
    }

    pub fn delete(key: &str) -> Result<(), Box<dyn std::error::Error>> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Dispatch surface the enforcement worker depends on.
pub trait StimulusGateway: Send + Sync {
    /// Deliver one stimulus. Success means the gateway returned 2xx;
    /// there is no delivery guarantee beyond that.
    fn send_stimulus(
        &self,
        stimulus: StimulusType,
        intensity: u8,
        reason: &str,
    ) -> impl std::future::Future<Output = Result<(), GatewayError>> + Send;
}

/// HTTP client for the device cloud.
pub struct HttpStimulusGateway {
    client: Client,
    base_url: Url,
    token: String,
}

impl HttpStimulusGateway {
    /// Build a gateway against the given base URL.
    pub fn new(base_url: &str, token: String, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CoreError::Custom(format!("invalid gateway base URL: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GatewayError::from)?;
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Build a gateway from configuration. The bearer token comes from the
    /// config override when set, otherwise from the OS keyring.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let token = match &config.access_token {
            Some(token) => token.clone(),
            None => keyring_store::get(ACCESS_TOKEN_KEY)
                .map_err(|e| CoreError::Credentials(e.to_string()))?
                .ok_or(GatewayError::MissingCredential)?,
        };
        Self::new(
            &config.base_url,
            token,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base_url
            .join(path)
            .map_err(|e| GatewayError::Network(e.to_string()))
    }

    /// Connectivity and credential check: fetch the account behind the
    /// token and return its email.
    pub async fn verify(&self) -> Result<String, GatewayError> {
        let url = self.endpoint("api/v5/user")?;
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(GatewayError::Auth {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let user: serde_json::Value = resp.json().await?;
        Ok(user
            .get("email")
            .and_then(|v| v.as_str())
            .unwrap_or("<unknown>")
            .to_string())
    }
}

impl StimulusGateway for HttpStimulusGateway {
    async fn send_stimulus(
        &self,
        stimulus: StimulusType,
        intensity: u8,
        reason: &str,
    ) -> Result<(), GatewayError> {
        let url = self.endpoint("api/v5/stimulus/send")?;
        let body = json!({
            "stimulus": {
                "stimulusType": stimulus.wire_name(),
                "stimulusValue": intensity,
                "reason": reason,
            }
        });

        tracing::debug!(%stimulus, intensity, "dispatching stimulus");
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            tracing::info!(%stimulus, intensity, code = status.as_u16(), "stimulus delivered");
            return Ok(());
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(GatewayError::Auth {
                status: status.as_u16(),
            });
        }
        let body = resp.text().await.unwrap_or_default();
        tracing::error!(code = status.as_u16(), %body, "stimulus rejected");
        Err(GatewayError::Http {
            status: status.as_u16(),
            body,
        })
    }
}
