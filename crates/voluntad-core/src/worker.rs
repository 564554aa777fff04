//! Enforcement worker.
//!
//! Runs when the daily trigger fires:
//!
//! ```text
//! Idle -> Evaluating -> (Skipped | Dispatching -> (Succeeded | Retrying | Failed))
//! ```
//!
//! The automatic check reads the store, decides whether anything is
//! outstanding, rolls the escalation dice on top of the threat level, and
//! dispatches through the gateway. Transient gateway errors retry the same
//! invocation a bounded number of times; permanent errors terminate without
//! touching the store.

use std::sync::Arc;

use chrono::Local;
use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;

use crate::error::{CoreError, GatewayError, Result};
use crate::gateway::StimulusGateway;
use crate::pact::{PactStatus, StimulusType};
use crate::storage::EnforcementConfig;
use crate::store::PactStore;
use crate::threat::AUTO_REASON;

/// Lower bound of any dispatched automatic intensity.
pub const MIN_INTENSITY: u8 = 10;
/// Upper bound of any dispatched automatic intensity.
pub const MAX_INTENSITY: u8 = 100;

const CRITICAL_CHANCE: f64 = 0.10;
const CRITICAL_MULTIPLIER: f64 = 1.2;

/// Random inputs of the escalation roll, injectable so tests can pin
/// outcomes deterministically.
pub trait EscalationRng: Send + Sync {
    /// Uniform jitter in [-5, +5].
    fn jitter(&mut self) -> i32;

    /// Critical roll, p = 0.10.
    fn critical(&mut self) -> bool;
}

/// Default PCG-backed roll source.
pub struct PcgEscalationRng(Mcg128Xsl64);

impl PcgEscalationRng {
    pub fn new() -> Self {
        Self(Mcg128Xsl64::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(Mcg128Xsl64::seed_from_u64(seed))
    }

    pub fn from_seed_opt(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::new(),
        }
    }
}

impl Default for PcgEscalationRng {
    fn default() -> Self {
        Self::new()
    }
}

impl EscalationRng for PcgEscalationRng {
    fn jitter(&mut self) -> i32 {
        self.0.gen_range(-5..=5)
    }

    fn critical(&mut self) -> bool {
        self.0.gen_bool(CRITICAL_CHANCE)
    }
}

/// Why an automatic check ended without dispatching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No pacts exist at all.
    NoPacts,
    /// Every pact is already signed or broken.
    NothingPending,
    /// Today's enforcement already ran.
    AlreadyEnforced,
}

/// Terminal state of one automatic check.
#[derive(Debug)]
pub enum CheckOutcome {
    Skipped(SkipReason),
    Enforced { intensity: u8 },
    Failed { error: GatewayError, attempts: u32 },
}

/// Final stimulus intensity from the escalation roll, clamped to
/// `[MIN_INTENSITY, MAX_INTENSITY]`.
pub fn final_intensity(threat_level: u8, jitter: i32, critical: bool) -> u8 {
    let multiplier = if critical { CRITICAL_MULTIPLIER } else { 1.0 };
    let raw = ((threat_level as i32 + jitter) as f64 * multiplier).round() as i64;
    raw.clamp(MIN_INTENSITY as i64, MAX_INTENSITY as i64) as u8
}

/// Runs enforcement checks and manual dispatches against a store and a
/// gateway.
pub struct EnforcementWorker<G> {
    store: Arc<PactStore>,
    gateway: G,
    config: EnforcementConfig,
    rng: Box<dyn EscalationRng>,
}

impl<G: StimulusGateway> EnforcementWorker<G> {
    pub fn new(store: Arc<PactStore>, gateway: G, config: EnforcementConfig) -> Self {
        let rng = Box::new(PcgEscalationRng::from_seed_opt(config.escalation_seed));
        Self {
            store,
            gateway,
            config,
            rng,
        }
    }

    /// Replace the roll source (tests pin the escalation outcome).
    pub fn with_rng(mut self, rng: Box<dyn EscalationRng>) -> Self {
        self.rng = rng;
        self
    }

    /// Run the automatic daily check.
    pub async fn run_auto(&mut self) -> CheckOutcome {
        let snapshot = self.store.snapshot();

        let pending = snapshot
            .pacts
            .iter()
            .filter(|p| p.status == PactStatus::Pending)
            .count();
        tracing::debug!(
            total = snapshot.pacts.len(),
            pending,
            zap_sent = snapshot.summary.zap_sent,
            "evaluating enforcement check"
        );

        if snapshot.pacts.is_empty() {
            tracing::info!("no pacts for today, skipping");
            return CheckOutcome::Skipped(SkipReason::NoPacts);
        }
        if pending == 0 {
            tracing::info!("all pacts resolved, skipping");
            return CheckOutcome::Skipped(SkipReason::NothingPending);
        }
        if snapshot.summary.zap_sent && !self.config.override_already_enforced {
            tracing::info!("enforcement already ran today, skipping");
            return CheckOutcome::Skipped(SkipReason::AlreadyEnforced);
        }

        let jitter = self.rng.jitter();
        let critical = self.rng.critical();
        let intensity = final_intensity(snapshot.threat_level, jitter, critical);
        tracing::info!(
            base = snapshot.threat_level,
            jitter,
            critical,
            intensity,
            "escalation roll"
        );

        match self
            .dispatch_with_retry(StimulusType::Zap, intensity, AUTO_REASON)
            .await
        {
            Ok(()) => {
                self.store
                    .mark_enforced(Local::now().date_naive(), intensity);
                CheckOutcome::Enforced { intensity }
            }
            Err((error, attempts)) => {
                tracing::error!(%error, attempts, "enforcement dispatch failed");
                CheckOutcome::Failed { error, attempts }
            }
        }
    }

    /// Dispatch a caller-specified stimulus, bypassing evaluation and the
    /// escalation roll. Recorded in the history on success.
    pub async fn run_manual(
        &mut self,
        stimulus: StimulusType,
        intensity: u8,
        reason: &str,
    ) -> Result<()> {
        let intensity = intensity.min(MAX_INTENSITY);
        self.dispatch_with_retry(stimulus, intensity, reason)
            .await
            .map_err(|(error, _)| CoreError::from(error))?;
        self.store
            .record_manual_stimulus(stimulus, intensity, reason);
        Ok(())
    }

    /// Retry transient failures up to the configured attempt cap; permanent
    /// failures return immediately. On error, the attempt count made is
    /// returned alongside.
    async fn dispatch_with_retry(
        &self,
        stimulus: StimulusType,
        intensity: u8,
        reason: &str,
    ) -> std::result::Result<(), (GatewayError, u32)> {
        let max_attempts = self.config.retry_max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.gateway.send_stimulus(stimulus, intensity, reason).await {
                Ok(()) => return Ok(()),
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    tracing::warn!(%err, attempt, max_attempts, "transient dispatch failure, retrying");
                    tokio::time::sleep(std::time::Duration::from_secs(
                        self.config.retry_backoff_secs,
                    ))
                    .await;
                }
                Err(err) => return Err((err, attempt)),
            }
        }
    }
}
