//! # Voluntad Core Library
//!
//! This library provides the core business logic for Voluntad, a personal
//! accountability engine. It implements a CLI-first philosophy where all
//! operations are available via a standalone CLI binary, with any GUI being
//! a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Pact Store**: single-writer state manager owning all persisted
//!   domain state, with lazy day rollover on every touch
//! - **Threat Level**: pure escalation baseline derived from the
//!   consecutive automatic-enforcement history
//! - **Scheduler**: registers the single daily enforcement trigger with
//!   replace semantics on a host-provided deferred-execution capability
//! - **Worker**: evaluates the daily check, rolls the escalation dice,
//!   dispatches through the stimulus gateway, and retries transient errors
//! - **Storage**: JSON blob persistence and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`PactStore`]: the single shared mutable resource
//! - [`EnforcementWorker`]: decision and dispatch state machine
//! - [`EnforcementScheduler`]: daily trigger registration
//! - [`StimulusGateway`]: contract of the external feedback device API

pub mod error;
pub mod gateway;
pub mod pact;
mod rollover;
pub mod scheduler;
pub mod storage;
pub mod store;
pub mod threat;
pub mod worker;

pub use error::{ConfigError, CoreError, GatewayError, ScheduleError};
pub use gateway::{HttpStimulusGateway, StimulusGateway};
pub use pact::{DailySummary, Frequency, Pact, PactStatus, StimulusType, ZapRecord};
pub use scheduler::{EnforcementScheduler, TokioTriggerHost, TriggerHost, ENFORCEMENT_TRIGGER};
pub use storage::{Config, EnforcementConfig, GatewayConfig};
pub use store::{PactStore, StoreSnapshot};
pub use threat::threat_level;
pub use worker::{CheckOutcome, EnforcementWorker, EscalationRng, PcgEscalationRng, SkipReason};
