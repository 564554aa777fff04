//! Single-writer pact store.
//!
//! Owns all persisted domain state: pacts, the daily summary, the stimulus
//! history, the integrity score, and the configured check time. Every other
//! component goes through this store; commands serialize through one lock
//! and readers get cloned snapshots.
//!
//! The store is constructed explicitly with its data directory -- there is
//! no process-wide instance. The day rollover runs lazily on every touch.
//!
//! Persistence is one JSON file per field, written independently after each
//! mutation. A crash between two writes can leave fields inconsistent until
//! the next save; local storage is a cache, not the system of record, so
//! loads fail open to defaults.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{Local, NaiveDate};

use crate::error::{CoreError, Result, ScheduleError};
use crate::pact::{DailySummary, Pact, PactStatus, StimulusType, ZapRecord};
use crate::rollover;
use crate::storage::{self, read_json, write_json};
use crate::threat::{self, AUTO_REASON};

const PACTS_FILE: &str = "pacts.json";
const HISTORY_FILE: &str = "zap_history.json";
const SUMMARY_FILE: &str = "today_summary.json";
const INTEGRITY_FILE: &str = "integrity_score.json";
const HOUR_FILE: &str = "scheduled_hour.json";
const MINUTE_FILE: &str = "scheduled_minute.json";

pub const DEFAULT_CHECK_HOUR: u8 = 21;
pub const DEFAULT_CHECK_MINUTE: u8 = 0;
const DEFAULT_INTEGRITY: u8 = 100;

/// Full in-memory state. The threat level is derived from the history and
/// summary; it is carried here for cheap reads but never persisted.
#[derive(Debug, Clone)]
pub(crate) struct StoreState {
    pub(crate) pacts: Vec<Pact>,
    pub(crate) history: Vec<ZapRecord>,
    pub(crate) summary: DailySummary,
    pub(crate) integrity_score: u8,
    pub(crate) scheduled_hour: u8,
    pub(crate) scheduled_minute: u8,
    pub(crate) threat_level: u8,
}

impl StoreState {
    pub(crate) fn with_defaults(today: NaiveDate) -> Self {
        Self {
            pacts: Vec::new(),
            history: Vec::new(),
            summary: DailySummary::empty(today),
            integrity_score: DEFAULT_INTEGRITY,
            scheduled_hour: DEFAULT_CHECK_HOUR,
            scheduled_minute: DEFAULT_CHECK_MINUTE,
            threat_level: threat::BASE_LEVEL,
        }
    }
}

/// Immutable copy of the store state handed to readers.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot {
    pub pacts: Vec<Pact>,
    pub history: Vec<ZapRecord>,
    pub summary: DailySummary,
    pub integrity_score: u8,
    pub scheduled_hour: u8,
    pub scheduled_minute: u8,
    pub threat_level: u8,
}

/// The single shared mutable resource of the engine.
pub struct PactStore {
    dir: PathBuf,
    inner: Mutex<StoreState>,
}

impl PactStore {
    /// Open the store at the given directory.
    ///
    /// Absent or malformed blobs individually fall back to defaults; this
    /// never fails. A pending day rollover is applied immediately.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let today = Local::now().date_naive();

        let defaults = StoreState::with_defaults(today);
        let mut state = StoreState {
            pacts: read_json(&dir, PACTS_FILE).unwrap_or(defaults.pacts),
            history: read_json(&dir, HISTORY_FILE).unwrap_or(defaults.history),
            summary: read_json(&dir, SUMMARY_FILE).unwrap_or(defaults.summary),
            integrity_score: read_json(&dir, INTEGRITY_FILE).unwrap_or(defaults.integrity_score),
            scheduled_hour: read_json(&dir, HOUR_FILE).unwrap_or(defaults.scheduled_hour),
            scheduled_minute: read_json(&dir, MINUTE_FILE).unwrap_or(defaults.scheduled_minute),
            threat_level: threat::BASE_LEVEL,
        };

        let rolled = rollover::roll_forward(&mut state, today);
        Self::refresh_threat(&mut state);

        let store = Self {
            dir,
            inner: Mutex::new(state),
        };
        if rolled {
            store.persist(&store.inner.lock().unwrap());
        }
        store
    }

    /// Open the store at the default data directory.
    pub fn open_default() -> Result<Self> {
        let dir = storage::data_dir().map_err(|e| CoreError::Custom(e.to_string()))?;
        Ok(Self::open(dir))
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Immutable copy of the current state. Applies a pending rollover
    /// first, like every other touch.
    pub fn snapshot(&self) -> StoreSnapshot {
        let mut state = self.inner.lock().unwrap();
        self.roll_if_needed(&mut state);
        StoreSnapshot {
            pacts: state.pacts.clone(),
            history: state.history.clone(),
            summary: state.summary.clone(),
            integrity_score: state.integrity_score,
            scheduled_hour: state.scheduled_hour,
            scheduled_minute: state.scheduled_minute,
            threat_level: state.threat_level,
        }
    }

    /// Add a pact, recompute the summary, persist.
    pub fn add_pact(&self, pact: Pact) {
        let mut state = self.inner.lock().unwrap();
        self.roll_if_needed(&mut state);
        state.pacts.push(pact);
        Self::recompute_summary(&mut state);
        self.persist(&state);
    }

    /// Set a pact's status. A pact stays active only while pending.
    /// Returns false when no pact has the given id.
    pub fn update_status(&self, id: &str, status: PactStatus) -> bool {
        let mut state = self.inner.lock().unwrap();
        self.roll_if_needed(&mut state);
        let Some(pact) = state.pacts.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        pact.status = status;
        pact.is_active = status == PactStatus::Pending;
        Self::recompute_summary(&mut state);
        self.persist(&state);
        true
    }

    /// Remove a pact. Returns false when no pact has the given id.
    pub fn remove_pact(&self, id: &str) -> bool {
        let mut state = self.inner.lock().unwrap();
        self.roll_if_needed(&mut state);
        let before = state.pacts.len();
        state.pacts.retain(|p| p.id != id);
        if state.pacts.len() == before {
            return false;
        }
        Self::recompute_summary(&mut state);
        self.persist(&state);
        true
    }

    /// Record a successful automatic enforcement for the given day.
    ///
    /// No-op unless the summary still refers to that day -- a stale date
    /// means the day rolled while the dispatch was in flight.
    pub fn mark_enforced(&self, date: NaiveDate, intensity: u8) {
        let mut state = self.inner.lock().unwrap();
        self.roll_if_needed(&mut state);
        if state.summary.date != date {
            tracing::warn!(%date, summary_date = %state.summary.date, "enforcement outcome for a past day, dropped");
            return;
        }
        state.summary.zap_sent = true;
        state.summary.streak = 0;
        state
            .history
            .push(ZapRecord::new(StimulusType::Zap, intensity, AUTO_REASON));
        Self::refresh_threat(&mut state);
        self.persist(&state);
    }

    /// Append a user-triggered stimulus to the history. Leaves the summary's
    /// enforcement flag and streak untouched.
    pub fn record_manual_stimulus(&self, stimulus: StimulusType, intensity: u8, reason: &str) {
        let mut state = self.inner.lock().unwrap();
        self.roll_if_needed(&mut state);
        state.history.push(ZapRecord::new(stimulus, intensity, reason));
        Self::refresh_threat(&mut state);
        self.persist(&state);
    }

    /// Set the configured daily check time.
    pub fn set_scheduled_time(&self, hour: u8, minute: u8) -> Result<(), ScheduleError> {
        if hour > 23 || minute > 59 {
            return Err(ScheduleError::InvalidTime { hour, minute });
        }
        let mut state = self.inner.lock().unwrap();
        self.roll_if_needed(&mut state);
        state.scheduled_hour = hour;
        state.scheduled_minute = minute;
        self.persist(&state);
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn roll_if_needed(&self, state: &mut StoreState) {
        if rollover::roll_forward(state, Local::now().date_naive()) {
            Self::refresh_threat(state);
            self.persist(state);
        }
    }

    fn recompute_summary(state: &mut StoreState) {
        let total = state.pacts.len();
        let completed = state
            .pacts
            .iter()
            .filter(|p| p.status != PactStatus::Pending)
            .count();
        let summary = &mut state.summary;
        summary.total_tasks = total;
        summary.completed_tasks = completed;
        summary.completion_rate = if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64
        };
        // A fully-signed day starts a streak; an ongoing streak is carried.
        if total > 0 && completed == total && !summary.zap_sent && summary.streak == 0 {
            summary.streak = 1;
        }
    }

    fn refresh_threat(state: &mut StoreState) {
        state.threat_level = threat::threat_level(&state.history, &state.summary, state.summary.date);
    }

    /// Best-effort write of every field to its own file. A failed field is
    /// logged and skipped; the in-memory state stays authoritative.
    fn persist(&self, state: &StoreState) {
        let writes: [(&str, Result<()>); 6] = [
            (PACTS_FILE, write_json(&self.dir, PACTS_FILE, &state.pacts)),
            (HISTORY_FILE, write_json(&self.dir, HISTORY_FILE, &state.history)),
            (SUMMARY_FILE, write_json(&self.dir, SUMMARY_FILE, &state.summary)),
            (INTEGRITY_FILE, write_json(&self.dir, INTEGRITY_FILE, &state.integrity_score)),
            (HOUR_FILE, write_json(&self.dir, HOUR_FILE, &state.scheduled_hour)),
            (MINUTE_FILE, write_json(&self.dir, MINUTE_FILE, &state.scheduled_minute)),
        ];
        for (name, result) in writes {
            if let Err(err) = result {
                tracing::warn!(file = name, %err, "failed to persist store field");
            }
        }
    }
}
