//! Day-boundary rollover.
//!
//! Runs lazily whenever the store is touched and the stored summary's date
//! has passed. Single-step: a process dormant across several day boundaries
//! gets exactly one rollover (one atrophy penalty, one daily reset) because
//! the comparison is against today, not each missed day.

use chrono::NaiveDate;

use crate::pact::{DailySummary, Frequency, PactStatus};
use crate::store::StoreState;

/// Integrity points lost per day with zero active pacts.
const ATROPHY_PENALTY: u8 = 2;

/// Roll the state forward to `today` if the summary is stale.
///
/// Returns whether a rollover fired so the caller knows to persist and
/// refresh derived values. Idempotent within the same day.
pub(crate) fn roll_forward(state: &mut StoreState, today: NaiveDate) -> bool {
    if today <= state.summary.date {
        return false;
    }

    // Atrophy: closing a day that had no active commitments costs integrity.
    if state.summary.total_tasks == 0 {
        state.integrity_score = state.integrity_score.saturating_sub(ATROPHY_PENALTY);
    }

    for pact in &mut state.pacts {
        if pact.frequency == Frequency::Daily {
            pact.status = PactStatus::Pending;
            pact.is_active = true;
        }
    }

    tracing::info!(
        from = %state.summary.date,
        to = %today,
        pacts = state.pacts.len(),
        "day rollover"
    );

    state.summary = DailySummary {
        date: today,
        total_tasks: state.pacts.len(),
        completed_tasks: 0,
        completion_rate: 0.0,
        zap_sent: false,
        streak: state.summary.streak,
    };

    true
}
