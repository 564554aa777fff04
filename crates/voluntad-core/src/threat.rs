//! Threat level: the escalation baseline derived from consecutive
//! automatic-enforcement days.
//!
//! Base 40, plus 20 per consecutive failure day, capped at 100. Today
//! counts through the summary's `zap_sent` flag (which resets at
//! rollover); prior days count through automatic zap records in the
//! history, walking backward from yesterday and stopping at the first
//! clean day. Prior failures escalate today's dispatch even before
//! today's own check has run.
//!
//! The value is derived, never persisted as ground truth; it must always be
//! recomputable from the history.

use chrono::{Local, NaiveDate};

use crate::pact::{DailySummary, StimulusType, ZapRecord};

/// Marker distinguishing automatic enforcements in record reasons.
pub const AUTO_MARKER: &str = "Auto";

/// Reason attached to automatic enforcement dispatches and records.
pub const AUTO_REASON: &str = "Auto: tasks incomplete";

pub const BASE_LEVEL: u8 = 40;
pub const STEP_PER_FAILURE: u8 = 20;
pub const MAX_LEVEL: u8 = 100;

/// Compute the current threat level from the stimulus history and today's
/// summary. `today` is the local calendar date the summary refers to.
pub fn threat_level(history: &[ZapRecord], summary: &DailySummary, today: NaiveDate) -> u8 {
    let mut failures: u32 = 0;

    // Today is tracked by the summary flag, not the history walk.
    if summary.zap_sent {
        failures += 1;
    }

    let mut check_date = today.pred_opt();
    while let Some(date) = check_date {
        let hit = history.iter().any(|r| {
            r.stimulus == StimulusType::Zap
                && r.reason.contains(AUTO_MARKER)
                && r.timestamp.with_timezone(&Local).date_naive() == date
        });
        if !hit {
            break;
        }
        failures += 1;
        check_date = date.pred_opt();
    }

    let level = BASE_LEVEL as u32 + STEP_PER_FAILURE as u32 * failures;
    level.min(MAX_LEVEL as u32) as u8
}
