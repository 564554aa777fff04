//! Daily enforcement scheduling.
//!
//! The engine registers a single deferred trigger under a fixed name; the
//! deferred-execution primitive itself is a host capability behind the
//! [`TriggerHost`] trait. Registration uses replace semantics: scheduling
//! again under the same name cancels the previous pending trigger, so
//! rescheduling is idempotent under rapid repeated calls.
//!
//! Nothing here re-arms the next day's trigger after one fires; the host
//! application re-issues `schedule_daily_check` at startup and whenever the
//! configured time changes.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Days, Local, LocalResult, NaiveTime, TimeZone, Utc};

use crate::error::ScheduleError;

/// Logical name of the single daily enforcement trigger.
pub const ENFORCEMENT_TRIGGER: &str = "daily-enforcement-check";

/// Work handed to the host to run when a trigger fires.
pub type TriggerJob = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Host-provided deferred execution.
///
/// At most one pending trigger per name; scheduling an existing name
/// replaces it. Firing is best effort -- it may be late, never duplicated.
pub trait TriggerHost: Send + Sync {
    fn schedule_at(&self, name: &str, when: DateTime<Utc>, job: TriggerJob);

    fn cancel(&self, name: &str);

    /// Fire time of the pending trigger, if one is registered.
    fn pending(&self, name: &str) -> Option<DateTime<Utc>>;
}

struct PendingTrigger {
    when: DateTime<Utc>,
    handle: tokio::task::JoinHandle<()>,
}

/// In-process [`TriggerHost`] on the Tokio runtime.
///
/// Triggers are one-shot tasks that deregister themselves when they fire,
/// so replacement only ever aborts a still-sleeping task, never a running
/// job. Pending triggers do not survive the process; the application
/// re-arms at startup.
#[derive(Clone, Default)]
pub struct TokioTriggerHost {
    inner: Arc<Mutex<HashMap<String, PendingTrigger>>>,
}

impl TokioTriggerHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TriggerHost for TokioTriggerHost {
    fn schedule_at(&self, name: &str, when: DateTime<Utc>, job: TriggerJob) {
        let mut pending = self.inner.lock().unwrap();
        if let Some(previous) = pending.remove(name) {
            previous.handle.abort();
            tracing::debug!(name, "replaced pending trigger");
        }

        let delay = (when - Utc::now()).to_std().unwrap_or_default();
        let registry = Arc::clone(&self.inner);
        let key = name.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Deregister before running so a reschedule issued mid-job
            // does not abort the running worker.
            if let Ok(mut map) = registry.lock() {
                map.remove(&key);
            }
            job.await;
        });

        pending.insert(name.to_string(), PendingTrigger { when, handle });
    }

    fn cancel(&self, name: &str) {
        if let Some(previous) = self.inner.lock().unwrap().remove(name) {
            previous.handle.abort();
        }
    }

    fn pending(&self, name: &str) -> Option<DateTime<Utc>> {
        self.inner.lock().unwrap().get(name).map(|p| p.when)
    }
}

/// Registers the next daily enforcement check with the host.
pub struct EnforcementScheduler<H: TriggerHost> {
    host: H,
}

impl<H: TriggerHost> EnforcementScheduler<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Register the next check at the configured wall-clock time: today if
    /// that time is still ahead, otherwise tomorrow. Replaces any pending
    /// trigger.
    pub fn schedule_daily_check(
        &self,
        hour: u8,
        minute: u8,
        job: TriggerJob,
    ) -> Result<DateTime<Local>, ScheduleError> {
        let target = next_check_time(Local::now(), hour, minute)?;
        tracing::info!(%target, "scheduling daily enforcement check");
        self.host
            .schedule_at(ENFORCEMENT_TRIGGER, target.with_timezone(&Utc), job);
        Ok(target)
    }

    /// Drop the pending check, if any.
    pub fn cancel(&self) {
        self.host.cancel(ENFORCEMENT_TRIGGER);
    }
}

/// Next local wall-clock occurrence of `hour:minute` strictly after `now`'s
/// time-of-day (same-minute calls roll to tomorrow).
pub fn next_check_time(
    now: DateTime<Local>,
    hour: u8,
    minute: u8,
) -> Result<DateTime<Local>, ScheduleError> {
    let time = NaiveTime::from_hms_opt(hour as u32, minute as u32, 0)
        .ok_or(ScheduleError::InvalidTime { hour, minute })?;

    let date = if now.time() < time {
        now.date_naive()
    } else {
        now.date_naive() + Days::new(1)
    };

    let naive = date.and_time(time);
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        // DST fold: take the earlier occurrence.
        LocalResult::Ambiguous(dt, _) => Ok(dt),
        LocalResult::None => Err(ScheduleError::UnresolvableLocalTime(naive)),
    }
}
