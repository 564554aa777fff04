//! Domain models: pacts, the daily summary, and the stimulus log.
//!
//! A pact is a self-imposed commitment. Daily pacts reset to `pending` at
//! every day rollover; `signed` and `broken` are terminal for the day.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Completion state of a pact for the current day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PactStatus {
    Pending,
    Signed,
    Broken,
}

impl std::fmt::Display for PactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PactStatus::Pending => write!(f, "pending"),
            PactStatus::Signed => write!(f, "signed"),
            PactStatus::Broken => write!(f, "broken"),
        }
    }
}

impl std::str::FromStr for PactStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(PactStatus::Pending),
            "signed" => Ok(PactStatus::Signed),
            "broken" => Ok(PactStatus::Broken),
            other => Err(format!("unknown pact status: {other}")),
        }
    }
}

/// How often a pact recurs. Only `Daily` pacts are reset by the rollover;
/// the other frequencies keep whatever state the user left them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Once,
    SpecificWeekdays,
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "once" => Ok(Frequency::Once),
            "weekdays" | "specific_weekdays" => Ok(Frequency::SpecificWeekdays),
            other => Err(format!("unknown frequency: {other}")),
        }
    }
}

/// A user-defined commitment with a per-day completion state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pact {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Punishment weight, 0-100.
    #[serde(default = "default_intensity")]
    pub intensity: u8,
    /// Optional deadline time-of-day.
    #[serde(default)]
    pub deadline: Option<NaiveTime>,
    pub status: PactStatus,
    pub frequency: Frequency,
    /// Weekday indices; meaningful only when `frequency` is `SpecificWeekdays`.
    #[serde(default)]
    pub scheduled_days: Vec<u8>,
    #[serde(default = "default_category")]
    pub category: String,
}

impl Pact {
    /// Create a daily pact with default weight and category.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            notes: String::new(),
            created_at: Utc::now(),
            is_active: true,
            intensity: default_intensity(),
            deadline: None,
            status: PactStatus::Pending,
            frequency: Frequency::Daily,
            scheduled_days: Vec::new(),
            category: default_category(),
        }
    }
}

/// Aggregate completion state for a single calendar day.
///
/// Exactly one instance represents "today". A summary whose `date` has
/// passed must be rebuilt by the rollover before being trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_rate: f64,
    #[serde(default)]
    pub zap_sent: bool,
    /// Days since the last automatic enforcement.
    #[serde(default)]
    pub streak: u32,
}

impl DailySummary {
    /// Zero-count summary for the given day.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_tasks: 0,
            completed_tasks: 0,
            completion_rate: 0.0,
            zap_sent: false,
            streak: 0,
        }
    }
}

/// Kind of signal sent to the feedback device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StimulusType {
    Vibrate,
    Beep,
    Zap,
}

impl StimulusType {
    /// Name used by the device API; it calls vibration "vibe".
    pub fn wire_name(&self) -> &'static str {
        match self {
            StimulusType::Vibrate => "vibe",
            StimulusType::Beep => "beep",
            StimulusType::Zap => "zap",
        }
    }
}

impl std::fmt::Display for StimulusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StimulusType::Vibrate => write!(f, "vibrate"),
            StimulusType::Beep => write!(f, "beep"),
            StimulusType::Zap => write!(f, "zap"),
        }
    }
}

impl std::str::FromStr for StimulusType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vibrate" | "vibe" => Ok(StimulusType::Vibrate),
            "beep" => Ok(StimulusType::Beep),
            "zap" => Ok(StimulusType::Zap),
            other => Err(format!("unknown stimulus type: {other}")),
        }
    }
}

/// Append-only log entry for a dispatched stimulus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZapRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub stimulus: StimulusType,
    pub intensity: u8,
    /// Free text; automatic enforcements carry the "Auto" marker.
    pub reason: String,
}

impl ZapRecord {
    pub fn new(stimulus: StimulusType, intensity: u8, reason: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            stimulus,
            intensity,
            reason: reason.into(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_intensity() -> u8 {
    50
}
fn default_category() -> String {
    "GENERAL".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_pact_defaults() {
        let pact = Pact::new("meditate");
        assert_eq!(pact.status, PactStatus::Pending);
        assert_eq!(pact.frequency, Frequency::Daily);
        assert_eq!(pact.intensity, 50);
        assert_eq!(pact.category, "GENERAL");
        assert!(pact.is_active);
        assert!(pact.scheduled_days.is_empty());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&PactStatus::Signed).unwrap();
        assert_eq!(json, r#""signed""#);
        let back: PactStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PactStatus::Signed);
    }

    #[test]
    fn pact_deserializes_with_missing_optional_fields() {
        let json = r#"{
            "id": "abc",
            "title": "run",
            "created_at": "2026-08-01T10:00:00Z",
            "status": "pending",
            "frequency": "daily"
        }"#;
        let pact: Pact = serde_json::from_str(json).unwrap();
        assert!(pact.is_active);
        assert_eq!(pact.intensity, 50);
        assert_eq!(pact.category, "GENERAL");
        assert!(pact.deadline.is_none());
    }

    #[test]
    fn stimulus_wire_names() {
        assert_eq!(StimulusType::Vibrate.wire_name(), "vibe");
        assert_eq!(StimulusType::Beep.wire_name(), "beep");
        assert_eq!(StimulusType::Zap.wire_name(), "zap");
    }

    #[test]
    fn stimulus_parses_both_spellings() {
        assert_eq!("vibe".parse::<StimulusType>().unwrap(), StimulusType::Vibrate);
        assert_eq!("vibrate".parse::<StimulusType>().unwrap(), StimulusType::Vibrate);
        assert!("shock".parse::<StimulusType>().is_err());
    }
}
