use chrono::Local;
use clap::Subcommand;
use voluntad_core::scheduler::next_check_time;

use crate::common::{open_store, parse_hhmm};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Show the configured check time and the next occurrence
    Show,
    /// Set the daily check time (HH:MM)
    Set { time: String },
}

pub fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;
    match action {
        ScheduleAction::Show => {
            let snap = store.snapshot();
            println!(
                "check time: {:02}:{:02}",
                snap.scheduled_hour, snap.scheduled_minute
            );
            let next = next_check_time(Local::now(), snap.scheduled_hour, snap.scheduled_minute)?;
            println!("next check: {next}");
        }
        ScheduleAction::Set { time } => {
            let (hour, minute) = parse_hhmm(&time)?;
            store.set_scheduled_time(hour, minute)?;
            println!("check time set to {hour:02}:{minute:02}");
            println!("note: run `voluntad enforce watch` (or restart it) to arm the trigger");
        }
    }
    Ok(())
}
