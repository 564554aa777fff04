use clap::Subcommand;
use voluntad_core::{Pact, PactStatus, PactStore};

use crate::common::open_store;

#[derive(Subcommand)]
pub enum PactAction {
    /// Add a new pact
    Add {
        title: String,
        #[arg(long, default_value = "")]
        notes: String,
        /// Punishment weight, 0-100
        #[arg(long, default_value_t = 50)]
        intensity: u8,
        /// daily, once, or weekdays
        #[arg(long, default_value = "daily")]
        frequency: String,
        /// Weekday indices for --frequency weekdays, e.g. "0,2,4"
        #[arg(long)]
        days: Option<String>,
        #[arg(long, default_value = "GENERAL")]
        category: String,
        /// Deadline time-of-day, HH:MM
        #[arg(long)]
        deadline: Option<String>,
    },
    /// List pacts as JSON
    List,
    /// Mark a pact fulfilled for today
    Sign { id: String },
    /// Mark a pact broken for today
    Break { id: String },
    /// Remove a pact permanently
    Remove { id: String },
}

pub fn run(action: PactAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;
    match action {
        PactAction::Add {
            title,
            notes,
            intensity,
            frequency,
            days,
            category,
            deadline,
        } => {
            let mut pact = Pact::new(title);
            pact.notes = notes;
            pact.intensity = intensity.min(100);
            pact.frequency = frequency.parse()?;
            if let Some(days) = days {
                pact.scheduled_days = days
                    .split(',')
                    .map(|d| d.trim().parse())
                    .collect::<Result<_, _>>()?;
            }
            pact.category = category;
            if let Some(deadline) = deadline {
                pact.deadline = Some(chrono::NaiveTime::parse_from_str(&deadline, "%H:%M")?);
            }
            let id = pact.id.clone();
            store.add_pact(pact);
            println!("added pact {id}");
        }
        PactAction::List => {
            println!("{}", serde_json::to_string_pretty(&store.snapshot().pacts)?);
        }
        PactAction::Sign { id } => update(&store, &id, PactStatus::Signed)?,
        PactAction::Break { id } => update(&store, &id, PactStatus::Broken)?,
        PactAction::Remove { id } => {
            if store.remove_pact(&id) {
                println!("removed {id}");
            } else {
                return Err(format!("no pact with id {id}").into());
            }
        }
    }
    Ok(())
}

fn update(store: &PactStore, id: &str, status: PactStatus) -> Result<(), Box<dyn std::error::Error>> {
    if store.update_status(id, status) {
        println!("{id} is now {status}");
        Ok(())
    } else {
        Err(format!("no pact with id {id}").into())
    }
}
