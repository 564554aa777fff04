use clap::Subcommand;
use voluntad_core::{Config, StimulusType};

use crate::common::{build_worker, open_store, runtime};

#[derive(Subcommand)]
pub enum StimulusAction {
    /// Dispatch a stimulus immediately, outside the enforcement cycle
    Send {
        /// vibrate, beep, or zap
        #[arg(long = "type")]
        stimulus: String,
        /// 0-100
        #[arg(long)]
        intensity: u8,
        #[arg(long, default_value = "Manual stimulus test")]
        reason: String,
    },
}

pub fn run(action: StimulusAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        StimulusAction::Send {
            stimulus,
            intensity,
            reason,
        } => {
            let stimulus: StimulusType = stimulus.parse()?;
            let config = Config::load_or_default();
            let rt = runtime()?;
            rt.block_on(async {
                let store = open_store()?;
                let mut worker = build_worker(store, &config)?;
                worker.run_manual(stimulus, intensity, &reason).await?;
                println!("{stimulus} delivered at intensity {intensity}");
                Ok(())
            })
        }
    }
}
