use std::sync::Arc;

use clap::Subcommand;
use voluntad_core::worker::CheckOutcome;
use voluntad_core::{Config, EnforcementScheduler, TokioTriggerHost};

use crate::common::{build_worker, open_store, runtime};

#[derive(Subcommand)]
pub enum EnforceAction {
    /// Run the daily check once, now
    Check {
        /// Bypass the already-enforced skip (diagnostic)
        #[arg(long)]
        override_sent: bool,
    },
    /// Arm the daily trigger and keep running, re-arming after each firing
    Watch,
}

pub fn run(action: EnforceAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    match action {
        EnforceAction::Check { override_sent } => {
            let mut config = config;
            config.enforcement.override_already_enforced |= override_sent;
            let rt = runtime()?;
            rt.block_on(async {
                let store = open_store()?;
                let mut worker = build_worker(store, &config)?;
                report(worker.run_auto().await)
            })
        }
        EnforceAction::Watch => {
            let rt = runtime()?;
            rt.block_on(async move {
                let store = open_store()?;
                let scheduler = EnforcementScheduler::new(TokioTriggerHost::new());
                let (tx, mut rx) = tokio::sync::mpsc::channel::<()>(1);

                loop {
                    let snap = store.snapshot();
                    let job_store = Arc::clone(&store);
                    let job_config = config.clone();
                    let done = tx.clone();
                    let job = Box::pin(async move {
                        match build_worker(job_store, &job_config) {
                            Ok(mut worker) => {
                                if let Err(e) = report(worker.run_auto().await) {
                                    eprintln!("error: {e}");
                                }
                            }
                            Err(e) => eprintln!("error: {e}"),
                        }
                        let _ = done.send(()).await;
                    });

                    let target = scheduler.schedule_daily_check(
                        snap.scheduled_hour,
                        snap.scheduled_minute,
                        job,
                    )?;
                    println!("next check at {target}");

                    if rx.recv().await.is_none() {
                        break;
                    }
                }
                Ok(())
            })
        }
    }
}

fn report(outcome: CheckOutcome) -> Result<(), Box<dyn std::error::Error>> {
    match outcome {
        CheckOutcome::Skipped(reason) => {
            println!("skipped: {reason:?}");
            Ok(())
        }
        CheckOutcome::Enforced { intensity } => {
            println!("enforced at intensity {intensity}");
            Ok(())
        }
        CheckOutcome::Failed { error, attempts } => {
            Err(format!("dispatch failed after {attempts} attempt(s): {error}").into())
        }
    }
}
