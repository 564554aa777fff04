use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "voluntad", version, about = "Voluntad accountability engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pact management
    Pact {
        #[command(subcommand)]
        action: commands::pact::PactAction,
    },
    /// Today's summary, integrity score and threat level
    Status,
    /// Stimulus history
    History {
        /// Show only the most recent entries
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Daily check time management
    Schedule {
        #[command(subcommand)]
        action: commands::schedule::ScheduleAction,
    },
    /// Enforcement checks
    Enforce {
        #[command(subcommand)]
        action: commands::enforce::EnforceAction,
    },
    /// Manual stimulus dispatch
    Stimulus {
        #[command(subcommand)]
        action: commands::stimulus::StimulusAction,
    },
    /// Gateway credential management
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Pact { action } => commands::pact::run(action),
        Commands::Status => commands::status::run(),
        Commands::History { limit } => commands::history::run(limit),
        Commands::Schedule { action } => commands::schedule::run(action),
        Commands::Enforce { action } => commands::enforce::run(action),
        Commands::Stimulus { action } => commands::stimulus::run(action),
        Commands::Auth { action } => commands::auth::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
