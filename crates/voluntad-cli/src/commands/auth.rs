use clap::Subcommand;
use voluntad_core::gateway::{keyring_store, ACCESS_TOKEN_KEY};
use voluntad_core::{Config, HttpStimulusGateway};

use crate::common::runtime;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store the gateway bearer token in the OS keyring
    SetToken { token: String },
    /// Remove the stored token
    ClearToken,
    /// Check connectivity and credentials against the gateway
    Verify,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::SetToken { token } => {
            keyring_store::set(ACCESS_TOKEN_KEY, &token)?;
            println!("token stored");
            Ok(())
        }
        AuthAction::ClearToken => {
            keyring_store::delete(ACCESS_TOKEN_KEY)?;
            println!("token cleared");
            Ok(())
        }
        AuthAction::Verify => {
            let config = Config::load_or_default();
            let gateway = HttpStimulusGateway::from_config(&config.gateway)?;
            let rt = runtime()?;
            let email = rt.block_on(gateway.verify())?;
            println!("connected as {email}");
            Ok(())
        }
    }
}
