//! FordPass CLI - remote control for a FordPass connected vehicle
//!
//! Resolves credentials from the environment (prompting for anything missing),
//! then runs one action: show status, lock/unlock the doors, or start/stop the
//! engine. Without a subcommand an interactive menu picks the action.

mod commands;
mod credentials;
mod menu;

use clap::{Parser, Subcommand};
use fordpass_lib::{Config, Deadline, FordPassError, VehicleAction, VehicleClient};
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "fordpass")]
#[command(author, version, about = "FordPass vehicle remote control", long_about = None)]
struct Cli {
    /// Overall time limit for the action, in seconds
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy, Debug, PartialEq, Eq)]
enum Commands {
    /// Show the vehicle status as JSON
    Status,
    /// Lock the doors
    Lock,
    /// Unlock the doors
    Unlock,
    /// Start the engine remotely
    Start,
    /// Stop a remote start
    Stop,
}

impl From<Commands> for menu::MenuAction {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Status => menu::MenuAction::GetStatus,
            Commands::Lock => menu::MenuAction::Vehicle(VehicleAction::Lock),
            Commands::Unlock => menu::MenuAction::Vehicle(VehicleAction::Unlock),
            Commands::Start => menu::MenuAction::Vehicle(VehicleAction::StartEngine),
            Commands::Stop => menu::MenuAction::Vehicle(VehicleAction::StopEngine),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        tracing::error!("{:#}", err);
        if let Some(hint) = hint(&err) {
            eprintln!("{}", hint);
        }
        std::process::exit(1);
    }
}

/// Follow-up advice for failures the user can act on
fn hint(err: &anyhow::Error) -> Option<String> {
    let err = err.downcast_ref::<FordPassError>()?;
    if err.is_auth() {
        Some(format!(
            "Check {} and {}, or enter them at the prompt.",
            credentials::USERNAME_ENV,
            credentials::PASSWORD_ENV
        ))
    } else if err.is_cancellation() {
        Some("The vehicle may still complete the command; check with `fordpass status`.".into())
    } else {
        None
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let credentials = credentials::resolve()?;

    let action = match cli.command {
        Some(command) => command.into(),
        None => menu::select_action()?,
    };

    let client = VehicleClient::new(credentials, config)?;

    let (deadline, cancel) = Deadline::cancellable(Duration::from_secs(cli.timeout));
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            cancel.cancel();
        }
    });

    commands::run(&client, action, &deadline).await
}
