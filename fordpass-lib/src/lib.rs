/// FordPass Client - Shared Library
///
/// Authentication, vehicle status and remote commands for the FordPass
/// telematics backend, used by the `fordpass` CLI.
pub mod auth;
pub mod client;
pub mod clock;
pub mod config;
pub mod deadline;
pub mod error;
mod http;
pub mod poller;
pub mod types;

pub use auth::TokenAuthenticator;
pub use client::VehicleClient;
pub use config::Config;
pub use deadline::{CancelHandle, Deadline};
pub use error::{FordPassError, RequestError, Result};
pub use poller::{CompletionPoller, PollReport, PollState, StatusProbe};
pub use types::{
    AuthToken, CommandFamily, CommandStatus, CommandSubmission, Credentials, VehicleAction,
    VehicleStatus,
};
