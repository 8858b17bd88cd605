//! Vehicle Command Client
//!
//! High-level vehicle operations. Each call obtains a token from the
//! [`TokenAuthenticator`], builds the request for its endpoint and decodes the
//! response. Remote commands are submitted and then handed to the
//! [`CompletionPoller`] until the vehicle reports a terminal status.

use crate::auth::TokenAuthenticator;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::deadline::Deadline;
use crate::error::{FordPassError, RequestError, Result};
use crate::http;
use crate::poller::{CompletionPoller, PollReport, StatusProbe};
use crate::types::{
    CommandResponse, CommandStatus, CommandStatusResponse, CommandSubmission, Credentials,
    VehicleAction, VehicleStatus,
};
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Query parameter the status endpoint expects; the epoch asks for everything
const STATUS_LRDT: &str = "01-01-1970 00:00:00";

/// Client for one vehicle, identified by its VIN
pub struct VehicleClient {
    http: Client,
    config: Arc<Config>,
    vin: String,
    auth: TokenAuthenticator,
    poller: CompletionPoller,
}

impl VehicleClient {
    /// Create a client using the system clock
    pub fn new(credentials: Credentials, config: Config) -> Result<Self> {
        Self::with_clock(credentials, config, Arc::new(SystemClock))
    }

    /// Create a client whose token expiry is judged against `clock`
    pub fn with_clock(
        credentials: Credentials,
        config: Config,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        if credentials.vin.trim().is_empty() {
            return Err(FordPassError::config("VIN must not be empty"));
        }

        let config = Arc::new(config);
        let http = http::build_client(&config)?;
        let auth = TokenAuthenticator::with_clock(
            http.clone(),
            Arc::clone(&config),
            credentials.username,
            credentials.password,
            clock,
        );
        let poller = CompletionPoller::new(config.poll_interval);

        Ok(Self {
            http,
            config,
            vin: credentials.vin,
            auth,
            poller,
        })
    }

    pub fn vin(&self) -> &str {
        &self.vin
    }

    /// Fetch the current vehicle status payload
    #[instrument(skip(self, deadline), fields(vin = %self.vin))]
    pub async fn status(&self, deadline: &Deadline) -> Result<VehicleStatus> {
        let token = self.auth.get_token(deadline).await?;

        let url = format!("{}/status", self.config.vehicles_url("v4", &self.vin));
        let request = self
            .http
            .get(url)
            .query(&[("lrdt", STATUS_LRDT)])
            .headers(http::api_headers(&self.config, &token)?);

        let status: VehicleStatus =
            http::send_json(request, self.config.request_timeout, deadline).await?;
        debug!("Vehicle status retrieved");
        Ok(status)
    }

    /// Submit `action` and return the backend's command identifier
    #[instrument(skip(self, deadline), fields(vin = %self.vin))]
    pub async fn submit_command(
        &self,
        action: VehicleAction,
        deadline: &Deadline,
    ) -> Result<CommandSubmission> {
        let token = self.auth.get_token(deadline).await?;

        let request = self
            .http
            .request(action.method(), self.command_url(action, None))
            .headers(http::api_headers(&self.config, &token)?);

        let response: CommandResponse =
            http::send_json(request, self.config.request_timeout, deadline).await?;
        if response.command_id.is_empty() {
            return Err(RequestError::Malformed("empty commandId".to_string()).into());
        }

        info!(command_id = %response.command_id, "Command submitted");
        Ok(CommandSubmission {
            action,
            command_id: response.command_id,
        })
    }

    /// Query the completion status of a submitted command once
    pub async fn command_status(
        &self,
        submission: &CommandSubmission,
        deadline: &Deadline,
    ) -> Result<CommandStatus> {
        let token = self.auth.get_token(deadline).await?;

        let url = self.command_url(submission.action, Some(&submission.command_id));
        let request = self
            .http
            .request(Method::GET, url)
            .headers(http::api_headers(&self.config, &token)?);

        let response: CommandStatusResponse =
            http::send_json(request, self.config.request_timeout, deadline).await?;
        debug!(
            command_id = %submission.command_id,
            status = response.status,
            "Command status received"
        );
        Ok(CommandStatus::from_code(response.status))
    }

    /// Submit `action` and wait until the vehicle reports completion
    #[instrument(skip(self, deadline), fields(vin = %self.vin))]
    pub async fn run_command(&self, action: VehicleAction, deadline: &Deadline) -> Result<PollReport> {
        let submission = self.submit_command(action, deadline).await?;
        let probe = SubmittedCommand {
            client: self,
            submission: &submission,
        };
        self.poller.wait_for_completion(&probe, deadline).await
    }

    /// Lock the doors and wait for confirmation
    pub async fn lock(&self, deadline: &Deadline) -> Result<PollReport> {
        self.run_command(VehicleAction::Lock, deadline).await
    }

    /// Unlock the doors and wait for confirmation
    pub async fn unlock(&self, deadline: &Deadline) -> Result<PollReport> {
        self.run_command(VehicleAction::Unlock, deadline).await
    }

    /// Remote-start the engine and wait for confirmation
    pub async fn start_engine(&self, deadline: &Deadline) -> Result<PollReport> {
        self.run_command(VehicleAction::StartEngine, deadline).await
    }

    /// Stop a remote start and wait for confirmation
    pub async fn stop_engine(&self, deadline: &Deadline) -> Result<PollReport> {
        self.run_command(VehicleAction::StopEngine, deadline).await
    }

    fn command_url(&self, action: VehicleAction, command_id: Option<&str>) -> String {
        let base = format!(
            "{}/{}",
            self.config.vehicles_url("v2", &self.vin),
            action.family().path()
        );
        match command_id {
            Some(id) => format!("{}/{}", base, id),
            None => base,
        }
    }
}

/// Binds a submission to the client so the poller can query it
struct SubmittedCommand<'a> {
    client: &'a VehicleClient,
    submission: &'a CommandSubmission,
}

#[async_trait]
impl StatusProbe for SubmittedCommand<'_> {
    async fn probe(&self, deadline: &Deadline) -> Result<CommandStatus> {
        self.client.command_status(self.submission, deadline).await
    }
}
