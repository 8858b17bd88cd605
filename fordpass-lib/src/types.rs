//! Core types for the FordPass client
//!
//! Domain values shared by the authenticator, the vehicle client and the poller,
//! plus the JSON shapes exchanged with the backend.

use crate::error::FordPassError;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account credentials and the target vehicle
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub vin: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        vin: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            vin: vin.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("vin", &self.vin)
            .finish()
    }
}

/// Bearer token with its absolute expiry
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthToken {
    /// A token is usable only while `now + margin < expires_at`
    pub fn is_valid_at(&self, now: DateTime<Utc>, margin: chrono::Duration) -> bool {
        !self.token.is_empty() && now + margin < self.expires_at
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Endpoint family a command belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandFamily {
    Doors,
    Engine,
}

impl CommandFamily {
    /// Path below `/api/vehicles/v2/{vin}/`
    pub fn path(self) -> &'static str {
        match self {
            CommandFamily::Doors => "doors/lock",
            CommandFamily::Engine => "engine/start",
        }
    }
}

/// Remote command the vehicle can execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleAction {
    Lock,
    Unlock,
    StartEngine,
    StopEngine,
}

impl VehicleAction {
    pub const ALL: [VehicleAction; 4] = [
        VehicleAction::Lock,
        VehicleAction::Unlock,
        VehicleAction::StartEngine,
        VehicleAction::StopEngine,
    ];

    pub fn family(self) -> CommandFamily {
        match self {
            VehicleAction::Lock | VehicleAction::Unlock => CommandFamily::Doors,
            VehicleAction::StartEngine | VehicleAction::StopEngine => CommandFamily::Engine,
        }
    }

    /// Issuing a command is a PUT; revoking it is a DELETE on the same resource
    pub fn method(self) -> Method {
        match self {
            VehicleAction::Lock | VehicleAction::StartEngine => Method::PUT,
            VehicleAction::Unlock | VehicleAction::StopEngine => Method::DELETE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            VehicleAction::Lock => "lock",
            VehicleAction::Unlock => "unlock",
            VehicleAction::StartEngine => "start",
            VehicleAction::StopEngine => "stop",
        }
    }
}

impl fmt::Display for VehicleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VehicleAction {
    type Err = FordPassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lock" => Ok(VehicleAction::Lock),
            "unlock" => Ok(VehicleAction::Unlock),
            "start" => Ok(VehicleAction::StartEngine),
            "stop" => Ok(VehicleAction::StopEngine),
            other => Err(FordPassError::InvalidAction(other.to_string())),
        }
    }
}

/// A command accepted by the backend, awaiting completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSubmission {
    pub action: VehicleAction,
    pub command_id: String,
}

/// Completion status reported by the command status endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Succeeded,
    Pending,
    Unexpected(i64),
}

impl CommandStatus {
    pub const SUCCESS_CODE: i64 = 200;
    /// Backend-specific "not processed yet" sentinel
    pub const PENDING_CODE: i64 = 552;

    pub fn from_code(code: i64) -> Self {
        match code {
            Self::SUCCESS_CODE => CommandStatus::Succeeded,
            Self::PENDING_CODE => CommandStatus::Pending,
            other => CommandStatus::Unexpected(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            CommandStatus::Succeeded => Self::SUCCESS_CODE,
            CommandStatus::Pending => Self::PENDING_CODE,
            CommandStatus::Unexpected(code) => code,
        }
    }
}

/// Vehicle status payload, passed through without interpretation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleStatus(pub serde_json::Value);

impl VehicleStatus {
    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
pub(crate) struct AuthenticationResponse {
    pub access_token: String,
    pub expires_in: i64,
}

/// Command submission response
#[derive(Debug, Deserialize)]
pub(crate) struct CommandResponse {
    #[serde(rename = "commandId")]
    pub command_id: String,
}

/// Command status response
#[derive(Debug, Deserialize)]
pub(crate) struct CommandStatusResponse {
    pub status: i64,
}
