//! Command implementations

pub mod status;
pub mod vehicle;

use crate::menu::MenuAction;
use anyhow::Result;
use fordpass_lib::{Deadline, VehicleClient};

pub async fn run(client: &VehicleClient, action: MenuAction, deadline: &Deadline) -> Result<()> {
    match action {
        MenuAction::GetStatus => status::run(client, deadline).await,
        MenuAction::Vehicle(action) => vehicle::run(client, action, deadline).await,
    }
}
