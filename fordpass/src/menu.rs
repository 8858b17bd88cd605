//! Interactive action menu

use anyhow::{Context, Result};
use fordpass_lib::VehicleAction;
use inquire::Select;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    GetStatus,
    Vehicle(VehicleAction),
}

impl MenuAction {
    pub const ALL: [MenuAction; 5] = [
        MenuAction::GetStatus,
        MenuAction::Vehicle(VehicleAction::Lock),
        MenuAction::Vehicle(VehicleAction::Unlock),
        MenuAction::Vehicle(VehicleAction::StartEngine),
        MenuAction::Vehicle(VehicleAction::StopEngine),
    ];
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuAction::GetStatus => "Get Status",
            MenuAction::Vehicle(VehicleAction::Lock) => "Lock Doors",
            MenuAction::Vehicle(VehicleAction::Unlock) => "Unlock Doors",
            MenuAction::Vehicle(VehicleAction::StartEngine) => "Start Engine",
            MenuAction::Vehicle(VehicleAction::StopEngine) => "Stop Engine",
        };
        f.write_str(label)
    }
}

pub fn select_action() -> Result<MenuAction> {
    Select::new("Select Action", MenuAction::ALL.to_vec())
        .prompt()
        .context("Prompt for action")
}
