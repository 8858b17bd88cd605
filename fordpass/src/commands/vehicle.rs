//! Remote command implementation (lock, unlock, start, stop)

use anyhow::{Context, Result};
use fordpass_lib::{Deadline, VehicleAction, VehicleClient};

pub async fn run(client: &VehicleClient, action: VehicleAction, deadline: &Deadline) -> Result<()> {
    println!("Sending {} command to {}...", action, client.vin());

    let report = client
        .run_command(action, deadline)
        .await
        .with_context(|| format!("{} failed", describe(action)))?;

    println!(
        "{} succeeded after {} status check(s).",
        describe(action),
        report.attempts
    );
    Ok(())
}

fn describe(action: VehicleAction) -> &'static str {
    match action {
        VehicleAction::Lock => "Lock doors",
        VehicleAction::Unlock => "Unlock doors",
        VehicleAction::StartEngine => "Start engine",
        VehicleAction::StopEngine => "Stop engine",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_actions() {
        assert_eq!(describe(VehicleAction::Lock), "Lock doors");
        assert_eq!(describe(VehicleAction::StopEngine), "Stop engine");
    }
}
