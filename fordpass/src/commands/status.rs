//! Status command implementation

use anyhow::{Context, Result};
use fordpass_lib::{Deadline, VehicleClient, VehicleStatus};

pub async fn run(client: &VehicleClient, deadline: &Deadline) -> Result<()> {
    let status = client
        .status(deadline)
        .await
        .context("Get vehicle status failed")?;

    println!("{}", render(&status)?);
    Ok(())
}

fn render(status: &VehicleStatus) -> Result<String> {
    serde_json::to_string_pretty(status).context("Failed to render vehicle status")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_is_pretty_json() {
        let status = VehicleStatus(json!({"vehiclestatus": {"fuel": {"fuelLevel": 72.5}}}));
        let rendered = render(&status).expect("render");

        assert!(rendered.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&rendered).expect("valid json");
        assert_eq!(parsed["vehiclestatus"]["fuel"]["fuelLevel"], 72.5);
    }
}
