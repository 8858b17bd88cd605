//! Credential resolution: environment first, interactive prompt for the rest

use anyhow::{Context, Result};
use fordpass_lib::Credentials;
use inquire::Text;

pub const USERNAME_ENV: &str = "FORD_USERNAME";
pub const PASSWORD_ENV: &str = "FORD_PASSWORD";
pub const VIN_ENV: &str = "VEHICLE_VIN";

pub fn resolve() -> Result<Credentials> {
    let username = env_or(USERNAME_ENV, || prompt_text("Username"))?;
    let password = env_or(PASSWORD_ENV, || {
        rpassword::prompt_password("Password: ").context("Prompt for Password")
    })?;
    let vin = env_or(VIN_ENV, || prompt_text("VIN"))?;

    Ok(Credentials::new(username, password, vin.trim()))
}

fn env_or(key: &str, prompt: impl FnOnce() -> Result<String>) -> Result<String> {
    or_prompt(std::env::var(key).ok(), prompt)
}

/// Use `value` unless it is missing or empty
fn or_prompt(value: Option<String>, prompt: impl FnOnce() -> Result<String>) -> Result<String> {
    match value.filter(|v| !v.is_empty()) {
        Some(v) => Ok(v),
        None => prompt(),
    }
}

fn prompt_text(label: &str) -> Result<String> {
    Text::new(&format!("{}:", label))
        .prompt()
        .with_context(|| format!("Prompt for {}", label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_value_skips_prompt() {
        let value = or_prompt(Some("driver@example.com".to_string()), || {
            panic!("should not prompt")
        })
        .expect("resolve");
        assert_eq!(value, "driver@example.com");
    }

    #[test]
    fn test_empty_value_prompts() {
        let value = or_prompt(Some(String::new()), || Ok("typed".to_string())).expect("resolve");
        assert_eq!(value, "typed");
    }

    #[test]
    fn test_missing_value_prompts() {
        let value = or_prompt(None, || Ok("typed".to_string())).expect("resolve");
        assert_eq!(value, "typed");
    }

    #[test]
    fn test_prompt_failure_propagates() {
        let result = or_prompt(None, || Err(anyhow::anyhow!("no tty")));
        assert!(result.is_err());
    }
}
