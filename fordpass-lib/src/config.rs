//! Client configuration
//!
//! Backend hosts, fixed request headers and the timing constants of the command
//! protocol. `Config::default()` targets the production FordPass backend; the two
//! URLs can be overridden from the environment.

use crate::error::{FordPassError, Result};
use std::time::Duration;
use url::Url;

pub const API_URL_ENV: &str = "FORDPASS_API_URL";
pub const AUTH_URL_ENV: &str = "FORDPASS_AUTH_URL";

const DEFAULT_API_URL: &str = "https://usapi.cv.ford.com";
const DEFAULT_AUTH_URL: &str = "https://fcis.ice.ibmcloud.com/v1.0/endpoint/default/token";
const APPLICATION_ID: &str = "71A3AD0A-CF46-4CCF-B473-FC7FE5BC4592";
const AUTH_CLIENT_ID: &str = "9fb503e0-715b-47e8-adfd-ad4b7770f73b";
const USER_AGENT: &str = "fordpass-na/353 CFNetwork/1121.2.2 Darwin/19.3.0";
const ACCEPT_LANGUAGE: &str = "en-us";

#[derive(Debug, Clone)]
pub struct Config {
    /// Scheme and host of the vehicle API, without trailing slash
    pub api_url: String,
    /// Full URL of the token endpoint
    pub auth_url: String,
    pub application_id: String,
    pub client_id: String,
    pub user_agent: String,
    pub accept_language: String,
    /// Applied to every HTTP request, independent of the caller's deadline
    pub request_timeout: Duration,
    /// Wait between command status queries
    pub poll_interval: Duration,
    /// Tokens this close to expiry are renewed before use
    pub token_safety_margin: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            application_id: APPLICATION_ID.to_string(),
            client_id: AUTH_CLIENT_ID.to_string(),
            user_agent: USER_AGENT.to_string(),
            accept_language: ACCEPT_LANGUAGE.to_string(),
            request_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_secs(2),
            token_safety_margin: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Defaults with `FORDPASS_API_URL` / `FORDPASS_AUTH_URL` applied when set
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(AUTH_URL_ENV).ok(),
        )
    }

    fn with_overrides(mut self, api_url: Option<String>, auth_url: Option<String>) -> Result<Self> {
        if let Some(url) = api_url.filter(|u| !u.is_empty()) {
            self.api_url = url;
        }
        if let Some(url) = auth_url.filter(|u| !u.is_empty()) {
            self.auth_url = url;
        }
        self.validate()?;
        Ok(self)
    }

    /// Point both endpoints at one base URL (the token path is appended)
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.api_url = base.to_string();
        self.auth_url = format!("{}/v1.0/endpoint/default/token", base);
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("api_url", &self.api_url), ("auth_url", &self.auth_url)] {
            Url::parse(value)
                .map_err(|e| FordPassError::config(format!("invalid {} {:?}: {}", name, value, e)))?;
        }
        if self.request_timeout.is_zero() {
            return Err(FordPassError::config("request_timeout must be non-zero"));
        }
        Ok(())
    }

    /// Base for versioned vehicle endpoints
    pub(crate) fn vehicles_url(&self, version: &str, vin: &str) -> String {
        format!(
            "{}/api/vehicles/{}/{}",
            self.api_url.trim_end_matches('/'),
            version,
            vin
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timing() {
        let config = Config::default();
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.token_safety_margin, Duration::from_secs(5));
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn test_overrides_applied() {
        let config = Config::default()
            .with_overrides(
                Some("http://127.0.0.1:9000".to_string()),
                Some(String::new()),
            )
            .expect("valid override");

        assert_eq!(config.api_url, "http://127.0.0.1:9000");
        assert_eq!(config.auth_url, DEFAULT_AUTH_URL);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let err = Config::default()
            .with_overrides(Some("not a url".to_string()), None)
            .unwrap_err();
        assert!(matches!(err, FordPassError::Config(_)));
    }

    #[test]
    fn test_with_base_url() {
        let config = Config::default().with_base_url("http://localhost:1234/");
        assert_eq!(config.api_url, "http://localhost:1234");
        assert_eq!(
            config.auth_url,
            "http://localhost:1234/v1.0/endpoint/default/token"
        );
        assert_eq!(
            config.vehicles_url("v4", "VIN123"),
            "http://localhost:1234/api/vehicles/v4/VIN123"
        );
    }
}
