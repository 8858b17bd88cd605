//! Token Authenticator - cached bearer token with transparent renewal
//!
//! - Read path: cached token still outside the safety margin → return it, no I/O
//! - Renew path: absent or near-expiry token → password grant exchange, replace cache
//! - The cache lock is held across the exchange, so concurrent callers wait for
//!   one renewal instead of racing their own

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::deadline::Deadline;
use crate::error::{FordPassError, RequestError, Result};
use crate::http;
use crate::types::{AuthToken, AuthenticationResponse};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Hands out FordPass bearer tokens, authenticating only when the cache runs dry
pub struct TokenAuthenticator {
    http: Client,
    config: Arc<Config>,
    username: String,
    password: String,
    clock: Arc<dyn Clock>,
    cache: Mutex<Option<AuthToken>>, // None = not authenticated yet
}

impl TokenAuthenticator {
    /// Create an authenticator using the system clock
    pub fn new(
        http: Client,
        config: Arc<Config>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::with_clock(http, config, username, password, Arc::new(SystemClock))
    }

    /// Create an authenticator that judges expiry against `clock`
    pub fn with_clock(
        http: Client,
        config: Arc<Config>,
        username: impl Into<String>,
        password: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http,
            config,
            username: username.into(),
            password: password.into(),
            clock,
            cache: Mutex::new(None),
        }
    }

    /// Get a bearer token valid for at least the safety margin
    ///
    /// Authenticates on the first call and whenever the cached token is within
    /// the margin of expiry. No retry: a failed exchange leaves the cache as it was.
    pub async fn get_token(&self, deadline: &Deadline) -> Result<String> {
        let mut cache = deadline.guard(self.cache.lock()).await?;

        let margin = chrono::Duration::from_std(self.config.token_safety_margin)
            .map_err(|e| FordPassError::config(format!("token safety margin: {}", e)))?;

        if let Some(ref token) = *cache {
            if token.is_valid_at(self.clock.now(), margin) {
                debug!(expires_at = %token.expires_at, "Using cached auth token");
                return Ok(token.token.clone());
            }
            debug!(expires_at = %token.expires_at, "Cached auth token expiring, renewing");
        }

        let fresh = self.authenticate(deadline).await?;
        let token = fresh.token.clone();
        info!(expires_at = %fresh.expires_at, "Authenticated with FordPass");
        *cache = Some(fresh);

        Ok(token)
    }

    /// Drop the cached token so the next call re-authenticates
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }

    /// Expiry of the cached token, if any
    pub async fn cached_expiry(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.cache.lock().await.as_ref().map(|t| t.expires_at)
    }

    /// Exchange username/password for a fresh token
    async fn authenticate(&self, deadline: &Deadline) -> Result<AuthToken> {
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("grant_type", "password"),
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
        ];

        let request = self
            .http
            .post(&self.config.auth_url)
            .headers(http::auth_headers(&self.config)?)
            .form(&form[..]);

        let response: AuthenticationResponse =
            http::send_json(request, self.config.request_timeout, deadline)
                .await
                .map_err(FordPassError::into_auth)?;

        if response.access_token.is_empty() {
            return Err(FordPassError::Auth(RequestError::Malformed(
                "empty access_token".to_string(),
            )));
        }
        if response.expires_in <= 0 {
            return Err(FordPassError::Auth(RequestError::Malformed(format!(
                "non-positive expires_in {}",
                response.expires_in
            ))));
        }

        let expires_at = chrono::TimeDelta::try_seconds(response.expires_in)
            .and_then(|ttl| self.clock.now().checked_add_signed(ttl))
            .ok_or_else(|| {
                FordPassError::Auth(RequestError::Malformed(format!(
                    "expires_in {} out of range",
                    response.expires_in
                )))
            })?;

        Ok(AuthToken {
            token: response.access_token,
            expires_at,
        })
    }
}
