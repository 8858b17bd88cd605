//! Shared request plumbing: deadline-guarded send, status check, JSON decode

use crate::config::Config;
use crate::deadline::Deadline;
use crate::error::{RequestError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::trace;

const MAX_ERROR_BODY: usize = 512;

pub(crate) fn build_client(config: &Config) -> Result<Client> {
    Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| RequestError::Transport(e).into())
}

/// Headers sent to the vehicle API alongside `auth-token`
pub(crate) fn api_headers(config: &Config, token: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, header_value(&config.user_agent)?);
    headers.insert("application-id", header_value(&config.application_id)?);
    headers.insert("auth-token", header_value(token)?);
    Ok(headers)
}

/// Headers sent to the token endpoint
pub(crate) fn auth_headers(config: &Config) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);
    headers.insert(USER_AGENT, header_value(&config.user_agent)?);
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );
    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| {
        RequestError::Malformed(format!("header value not representable: {}", e)).into()
    })
}

/// Send `request` and decode a JSON body.
///
/// Non-success statuses become [`RequestError::Status`]; the caller's deadline
/// wraps the whole exchange, including reading the body.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    timeout: Duration,
    deadline: &Deadline,
) -> Result<T> {
    let response = deadline
        .guard(request.send())
        .await?
        .map_err(|e| RequestError::from_reqwest(e, timeout))?;

    let status = response.status();
    trace!(status = status.as_u16(), url = %response.url(), "response received");

    let body = deadline
        .guard(response.bytes())
        .await?
        .map_err(|e| RequestError::from_reqwest(e, timeout))?;

    if !status.is_success() {
        let mut text = String::from_utf8_lossy(&body).into_owned();
        if text.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
        }
        return Err(RequestError::Status {
            status: status.as_u16(),
            body: text,
        }
        .into());
    }

    serde_json::from_slice(&body).map_err(|e| RequestError::Decode(e).into())
}
