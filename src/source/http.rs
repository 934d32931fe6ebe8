//! Shared HTTP client for the download page and archive requests.

use crate::constants::USER_AGENT;
use crate::core::UpdaterError;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

/// Build a [`reqwest::Client`] with the updater's User-Agent and timeouts.
///
/// `timeout` bounds connecting and each read, not the whole transfer: a large
/// archive on a slow link succeeds as long as bytes keep arriving.
///
/// # Errors
///
/// Returns [`UpdaterError::Config`] if the client cannot be constructed
/// (for example, when no TLS backend is available).
pub fn build_client(timeout: Duration) -> Result<Client, UpdaterError> {
    Client::builder()
        .connect_timeout(timeout)
        .read_timeout(timeout)
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| UpdaterError::Config {
            message: format!("failed to build HTTP client: {e}"),
        })
}

/// Sends a GET request and fails on non-success status codes.
///
/// `timeout` is only used to describe a timeout in the returned error; the
/// deadline itself is enforced by the client.
///
/// # Errors
///
/// [`UpdaterError::Timeout`] when the request times out, otherwise
/// [`UpdaterError::Network`].
pub async fn get(client: &Client, url: &str, timeout: Duration) -> Result<Response, UpdaterError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| UpdaterError::from_request(url, timeout, e))?;

    debug!(status = %response.status(), "GET {url}");
    response.error_for_status().map_err(|e| UpdaterError::from_request(url, timeout, e))
}

/// GETs `url` and returns the body as text.
///
/// # Errors
///
/// Same as [`get`], plus body read failures.
pub async fn get_text(client: &Client, url: &str, timeout: Duration) -> Result<String, UpdaterError> {
    get(client, url, timeout)
        .await?
        .text()
        .await
        .map_err(|e| UpdaterError::from_request(url, timeout, e))
}
