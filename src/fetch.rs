//! Shared HTTP plumbing for source adapters.
//!
//! Every adapter funnels its outbound calls through these helpers: one
//! client configuration, a bounded per-call timeout, and up to three
//! attempts with linear backoff on transient failures (429 and 5xx) or
//! transport errors. Anything else surfaces as a [`FetchError`] for the
//! adapter to convert into a missing-source outcome.

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt;
use std::time::Duration;
use tokio::time::sleep;

/// Browser-style agent string; several scraped sources reject default
/// library agents outright.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const MAX_ATTEMPTS: usize = 3;
const BACKOFF_STEP: Duration = Duration::from_millis(750);

/// Builds the shared client used across all adapters.
pub fn build_client(timeout: Duration) -> Result<Client, FetchError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(timeout)
        .build()
        .map_err(FetchError::Build)
}

/// Issues a GET and returns the response body as text, retrying transient
/// failures.
pub async fn get_text(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = get_with_retry(client, url, &[]).await?;
    response.text().await.map_err(FetchError::Transport)
}

/// Issues a GET and deserializes the JSON response body, retrying transient
/// failures.
pub async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    headers: &[(&str, &str)],
) -> Result<T, FetchError> {
    let response = get_with_retry(client, url, headers).await?;
    response.json().await.map_err(FetchError::Transport)
}

/// Quick availability probes get a tighter budget than full page fetches.
const HEAD_TIMEOUT: Duration = Duration::from_secs(5);

/// Issues a HEAD request, reporting only whether the target answered 200.
pub async fn head_ok(client: &Client, url: &str) -> bool {
    matches!(
        client.head(url).timeout(HEAD_TIMEOUT).send().await,
        Ok(response) if response.status() == StatusCode::OK
    )
}

async fn get_with_retry(
    client: &Client,
    url: &str,
    headers: &[(&str, &str)],
) -> Result<Response, FetchError> {
    let mut attempt = 0usize;
    loop {
        let mut request = client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return Ok(response);
                }
                if should_retry(status) && attempt + 1 < MAX_ATTEMPTS {
                    attempt += 1;
                    sleep(BACKOFF_STEP * attempt as u32).await;
                    continue;
                }
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status,
                });
            }
            Err(err) => {
                if attempt + 1 < MAX_ATTEMPTS {
                    attempt += 1;
                    sleep(BACKOFF_STEP * attempt as u32).await;
                    continue;
                }
                return Err(FetchError::Transport(err));
            }
        }
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Errors surfaced by the HTTP helpers.
#[derive(Debug)]
pub enum FetchError {
    /// Client construction failed.
    Build(reqwest::Error),
    /// The request failed at the transport layer after retries.
    Transport(reqwest::Error),
    /// The server answered with a non-success status after retries.
    Status {
        /// Requested URL.
        url: String,
        /// Final status code observed.
        status: StatusCode,
    },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build(err) => write!(f, "http client build error: {err}"),
            Self::Transport(err) => write!(f, "http transport error: {err}"),
            Self::Status { url, status } => write!(f, "{url} answered {status}"),
        }
    }
}

impl Error for FetchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Build(err) | Self::Transport(err) => Some(err),
            Self::Status { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_only_on_throttle_and_server_errors() {
        assert!(should_retry(StatusCode::TOO_MANY_REQUESTS));
        assert!(should_retry(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(should_retry(StatusCode::BAD_GATEWAY));
        assert!(!should_retry(StatusCode::NOT_FOUND));
        assert!(!should_retry(StatusCode::FORBIDDEN));
    }

    #[test]
    fn fetch_error_displays_the_failing_url() {
        let err = FetchError::Status {
            url: "https://example.com/q".to_string(),
            status: StatusCode::NOT_FOUND,
        };
        assert!(err.to_string().contains("https://example.com/q"));
    }
}
