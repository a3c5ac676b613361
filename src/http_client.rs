use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, ORIGIN, REFERER, USER_AGENT,
};

const REQUEST_TIMEOUT_SECS: u64 = 10;
const RETRY_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF_MS: u64 = 500;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client. Built once; the upstream expects a browser-like
/// header set on every call.
pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .default_headers(default_headers())
            .build()
            .context("failed to build http client")
    })
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://www.365scores.com"));
    headers.insert(
        REFERER,
        HeaderValue::from_static("https://www.365scores.com/"),
    );
    headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));
    headers
}

/// Send a GET request with bounded retries and a fixed backoff. Only
/// transport errors, 429 and 5xx are retried; every other status is handed
/// back to the caller as-is (the cache layer needs to see 304s).
pub fn send_with_retry(req: RequestBuilder) -> Result<Response> {
    let mut last_err = None;
    for attempt in 0..RETRY_ATTEMPTS {
        let Some(cloned) = req.try_clone() else {
            break;
        };
        match cloned.send() {
            Ok(resp) if !retryable_status(resp.status()) => return Ok(resp),
            Ok(resp) => last_err = Some(anyhow::anyhow!("http {}", resp.status())),
            Err(err) => last_err = Some(anyhow::Error::new(err).context("request failed")),
        }
        if attempt + 1 < RETRY_ATTEMPTS {
            thread::sleep(Duration::from_millis(RETRY_BACKOFF_MS));
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("request could not be sent")))
}

/// GET a body as text, retrying per [`send_with_retry`]. Non-success
/// statuses that survive the retry policy become errors here.
pub fn get_with_retry(client: &Client, url: &str) -> Result<String> {
    let resp = send_with_retry(client.get(url))?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {status}: {body}"));
    }
    Ok(body)
}

fn retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
