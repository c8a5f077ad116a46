//! Blocking HTTP GET over libcurl.
//!
//! One attempt per call: no retry, no backoff. The timeout bounds the whole
//! transfer and the configured `User-Agent` is sent on every request.

use std::time::Duration;
use thiserror::Error;

/// Redirect hops followed before giving up.
const MAX_REDIRECTS: u32 = 10;

/// Transport-level failure of a single GET.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, DNS, invalid URL, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Curl(e) if e.is_operation_timedout())
    }
}

/// Minimal GET client carrying the fixed client-identifying header.
#[derive(Debug, Clone)]
pub struct HttpClient {
    user_agent: String,
    connect_timeout: Duration,
}

impl HttpClient {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Performs one GET and returns the full response body.
    ///
    /// `headers` are extra `(name, value)` pairs (e.g. `Authorization`).
    /// Follows redirects. Fails on any curl error or non-2xx final status.
    pub fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<Vec<u8>, FetchError> {
        let mut body = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(MAX_REDIRECTS)?;
        easy.useragent(&self.user_agent)?;
        easy.connect_timeout(self.connect_timeout.min(timeout))?;
        easy.timeout(timeout)?;

        if !headers.is_empty() {
            let mut list = curl::easy::List::new();
            for (k, v) in headers {
                list.append(&format!("{}: {}", k.trim(), v.trim()))?;
            }
            easy.http_headers(list)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        Ok(body)
    }
}
