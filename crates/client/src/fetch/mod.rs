//! Upstream HTTP fetch.
//!
//! One [`FetchClient`] is built at startup and shared by every request;
//! reqwest pools connections internally.
//!
//! - Non-success statuses become [`Error::BadUpstream`]
//! - Bodies above `max_bytes` become [`Error::FetchTooLarge`]
//! - Transport failures become [`Error::HttpError`]

use bytes::Bytes;
use reqwest::Url;
use reqwest::{Client, StatusCode, header};
use std::time::{Duration, Instant};

use wayback_core::{AppConfig, Error};

/// Limits applied to every upstream request.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    /// Body cap in bytes, checked against `Content-Length` and the body read.
    pub max_bytes: usize,
    pub timeout: Duration,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            max_redirects: config.max_redirects,
        }
    }
}

/// A successful upstream response.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// URL after redirects; relative links resolve against it.
    pub final_url: Url,
    pub status: StatusCode,
    /// Media type from the Content-Type header, without parameters
    pub content_type: Option<String>,
    pub bytes: Bytes,
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Shared upstream HTTP client.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Build the pooled client; fails only if the TLS backend cannot start.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// GET `url_str`, following redirects, and buffer the body.
    pub async fn fetch(&self, url_str: &str) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let url = Url::parse(url_str).map_err(|e| Error::InvalidUrl(format!("{url_str}: {e}")))?;

        let response = self
            .http
            .get(url.clone())
            .header(header::ACCEPT, "text/html,application/xhtml+xml,image/*;q=0.9,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| Error::HttpError(format!("network error: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            tracing::debug!(url = %url, status = status.as_u16(), "upstream refused");
            return Err(Error::BadUpstream(format!("status {} from {}", status.as_u16(), url)));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(';').next())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::HttpError(format!("failed to read response: {}", e)))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(url = %url, final_url = %final_url, fetch_ms, bytes = bytes.len(), "fetched upstream");

        Ok(FetchResponse { final_url, status, content_type, bytes, fetch_ms })
    }
}
