//! Unified error types for the wayback proxy.
//!
//! Every pipeline stage returns one of these instead of unwinding, so the
//! server can decide in a single place which failures are client-facing
//! and which deserve the inline error page.

/// Unified error types for the wayback proxy.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input could not be parsed as a URL, even after scheme injection.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// No usable domain mapping for the requested path.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// Upstream archive answered with a non-success status.
    #[error("BAD_UPSTREAM: {0}")]
    BadUpstream(String),

    /// Archive-rewritten URL ended before the embedded original URL.
    #[error("MALFORMED_ARCHIVE_URL: {0}")]
    MalformedArchiveUrl(String),

    /// Upstream response body exceeded the configured limit.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Transport-level failure talking to the upstream.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// HTML rewriting aborted.
    #[error("REWRITE_FAILED: {0}")]
    RewriteFailed(String),

    /// Reading or writing the domain mapping file failed.
    #[error("MAPPING_STORE: {0}")]
    MappingStore(String),
}

impl Error {
    /// Whether this error is an anticipated, client-facing outcome rather
    /// than an unexpected fault.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Error::InvalidUrl(_) | Error::NotFound(_) | Error::BadUpstream(_) | Error::FetchTooLarge(_)
        )
    }

    /// Whether the upstream refused to serve the path. Only these are
    /// remembered by the negative-result cache.
    pub fn is_upstream_failure(&self) -> bool {
        matches!(self, Error::BadUpstream(_) | Error::FetchTooLarge(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MappingStore(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::MappingStore(err.to_string())
    }
}
