//! Structured errors for the proxy server and their HTTP rendering.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use wayback_core::Error;

/// Structured errors for the proxy server.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Plain-text paths are never proxied.
    #[error("TEXT_FILE: {0}")]
    TextFile(String),

    /// Path already failed upstream once.
    #[error("KNOWN_BAD: {0}")]
    KnownBad(String),

    #[error(transparent)]
    Pipeline(#[from] Error),
}

impl ProxyError {
    /// Whether this is an anticipated outcome rather than a fault.
    pub fn is_rejection(&self) -> bool {
        match self {
            ProxyError::TextFile(_) | ProxyError::KnownBad(_) => true,
            ProxyError::Pipeline(err) => err.is_rejection(),
        }
    }
}

/// Escape HTML special characters for safe rendering.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Inline page shown for unexpected failures.
pub fn error_page(message: &str) -> String {
    format!(
        "<html><body><h1>Error occurred while trying to fetch 90's internet:</h1></br></br>{}</body></html>",
        html_escape(message)
    )
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            ProxyError::TextFile(_) | ProxyError::KnownBad(_) => StatusCode::BAD_REQUEST.into_response(),
            ProxyError::Pipeline(Error::NotFound(msg)) => (StatusCode::NOT_FOUND, msg).into_response(),
            ProxyError::Pipeline(Error::BadUpstream(_) | Error::FetchTooLarge(_) | Error::InvalidUrl(_)) => {
                StatusCode::BAD_REQUEST.into_response()
            }
            ProxyError::Pipeline(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/html")],
                error_page(&err.to_string()),
            )
                .into_response(),
        }
    }
}
