//! Rendered document type held by the document tier.

use bytes::Bytes;

/// Content type every rendered document is served with.
pub const HTML_CONTENT_TYPE: &str = "text/html";

/// Fully link-rewritten HTML, ready to serve.
///
/// The markup is held as [`Bytes`] so every cache hit hands out the same
/// buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    body: Bytes,
    pub content_type: &'static str,
}

impl RenderedDocument {
    pub fn new(html: impl Into<String>) -> Self {
        Self { body: Bytes::from(html.into()), content_type: HTML_CONTENT_TYPE }
    }

    /// Response body; shares the underlying buffer.
    pub fn body(&self) -> Bytes {
        self.body.clone()
    }

    /// Markup as text. Always valid UTF-8, since it is only built from a `String`.
    pub fn html(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap_or_default()
    }
}
