//! Document and image rendering.
//!
//! A document render is fetch → toolbar strip → link rewrite; an image
//! render is a plain fetch that keeps the upstream content type. Neither
//! touches a cache: callers decide what to store.

use bytes::Bytes;
use wayback_core::{Error, RenderedDocument};

use crate::archive::Resolved;
use crate::fetch::FetchClient;
use crate::rewrite::{ImageLink, RewriteOptions, rewrite_links, strip_toolbar};

/// Content type used when the upstream does not declare one for an image.
pub const DEFAULT_IMAGE_CONTENT_TYPE: &str = "image/png";

/// A rewritten document plus the image links discovered in it.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub document: RenderedDocument,
    pub images: Vec<ImageLink>,
}

/// Image bytes ready to stream back.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub bytes: Bytes,
    pub content_type: String,
}

/// Fetch a document from the archive and rewrite it for local serving.
pub async fn render_document(
    client: &FetchClient, resolved: &Resolved, link_prefix: Option<&str>,
) -> Result<Rendered, Error> {
    let response = client.fetch(&resolved.fetch_url).await?;
    let body = response.text();
    let cleaned = strip_toolbar(&body);

    let options = RewriteOptions {
        archive_origin: resolved.archive_origin.as_deref(),
        document_url: Some(&response.final_url),
        link_prefix,
    };
    let rewritten = rewrite_links(&cleaned, &options)?;

    tracing::debug!(
        url = %resolved.fetch_url,
        images = rewritten.images.len(),
        bytes = rewritten.html.len(),
        "rewrote document"
    );

    Ok(Rendered { document: RenderedDocument::new(rewritten.html), images: rewritten.images })
}

/// Fetch image bytes without any processing.
pub async fn render_image(client: &FetchClient, archive_url: &str) -> Result<RenderedImage, Error> {
    let response = client.fetch(archive_url).await?;
    let content_type = response.content_type.unwrap_or_else(|| DEFAULT_IMAGE_CONTENT_TYPE.to_string());

    Ok(RenderedImage { bytes: response.bytes, content_type })
}
