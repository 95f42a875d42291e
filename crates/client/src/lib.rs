//! Client code for the wayback proxy.
//!
//! This crate provides the archive URL helpers, the upstream fetch client,
//! and the toolbar-strip/link-rewrite pipeline used by the server.

pub mod archive;
pub mod fetch;
pub mod render;
pub mod rewrite;

pub use archive::{Resolved, extract_original, is_image_url, normalize_domain, resolve, with_scheme};
pub use fetch::{FetchClient, FetchConfig, FetchResponse};
pub use render::{DEFAULT_IMAGE_CONTENT_TYPE, Rendered, RenderedImage, render_document, render_image};
pub use rewrite::{ImageLink, RewriteOptions, Rewritten, relative_link, rewrite_links, strip_toolbar};
