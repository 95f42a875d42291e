//! Archive markup cleanup and link rewriting.
//!
//! ### Toolbar Stripping
//! - Remove the block between the archive's toolbar begin/end comments.
//!
//! ### Link Rewriting
//! - Every `href` and `src` attribute is rewritten on its own: the archive
//!   origin prefix is dropped, then the embedded original URL recovered.
//! - Image-valued attributes are also reported back so the caller can map
//!   the local path to the absolute archive URL.
//! - The rewriter runs in non-strict mode and never rejects malformed
//!   markup.

use std::borrow::Cow;
use std::sync::LazyLock;

use lol_html::errors::RewritingError;
use lol_html::{HtmlRewriter, Settings, element};
use regex::Regex;
use url::Url;
use wayback_core::Error;

use crate::archive::{extract_original, is_image_url};

static TOOLBAR_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!-- BEGIN WAYBACK TOOLBAR INSERT -->.*?<!-- END WAYBACK TOOLBAR INSERT -->")
        .expect("invalid toolbar pattern")
});

const URL_ATTRIBUTES: [&str; 2] = ["href", "src"];

/// Inputs that shape how links are rewritten for one document.
#[derive(Debug, Clone, Copy, Default)]
pub struct RewriteOptions<'a> {
    /// Archive origin the document was fetched from.
    pub archive_origin: Option<&'a str>,
    /// URL the document was fetched from, for resolving relative image links.
    pub document_url: Option<&'a Url>,
    /// Prefix placed in front of every rewritten link.
    pub link_prefix: Option<&'a str>,
}

/// An image reference found while rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLink {
    /// Proxy-local path the page now points at (lowercase, no prefix).
    pub local_path: String,
    /// Absolute archive URL to fetch the image from.
    pub archive_url: String,
}

/// Output of [`rewrite_links`].
#[derive(Debug, Clone)]
pub struct Rewritten {
    pub html: String,
    pub images: Vec<ImageLink>,
}

/// Remove the archive toolbar injection, if present.
pub fn strip_toolbar(html: &str) -> Cow<'_, str> {
    TOOLBAR_BLOCK.replace_all(html, "")
}

/// Turn one archive link into its site-relative form, without prefix.
pub fn relative_link(value: &str, archive_origin: Option<&str>) -> Result<String, Error> {
    let stripped = archive_origin
        .filter(|origin| !origin.is_empty())
        .and_then(|origin| {
            value
                .get(..origin.len())
                .filter(|head| head.eq_ignore_ascii_case(origin))
                .map(|_| &value[origin.len()..])
        })
        .unwrap_or(value);

    extract_original(stripped)
}

fn with_prefix(link: &str, prefix: Option<&str>) -> String {
    match prefix {
        Some(prefix) => format!("{}/{}", prefix, link.trim_start_matches('/')),
        None => link.to_string(),
    }
}

fn absolute_archive_url(value: &str, document_url: Option<&Url>) -> String {
    document_url
        .and_then(|base| base.join(value).ok())
        .map(|url| url.to_string())
        .unwrap_or_else(|| value.to_string())
}

fn rewrite_error(err: RewritingError) -> Error {
    match err {
        RewritingError::ContentHandlerError(inner) => match inner.downcast::<Error>() {
            Ok(err) => *err,
            Err(other) => Error::RewriteFailed(other.to_string()),
        },
        other => Error::RewriteFailed(other.to_string()),
    }
}

/// Rewrite every `href`/`src` attribute of `html` to site-relative form.
pub fn rewrite_links(html: &str, options: &RewriteOptions<'_>) -> Result<Rewritten, Error> {
    let mut output = Vec::with_capacity(html.len());
    let mut images = Vec::new();

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![element!("*", |el| {
                for attr in URL_ATTRIBUTES {
                    let Some(value) = el.get_attribute(attr) else {
                        continue;
                    };

                    // A link cut off after `http` has no recoverable original, and it
                    // aborts the whole page rather than serving a half-rewritten one.
                    let relative = relative_link(&value, options.archive_origin)?;

                    if is_image_url(&relative) {
                        images.push(ImageLink {
                            local_path: relative.trim_start_matches('/').to_lowercase(),
                            archive_url: absolute_archive_url(&value, options.document_url),
                        });
                    }

                    el.set_attribute(attr, &with_prefix(&relative, options.link_prefix))?;
                }
                Ok(())
            })],
            strict: false,
            ..Settings::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    rewriter.write(html.as_bytes()).map_err(rewrite_error)?;
    rewriter.end().map_err(rewrite_error)?;

    let html = String::from_utf8(output).map_err(|e| Error::RewriteFailed(format!("invalid UTF-8: {e}")))?;

    Ok(Rewritten { html, images })
}
