//! Recovery of original URLs from archive-rewritten links.

use wayback_core::Error;

const IMAGE_EXTENSIONS: [&str; 4] = [".png", ".jpg", ".jpeg", ".gif"];

/// Strip the archive-service prefix from a rewritten link.
///
/// The archive embeds the original URL after its own prefix, so the last
/// `http` (any case) marks where it starts. Everything after the scheme
/// separator is returned; a link without `http` is returned unchanged.
///
/// ```text
/// https://web.archive.org/web/2000/http://example.com/a/b  ->  example.com/a/b
/// ```
///
/// This is a plain string scan: trailing garbage is kept as-is and the
/// result may be empty, but a link that ends before the `://` separator
/// is reported as [`Error::MalformedArchiveUrl`].
pub fn extract_original(archive_url: &str) -> Result<String, Error> {
    let Some(start) = archive_url.to_ascii_lowercase().rfind("http") else {
        return Ok(archive_url.to_string());
    };

    let mut offset = start + "http".len();
    if archive_url.as_bytes().get(offset).is_some_and(|b| b.eq_ignore_ascii_case(&b's')) {
        offset += 1;
    }
    offset += "://".len();

    archive_url
        .get(offset..)
        .map(str::to_string)
        .ok_or_else(|| Error::MalformedArchiveUrl(archive_url.to_string()))
}

/// Whether a URL names one of the proxied raster image types.
pub fn is_image_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
