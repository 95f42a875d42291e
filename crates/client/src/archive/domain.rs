//! Canonical domain extraction for mapping lookups.

use url::Url;
use wayback_core::Error;

/// Prefix `http://` unless the input already names an http(s) scheme.
pub fn with_scheme(input: &str) -> String {
    let lower = input.get(..8).unwrap_or(input).to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        input.to_string()
    } else {
        format!("http://{input}")
    }
}

/// Reduce a URL or bare path to its canonical two-label domain.
///
/// `foo.bar.example.com/x` becomes `example.com`. Multi-part public
/// suffixes such as `.co.uk` are not recognised: `news.bbc.co.uk` maps to
/// `co.uk`.
pub fn normalize_domain(input: &str) -> Result<String, Error> {
    let url = Url::parse(&with_scheme(input.trim())).map_err(|e| Error::InvalidUrl(format!("{input}: {e}")))?;
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| Error::InvalidUrl(format!("{input}: no host")))?;

    let labels: Vec<&str> = host.split('.').collect();
    let domain = if labels.len() > 2 { labels[labels.len() - 2..].join(".") } else { host.to_string() };

    Ok(domain.to_lowercase())
}
