//! Cache key generation for the document tier.

/// Key for a rendered document: `host.path`, so one path served under two
/// virtual hosts is cached twice.
pub fn document_key(host: &str, path: &str) -> String {
    format!("{host}.{path}")
}
