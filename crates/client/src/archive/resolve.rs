//! Mapping resolution: request path → upstream archive URL.

use wayback_core::{Error, MappingTable};

use super::domain::{normalize_domain, with_scheme};

/// Where to fetch a request from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Absolute upstream URL.
    pub fetch_url: String,
    /// Archive origin the URL was built from; `None` for raw pass-through.
    pub archive_origin: Option<String>,
}

/// Compose the upstream URL for `path`.
///
/// With `skip_mapping` the path is already a full URL and is used as-is,
/// with `http://` injected if it lacks a scheme. Otherwise the canonical
/// domain of the path selects an archive origin and the path is appended
/// to it. The table is never modified.
pub fn resolve(path: &str, mappings: &MappingTable, skip_mapping: bool) -> Result<Resolved, Error> {
    if skip_mapping {
        return Ok(Resolved { fetch_url: with_scheme(path), archive_origin: None });
    }

    let domain = normalize_domain(path)?;
    let mapping = mappings
        .get(&domain)
        .ok_or_else(|| Error::NotFound(format!("no mapping for domain {domain} (path {path})")))?;

    if mapping.archive_origin.is_empty() {
        return Err(Error::NotFound(format!("mapping misconfigured for domain {domain}")));
    }

    Ok(Resolved {
        fetch_url: format!("{}{}", mapping.archive_origin, path),
        archive_origin: Some(mapping.archive_origin.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayback_core::MappingEntry;

    fn table() -> MappingTable {
        let entries = [
            MappingEntry {
                url: "example.com".into(),
                archive_url: Some("https://web.archive.org/web/1999/".into()),
                skip_root_page: false,
            },
            MappingEntry { url: "broken.com".into(), archive_url: None, skip_root_page: false },
        ];
        MappingTable::from_entries(&entries)
    }

    #[test]
    fn test_resolve_mapped_domain() {
        let resolved = resolve("www.example.com/index.html", &table(), false).unwrap();
        assert_eq!(resolved.fetch_url, "https://web.archive.org/web/1999/www.example.com/index.html");
        assert_eq!(resolved.archive_origin.as_deref(), Some("https://web.archive.org/web/1999/"));
    }

    #[test]
    fn test_resolve_unmapped_domain() {
        let result = resolve("other.org/index.html", &table(), false);
        assert!(matches!(result, Err(Error::NotFound(msg)) if msg.contains("no mapping")));
    }

    #[test]
    fn test_resolve_misconfigured_mapping() {
        let result = resolve("broken.com/", &table(), false);
        assert!(matches!(result, Err(Error::NotFound(msg)) if msg.contains("misconfigured")));
    }

    #[test]
    fn test_resolve_skip_mapping() {
        let resolved = resolve("web-static.archive.org/_static/css/banner.css", &table(), true).unwrap();
        assert_eq!(resolved.fetch_url, "http://web-static.archive.org/_static/css/banner.css");
        assert!(resolved.archive_origin.is_none());

        let resolved = resolve("https://web-static.archive.org/x.js", &MappingTable::default(), true).unwrap();
        assert_eq!(resolved.fetch_url, "https://web-static.archive.org/x.js");
    }

    #[test]
    fn test_resolve_invalid_path() {
        assert!(matches!(resolve("", &table(), false), Err(Error::InvalidUrl(_))));
    }
}
