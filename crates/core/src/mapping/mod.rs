//! Domain → archive-origin mappings.
//!
//! The persisted form is a flat JSON list of [`MappingEntry`] records. Each
//! request works against an immutable [`MappingTable`] snapshot built from
//! that list, so admin writes never disturb an in-flight lookup.

pub mod store;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use store::MappingStore;

/// One persisted mapping record, as written by the admin surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingEntry {
    /// Canonical domain, e.g. `example.com`.
    pub url: String,
    /// Archive URL prefix the domain's paths are appended to.
    #[serde(default)]
    pub archive_url: Option<String>,
    #[serde(default)]
    pub skip_root_page: bool,
}

/// A resolved mapping for one canonical domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainMapping {
    pub domain: String,
    /// Empty when the record carried no archive URL.
    pub archive_origin: String,
    pub skip_root_page: bool,
}

/// Immutable lookup table keyed by lowercase canonical domain.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    by_domain: HashMap<String, DomainMapping>,
}

impl MappingTable {
    /// Build a table from persisted records. Keys and origins are
    /// lowercased; when two records share a domain the later one wins.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a MappingEntry>) -> Self {
        let by_domain = entries
            .into_iter()
            .map(|entry| {
                let domain = entry.url.trim().to_lowercase();
                let mapping = DomainMapping {
                    domain: domain.clone(),
                    archive_origin: entry.archive_url.as_deref().unwrap_or_default().trim().to_lowercase(),
                    skip_root_page: entry.skip_root_page,
                };
                (domain, mapping)
            })
            .collect();

        Self { by_domain }
    }

    pub fn get(&self, domain: &str) -> Option<&DomainMapping> {
        self.by_domain.get(domain)
    }

    pub fn len(&self) -> usize {
        self.by_domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_domain.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DomainMapping> {
        self.by_domain.values()
    }
}
