//! Process-lifetime in-memory caches.
//!
//! Three independent tiers share one generic store:
//!
//! - images: proxy-local image path → archive-absolute image URL
//! - documents: `host.path` → fully rewritten document
//! - failures: path → known-bad upstream result
//!
//! Entries never expire and are never evicted; a later write for the same
//! key simply replaces the earlier value. Locks are only held for the map
//! operation itself, never across a network call.

pub mod document;
pub mod key;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

pub use document::RenderedDocument;
pub use key::document_key;

/// Concurrent key → value store with last-writer-wins semantics.
pub struct MemoryTier<V> {
    entries: RwLock<HashMap<String, V>>,
}

impl<V: Clone> MemoryTier<V> {
    pub fn new() -> Self {
        Self { entries: RwLock::new(HashMap::new()) }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn set(&self, key: impl Into<String>, value: V) {
        self.entries.write().await.insert(key.into(), value);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl<V: Clone> Default for MemoryTier<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Negative-result tier.
///
/// Only ever stores `false`. An absent key and a stored `true` both mean
/// "no known failure".
#[derive(Default)]
pub struct FailureCache {
    tier: MemoryTier<bool>,
}

impl FailureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember that `path` failed upstream.
    pub async fn mark_failed(&self, path: &str) {
        self.tier.set(path, false).await;
    }

    /// True only for an explicitly stored failure.
    pub async fn is_known_bad(&self, path: &str) -> bool {
        self.tier.get(path).await == Some(false)
    }

    pub async fn len(&self) -> usize {
        self.tier.len().await
    }
}

/// The three cache tiers, created once at startup and shared by every
/// request.
#[derive(Default)]
pub struct CacheTiers {
    pub images: MemoryTier<String>,
    pub documents: MemoryTier<Arc<RenderedDocument>>,
    pub failures: FailureCache,
}

impl CacheTiers {
    pub fn new() -> Self {
        Self::default()
    }
}
