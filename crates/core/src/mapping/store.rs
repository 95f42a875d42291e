//! File-backed mapping store.
//!
//! Holds the persisted entry list plus the snapshot derived from it. Every
//! write rewrites the whole file and swaps in a fresh [`MappingTable`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{MappingEntry, MappingTable};
use crate::Error;

struct State {
    entries: Vec<MappingEntry>,
    table: Arc<MappingTable>,
}

impl State {
    fn new(entries: Vec<MappingEntry>) -> Self {
        let table = Arc::new(MappingTable::from_entries(&entries));
        Self { entries, table }
    }
}

/// JSON-file mapping store shared by the proxy and the admin endpoints.
pub struct MappingStore {
    path: PathBuf,
    state: RwLock<State>,
}

impl MappingStore {
    /// Load the store from `path`. A missing file yields an empty store.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();

        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(json) if json.trim().is_empty() => Vec::new(),
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "mapping file not found, starting empty");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(path = %path.display(), count = entries.len(), "loaded domain mappings");

        Ok(Self { path, state: RwLock::new(State::new(entries)) })
    }

    /// Store backed by `path` with the given entries, without touching disk.
    pub fn with_entries(path: impl Into<PathBuf>, entries: Vec<MappingEntry>) -> Self {
        Self { path: path.into(), state: RwLock::new(State::new(entries)) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current immutable lookup table.
    pub async fn snapshot(&self) -> Arc<MappingTable> {
        self.state.read().await.table.clone()
    }

    /// Persisted entries in file order.
    pub async fn entries(&self) -> Vec<MappingEntry> {
        self.state.read().await.entries.clone()
    }

    /// Append an entry and persist.
    pub async fn add(&self, entry: MappingEntry) -> Result<MappingEntry, Error> {
        let mut state = self.state.write().await;

        let mut entries = state.entries.clone();
        entries.push(entry.clone());
        self.persist(&entries).await?;
        *state = State::new(entries);

        Ok(entry)
    }

    /// Replace the archive URL and root-page flag of the entry whose `url`
    /// matches (case-insensitive). Returns `None` when nothing matched.
    pub async fn update(&self, entry: MappingEntry) -> Result<Option<MappingEntry>, Error> {
        let mut state = self.state.write().await;

        let mut entries = state.entries.clone();
        let Some(existing) = entries.iter_mut().find(|e| e.url.eq_ignore_ascii_case(&entry.url)) else {
            return Ok(None);
        };
        existing.archive_url = entry.archive_url.clone();
        existing.skip_root_page = entry.skip_root_page;

        self.persist(&entries).await?;
        *state = State::new(entries);

        Ok(Some(entry))
    }

    async fn persist(&self, entries: &[MappingEntry]) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, json).await?;
        tracing::debug!(path = %self.path.display(), count = entries.len(), "persisted domain mappings");
        Ok(())
    }
}
