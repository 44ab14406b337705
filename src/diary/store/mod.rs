//! Durable entry history per session.
//!
//! The orchestrator only relies on `append` being visible to a later `list`
//! in the same process; atomicity and retention beyond `trim` belong to the
//! backend.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryEntryStore;
pub use sqlite::SqliteEntryStore;

use super::types::Entry;
use crate::config::{StoreBackend, StoreConfig};
use crate::error::StoreError;
use anyhow::Context;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

pub trait EntryStore: Send + Sync {
    fn name(&self) -> &str;

    fn append<'a>(&'a self, session_id: &'a str, entry: &'a Entry) -> StoreFuture<'a, ()>;

    /// Newest first, at most `limit` entries.
    fn list<'a>(&'a self, session_id: &'a str, limit: usize) -> StoreFuture<'a, Vec<Entry>>;

    /// Keep the newest `max_count` entries; returns how many were dropped.
    fn trim<'a>(&'a self, session_id: &'a str, max_count: usize) -> StoreFuture<'a, usize>;
}

/// Build the configured store backend.
pub async fn create_store(
    config: &StoreConfig,
    workspace_dir: &Path,
) -> anyhow::Result<Arc<dyn EntryStore>> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(InMemoryEntryStore::new())),
        StoreBackend::Sqlite => {
            let path = config.resolve_path(workspace_dir);
            let store = SqliteEntryStore::open(&path)
                .await
                .with_context(|| format!("Failed to open diary store: {}", path.display()))?;
            Ok(Arc::new(store))
        }
    }
}
