//! Caller-controlled listing cache.
//!
//! [`CachedStore`] keeps the last [`Listing`] built by a
//! [`DocumentStore`] together with a [`Fingerprint`] of the content root.
//! A later call reuses the listing while the fingerprint is unchanged.
//! The fingerprint is built from file metadata only, so an edit that keeps
//! both size and modification time is not seen; call
//! [`CachedStore::invalidate`] in that case.
//!
//! There is no process-wide instance: whoever needs caching owns one.

use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::Mutex;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::models::{Listing, RenderedDocument};
use crate::store::DocumentStore;

/// Summary of the content root's file metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fingerprint {
    pub entries: usize,
    pub total_bytes: u64,
    pub newest: Option<SystemTime>,
}

impl Fingerprint {
    /// Fingerprint of `root` and its direct children. A missing root has
    /// the default fingerprint.
    pub fn of(root: &Path) -> Result<Self> {
        let mut fingerprint = Self::default();
        if !root.exists() {
            return Ok(fingerprint);
        }

        for entry in WalkDir::new(root).max_depth(1) {
            let entry = entry.map_err(|err| {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                Error::file_system(path, err.into())
            })?;
            let meta = entry
                .metadata()
                .map_err(|err| Error::file_system(entry.path(), err.into()))?;

            if entry.depth() > 0 {
                fingerprint.entries += 1;
                fingerprint.total_bytes += meta.len();
            }
            if let Ok(modified) = meta.modified() {
                fingerprint.newest = fingerprint.newest.max(Some(modified));
            }
        }
        Ok(fingerprint)
    }
}

struct Slot {
    fingerprint: Fingerprint,
    with_bodies: bool,
    listing: Arc<Listing>,
}

pub struct CachedStore {
    store: DocumentStore,
    slot: Mutex<Option<Slot>>,
}

impl CachedStore {
    pub fn new(store: DocumentStore) -> Self {
        Self {
            store,
            slot: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// The cached listing, rebuilt when the content root changed or when
    /// bodies are requested but the cached listing has none.
    pub async fn listing(&self, with_bodies: bool) -> Result<Arc<Listing>> {
        let fingerprint = Fingerprint::of(self.store.root())?;
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            if cached.fingerprint == fingerprint && (cached.with_bodies || !with_bodies) {
                debug!(root = %self.store.root().display(), "listing cache hit");
                return Ok(Arc::clone(&cached.listing));
            }
        }

        debug!(root = %self.store.root().display(), "listing cache miss");
        let listing = Arc::new(self.store.listing(with_bodies).await?);
        *slot = Some(Slot {
            fingerprint,
            with_bodies,
            listing: Arc::clone(&listing),
        });
        Ok(listing)
    }

    pub async fn list_all(&self) -> Result<Vec<RenderedDocument>> {
        Ok(self.listing(true).await?.documents.clone())
    }

    /// Look a document up in the cached listing. Documents a listing
    /// leaves out, such as undated ones, are read from the store.
    pub async fn get_by_identifier(&self, identifier: &str) -> Result<Option<RenderedDocument>> {
        if let Some(doc) = self.listing(true).await?.get(identifier) {
            return Ok(Some(doc.clone()));
        }
        self.store.get_by_identifier(identifier).await
    }

    /// Drop the cached listing; the next call rebuilds it.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}
