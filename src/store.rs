//! Document store: where map-bearing documents live.
//!
//! The map block is only ever a slice of a larger document, so the store
//! deals in whole-document text. Reads happen immediately before every
//! save so edits made to the rest of the document survive.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::RwLock;

use crate::error::StoreError;

/// Async access to document text by id. Enables mocking in tests.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Current full text of the document, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    async fn read(&self, id: &str) -> Result<Option<String>, StoreError>;

    /// Replace the full text of the document.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    async fn write(&self, id: &str, text: &str) -> Result<(), StoreError>;
}

// =============================================================================
// FILESYSTEM
// =============================================================================

/// Documents stored as files beneath a root directory. The id is a relative
/// path such as `campaign/harbor.md`.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FsDocumentStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        let rel = Path::new(id);
        let escapes = rel.components().any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if id.is_empty() || escapes {
            return Err(StoreError::Rejected(format!("invalid document id: {id}")));
        }
        Ok(self.root.join(rel))
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait::async_trait]
impl DocumentStore for FsDocumentStore {
    async fn read(&self, id: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(id)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, id: &str, text: &str) -> Result<(), StoreError> {
        let path = self.path_for(id)?;
        tokio::fs::write(&path, text).await?;
        Ok(())
    }
}

// =============================================================================
// IN-MEMORY
// =============================================================================

/// Documents held in memory. Counts writes and can be told to reject the
/// next few of them.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    docs: RwLock<HashMap<String, String>>,
    writes: AtomicUsize,
    failures: AtomicUsize,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or overwrite a document without counting it as a write.
    pub async fn insert(&self, id: impl Into<String>, text: impl Into<String>) {
        self.docs.write().await.insert(id.into(), text.into());
    }

    /// Delete a document, returning its last text.
    pub async fn remove(&self, id: &str) -> Option<String> {
        self.docs.write().await.remove(id)
    }

    pub async fn get(&self, id: &str) -> Option<String> {
        self.docs.read().await.get(id).cloned()
    }

    /// Successful writes so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Reject the next `n` writes with [`StoreError::Rejected`].
    pub fn fail_next_writes(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    fn take_failure(&self) -> bool {
        self.failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn read(&self, id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get(id).await)
    }

    async fn write(&self, id: &str, text: &str) -> Result<(), StoreError> {
        if self.take_failure() {
            return Err(StoreError::Rejected(format!("injected failure writing {id}")));
        }
        let mut docs = self.docs.write().await;
        let Some(slot) = docs.get_mut(id) else {
            return Err(StoreError::NotFound(id.to_owned()));
        };
        text.clone_into(slot);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
