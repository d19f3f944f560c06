//! Save bridge: debounced, serialized persistence of a map into its owning
//! document.
//!
//! DESIGN
//! ======
//! A background worker owns the pending map. Every mutation replaces the
//! pending snapshot and pushes the save deadline out by the debounce window,
//! so a burst of edits produces one write carrying the final state. Saves
//! run inside the worker one at a time; a save never overlaps another.
//!
//! Each save re-reads the owning document, splices the map block into the
//! fresh text, and writes it back. Edits made elsewhere in the document
//! between saves are preserved.
//!
//! ERROR HANDLING
//! ==============
//! Failed writes are retried with linear back-off. When attempts run out
//! the status becomes [`SaveStatus::Failed`] and the in-memory map is kept;
//! the next mutation schedules another save. Closing the bridge flushes
//! anything pending before the worker exits.

#[cfg(test)]
#[path = "bridge_test.rs"]
mod bridge_test;

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::doc::MapDocument;
use crate::error::{MapError, StoreError};
use crate::persist::{document_from_text, upsert_block};
use crate::store::DocumentStore;

/// Persistence state of the map as seen by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    /// Everything the user did is in the store.
    #[default]
    Clean,
    /// A save is scheduled but the debounce window is still open.
    Pending,
    /// A write is in flight.
    Saving,
    /// The last save exhausted its retries.
    Failed,
}

enum Command {
    Schedule(MapDocument),
    Flush(oneshot::Sender<SaveStatus>),
}

/// Handle to the save worker for one map.
#[derive(Debug)]
pub struct SaveBridge {
    entry_id: String,
    tx: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<SaveStatus>,
    handle: JoinHandle<()>,
}

impl SaveBridge {
    /// Spawn the save worker for `entry_id`. Must be called inside a Tokio runtime.
    #[must_use]
    pub fn spawn(store: Arc<dyn DocumentStore>, entry_id: impl Into<String>, config: BridgeConfig) -> Self {
        let entry_id = entry_id.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(SaveStatus::Clean);

        info!(
            entry_id = %entry_id,
            debounce_ms = config.debounce_ms,
            retries = config.retries,
            retry_base_ms = config.retry_base_ms,
            "map save bridge configured"
        );

        let worker = Worker { store, entry_id: entry_id.clone(), config, status: status_tx };
        let handle = tokio::spawn(worker.run(rx));
        Self { entry_id, tx, status, handle }
    }

    #[must_use]
    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }

    /// Replace the pending snapshot and restart the debounce window.
    pub fn schedule(&self, doc: MapDocument) {
        if self.tx.send(Command::Schedule(doc)).is_err() {
            warn!(entry_id = %self.entry_id, "map save worker is gone; dropping save");
        }
    }

    /// Save any pending snapshot now and wait for the outcome.
    pub async fn flush(&self) -> SaveStatus {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(ack_tx)).is_err() {
            warn!(entry_id = %self.entry_id, "map save worker is gone; cannot flush");
            return self.status();
        }
        match ack_rx.await {
            Ok(status) => status,
            Err(_) => self.status(),
        }
    }

    #[must_use]
    pub fn status(&self) -> SaveStatus {
        *self.status.borrow()
    }

    /// A receiver that observes every status change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }

    /// Stop accepting saves, flush anything pending and wait for the worker.
    pub async fn close(self) -> SaveStatus {
        let Self { entry_id, tx, status, handle } = self;
        drop(tx);
        if let Err(e) = handle.await {
            warn!(entry_id = %entry_id, error = %e, "map save worker ended abnormally");
        }
        *status.borrow()
    }
}

/// Load the map stored in `entry_id`. Never fails: a missing document or a
/// store error is logged and yields an empty map.
pub async fn load_map(store: &dyn DocumentStore, entry_id: &str) -> MapDocument {
    match store.read(entry_id).await {
        Ok(Some(text)) => document_from_text(&text),
        Ok(None) => {
            warn!(entry_id, "map document not found; starting with an empty map");
            MapDocument::new()
        }
        Err(e) => {
            warn!(entry_id, error = %e, "map document read failed; starting with an empty map");
            MapDocument::new()
        }
    }
}

// =============================================================================
// WORKER
// =============================================================================

struct Worker {
    store: Arc<dyn DocumentStore>,
    entry_id: String,
    config: BridgeConfig,
    status: watch::Sender<SaveStatus>,
}

impl Worker {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<Command>) {
        let mut pending: Option<MapDocument> = None;
        let mut deadline = Instant::now();

        loop {
            tokio::select! {
                maybe_cmd = rx.recv() => match maybe_cmd {
                    Some(Command::Schedule(doc)) => {
                        pending = Some(doc);
                        deadline = Instant::now() + self.config.debounce();
                        debug!(entry_id = %self.entry_id, "map save scheduled");
                        self.set_status(SaveStatus::Pending);
                    }
                    Some(Command::Flush(ack)) => {
                        if let Some(doc) = pending.take() {
                            self.save(&doc).await;
                        }
                        if ack.send(*self.status.borrow()).is_err() {
                            debug!(entry_id = %self.entry_id, "flush requester went away");
                        }
                    }
                    None => {
                        if let Some(doc) = pending.take() {
                            self.save(&doc).await;
                        }
                        break;
                    }
                },
                () = tokio::time::sleep_until(deadline), if pending.is_some() => {
                    if let Some(doc) = pending.take() {
                        self.save(&doc).await;
                    }
                }
            }
        }

        debug!(entry_id = %self.entry_id, "map save worker stopped");
    }

    fn set_status(&self, next: SaveStatus) {
        self.status.send_modify(|s| *s = next);
    }

    async fn save(&self, doc: &MapDocument) {
        self.set_status(SaveStatus::Saving);
        debug!(entry_id = %self.entry_id, tokens = doc.tokens.len(), "map save started");
        match self.save_with_retry(doc).await {
            Ok(()) => {
                debug!(entry_id = %self.entry_id, "map saved");
                self.set_status(SaveStatus::Clean);
            }
            Err(_) => self.set_status(SaveStatus::Failed),
        }
    }

    async fn save_with_retry(&self, doc: &MapDocument) -> Result<(), MapError> {
        let total = self.config.retries.max(1);
        let mut attempt = 1;
        loop {
            match self.save_once(doc).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < total => {
                    warn!(error = %e, attempt, total, entry_id = %self.entry_id, "map save failed; retrying");
                    tokio::time::sleep(self.config.retry_delay(attempt)).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(error = %e, entry_id = %self.entry_id, "map save failed after retries; keeping changes in memory");
                    return Err(e);
                }
            }
        }
    }

    async fn save_once(&self, doc: &MapDocument) -> Result<(), MapError> {
        let text = self
            .store
            .read(&self.entry_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(self.entry_id.clone()))?;
        let updated = upsert_block(&text, doc)?;
        self.store.write(&self.entry_id, &updated).await?;
        Ok(())
    }
}
