//! Map session: one engine wired to its save bridge.
//!
//! Every engine call goes through [`MapSession::dispatch`], which hands the
//! returned actions back to the host and schedules a save whenever one of
//! them changed persisted state.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use tokio::sync::watch;

use crate::bridge::{SaveBridge, SaveStatus, load_map};
use crate::config::BridgeConfig;
use crate::engine::{Action, EngineCore};
use crate::store::DocumentStore;

#[derive(Debug)]
pub struct MapSession {
    core: EngineCore,
    bridge: SaveBridge,
}

impl MapSession {
    /// Load the map stored in `entry_id` and start its save worker.
    pub async fn open(store: Arc<dyn DocumentStore>, entry_id: impl Into<String>, config: BridgeConfig) -> Self {
        let entry_id = entry_id.into();
        let doc = load_map(store.as_ref(), &entry_id).await;
        let mut core = EngineCore::new();
        core.load_document(doc);
        tracing::info!(
            entry_id = %entry_id,
            strokes = core.doc.strokes.len(),
            fog_strokes = core.doc.fog_strokes.len(),
            tokens = core.doc.tokens.len(),
            "map session opened"
        );
        let bridge = SaveBridge::spawn(store, entry_id, config);
        Self { core, bridge }
    }

    /// Run `f` against the engine and schedule a save if it mutated the map.
    pub fn dispatch<F>(&mut self, f: F) -> Vec<Action>
    where
        F: FnOnce(&mut EngineCore) -> Vec<Action>,
    {
        let actions = f(&mut self.core);
        if actions.iter().any(Action::is_mutation) {
            self.bridge.schedule(self.core.doc.clone());
        }
        actions
    }

    #[must_use]
    pub fn core(&self) -> &EngineCore {
        &self.core
    }

    #[must_use]
    pub fn entry_id(&self) -> &str {
        self.bridge.entry_id()
    }

    #[must_use]
    pub fn save_status(&self) -> SaveStatus {
        self.bridge.status()
    }

    #[must_use]
    pub fn subscribe_status(&self) -> watch::Receiver<SaveStatus> {
        self.bridge.subscribe()
    }

    /// Save pending changes now.
    pub async fn flush(&self) -> SaveStatus {
        self.bridge.flush().await
    }

    /// Flush pending changes and stop the save worker.
    pub async fn close(self) -> SaveStatus {
        self.bridge.close().await
    }
}
