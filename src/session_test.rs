use super::*;
use std::time::Duration;

use crate::camera::Point;
use crate::doc::{GridConfig, GridType, MapDocument, TokenDraft};
use crate::input::{Button, DropPayload, Modifiers, Tool};
use crate::persist::{document_from_text, upsert_block};
use crate::store::MemoryDocumentStore;

const ENTRY: &str = "keep.md";

fn config() -> BridgeConfig {
    BridgeConfig { debounce_ms: 1000, retries: 2, retry_base_ms: 50 }
}

async fn open_with(text: &str) -> (Arc<MemoryDocumentStore>, MapSession) {
    let store = Arc::new(MemoryDocumentStore::new());
    store.insert(ENTRY, text).await;
    let session = MapSession::open(store.clone(), ENTRY, config()).await;
    (store, session)
}

fn drop_pin(core: &mut EngineCore) -> Vec<Action> {
    let payload = DropPayload::EntryLink { entry_id: "tavern".into(), title: "Tavern".into() };
    core.on_drop(Point::new(10.0, 10.0), payload)
}

#[tokio::test(start_paused = true)]
async fn open_hydrates_stored_map() {
    let mut doc = MapDocument::new();
    doc.add_token(TokenDraft::pin("tavern", "Tavern", Point::new(0.0, 0.0)));
    doc.grid.grid_type = GridType::Hex;
    let (_store, session) = open_with(&upsert_block("# Keep", &doc).unwrap()).await;

    assert_eq!(session.core().doc, doc);
    assert_eq!(session.entry_id(), ENTRY);
    assert_eq!(session.save_status(), SaveStatus::Clean);
}

#[tokio::test(start_paused = true)]
async fn open_missing_document_starts_empty() {
    let store = Arc::new(MemoryDocumentStore::new());
    let session = MapSession::open(store, ENTRY, config()).await;
    assert!(session.core().doc.is_empty());
}

#[tokio::test(start_paused = true)]
async fn mutating_dispatch_schedules_a_save() {
    let (store, mut session) = open_with("# Keep\n").await;

    let actions = session.dispatch(drop_pin);
    assert!(actions.iter().any(Action::is_mutation));

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(store.write_count(), 1);
    let saved = document_from_text(&store.get(ENTRY).await.unwrap());
    assert_eq!(saved, session.core().doc);
}

#[tokio::test(start_paused = true)]
async fn view_only_dispatch_never_saves() {
    let (store, mut session) = open_with("# Keep\n").await;

    session.dispatch(|core| core.set_tool(Tool::Pan));
    session.dispatch(|core| core.on_pointer_down(Point::new(0.0, 0.0), Button::Primary, Modifiers::default()));
    session.dispatch(|core| core.on_pointer_move(Point::new(40.0, 30.0), Modifiers::default()));
    session.dispatch(|core| core.on_pointer_up(Point::new(40.0, 30.0), Button::Primary, Modifiers::default()));

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(store.write_count(), 0);
    assert_eq!(session.core().camera().pan_x, 40.0);
}

#[tokio::test(start_paused = true)]
async fn burst_of_edits_saves_final_state_once() {
    let (store, mut session) = open_with("").await;

    session.dispatch(drop_pin);
    session.dispatch(drop_pin);
    let grid = GridConfig { scale: 2.0, ..GridConfig::default() };
    session.dispatch(|core| core.set_grid(grid));

    assert_eq!(session.flush().await, SaveStatus::Clean);
    assert_eq!(store.write_count(), 1);
    let saved = document_from_text(&store.get(ENTRY).await.unwrap());
    assert_eq!(saved.tokens.len(), 2);
    assert_eq!(saved.grid.scale, 2.0);
}

#[tokio::test(start_paused = true)]
async fn close_persists_pending_edits() {
    let (store, mut session) = open_with("").await;
    session.dispatch(drop_pin);
    assert_eq!(session.close().await, SaveStatus::Clean);
    assert_eq!(store.write_count(), 1);
}
