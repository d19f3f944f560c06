//! Error types for map storage and serialization.
//!
//! The interactive engine never fails; these errors only surface from the
//! load/save path, where callers log them and carry on.

/// Failure reading or writing a document through a [`crate::store::DocumentStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The owning document does not exist (e.g. it was deleted or renamed).
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("document I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// Injected by in-memory stores to simulate a failing backend.
    #[error("document write rejected: {0}")]
    Rejected(String),
}

/// Failure converting between a [`crate::doc::MapDocument`] and its JSON block.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("map data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("map block pattern is invalid: {0}")]
    Pattern(#[from] regex::Error),
}

/// Umbrella error for the load/save path.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}
