//! Embedded map block: locating, parsing and rewriting the fenced JSON
//! block that stores a map inside its owning document.
//!
//! A document carries at most one authoritative block:
//!
//! ````text
//! ```json:map-data
//! { "strokes": [...], "fogStrokes": [...], "tokens": [...], "grid": {...} }
//! ```
//! ````
//!
//! If several blocks exist, the first one wins for both reading and
//! replacing. Everything outside the block is left byte-for-byte intact.

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::consts::MAP_BLOCK_TAG;
use crate::doc::MapDocument;
use crate::error::PersistError;

static MAP_BLOCK_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(&format!(r"```{}\s*([\s\S]*?)\s*```", regex::escape(MAP_BLOCK_TAG))));

fn map_block_re() -> Result<&'static Regex, PersistError> {
    MAP_BLOCK_RE.as_ref().map_err(|e| PersistError::Pattern(e.clone()))
}

/// Serialize a map as pretty-printed JSON.
///
/// Backticks are written as `\u0060` so no string value can close the
/// surrounding fence. They only ever occur inside JSON strings, where the
/// escape decodes back to the same character.
///
/// # Errors
///
/// Returns [`PersistError::Json`] if serialization fails.
pub fn encode(doc: &MapDocument) -> Result<String, PersistError> {
    Ok(serde_json::to_string_pretty(doc)?.replace('`', "\\u0060"))
}

/// Parse map JSON. Missing top-level keys take their defaults, so legacy
/// `{ "lines": [...] }` blocks load as ink strokes.
///
/// # Errors
///
/// Returns [`PersistError::Json`] if `json` is not a valid map object.
pub fn decode(json: &str) -> Result<MapDocument, PersistError> {
    Ok(serde_json::from_str(json)?)
}

/// The full fenced block for `doc`.
///
/// # Errors
///
/// Returns [`PersistError::Json`] if serialization fails.
pub fn render_block(doc: &MapDocument) -> Result<String, PersistError> {
    Ok(format!("```{MAP_BLOCK_TAG}\n{}\n```", encode(doc)?))
}

/// Body of the first map block in `text`, trimmed of surrounding whitespace.
///
/// # Errors
///
/// Returns [`PersistError::Pattern`] if the block pattern failed to compile.
pub fn extract_block(text: &str) -> Result<Option<&str>, PersistError> {
    let re = map_block_re()?;
    Ok(re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str()))
}

/// Replace the first map block in `text` with one for `doc`, or append a
/// new block separated by a blank line if there is none.
///
/// # Errors
///
/// Returns an error if the block pattern failed to compile or `doc` cannot
/// be serialized.
pub fn upsert_block(text: &str, doc: &MapDocument) -> Result<String, PersistError> {
    let block = render_block(doc)?;
    let re = map_block_re()?;
    match re.find(text) {
        Some(m) => Ok(format!("{}{block}{}", &text[..m.start()], &text[m.end()..])),
        None => Ok(format!("{text}\n\n{block}")),
    }
}

/// Hydrate a map from a document's full text.
///
/// Never fails: a missing block yields an empty map, and a malformed block
/// is logged and also yields an empty map.
#[must_use]
pub fn document_from_text(text: &str) -> MapDocument {
    match extract_block(text) {
        Ok(Some(body)) => match decode(body) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, "map block is malformed; starting with an empty map");
                MapDocument::new()
            }
        },
        Ok(None) => {
            debug!("no map block found; starting with an empty map");
            MapDocument::new()
        }
        Err(e) => {
            warn!(error = %e, "map block lookup failed; starting with an empty map");
            MapDocument::new()
        }
    }
}
