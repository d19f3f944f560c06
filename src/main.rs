use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::Parser;
use mapkeep::doc::{GridConfig, MapDocument, StrokeTool, TokenKind, ZLayer};
use mapkeep::error::{PersistError, StoreError};
use mapkeep::persist::{document_from_text, extract_block};
use mapkeep::store::{DocumentStore, FsDocumentStore};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("invalid document path: {0}")]
    InvalidPath(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("summary encode failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "mapkeep", about = "Inspect the map block embedded in a document")]
struct Cli {
    /// Markdown document containing a `json:map-data` block.
    document: PathBuf,

    /// Print single-line JSON.
    #[arg(long)]
    compact: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    document: String,
    has_map_block: bool,
    strokes: StrokeCounts,
    fog_strokes: StrokeCounts,
    tokens: TokenCounts,
    grid: GridConfig,
}

#[derive(Debug, Default, Serialize)]
struct StrokeCounts {
    total: usize,
    #[serde(rename = "byTool")]
    by_tool: BTreeMap<&'static str, usize>,
}

#[derive(Debug, Default, Serialize)]
struct TokenCounts {
    total: usize,
    images: usize,
    pins: usize,
    #[serde(rename = "byLayer")]
    by_layer: BTreeMap<&'static str, usize>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (root, id) = split_document_path(&cli.document)?;
    let store = FsDocumentStore::new(root);
    let text = store.read(&id).await?.ok_or_else(|| CliError::NotFound(cli.document.display().to_string()))?;

    let has_map_block = extract_block(&text)?.is_some();
    let doc = document_from_text(&text);
    tracing::info!(document = %cli.document.display(), has_map_block, "map loaded");

    let summary = summarize(cli.document.display().to_string(), has_map_block, &doc);
    let out = if cli.compact { serde_json::to_string(&summary)? } else { serde_json::to_string_pretty(&summary)? };
    println!("{out}");
    Ok(())
}

fn split_document_path(path: &Path) -> Result<(PathBuf, String), CliError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CliError::InvalidPath(path.display().to_string()))?;
    let root = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((root, name.to_owned()))
}

fn summarize(document: String, has_map_block: bool, doc: &MapDocument) -> Summary {
    let mut tokens = TokenCounts { total: doc.tokens.len(), ..TokenCounts::default() };
    for token in &doc.tokens {
        match token.kind {
            TokenKind::Image => tokens.images += 1,
            TokenKind::Pin => tokens.pins += 1,
        }
        let layer = ZLayer::of(token.z_order).map_or("unassigned", ZLayer::name);
        *tokens.by_layer.entry(layer).or_default() += 1;
    }

    Summary {
        document,
        has_map_block,
        strokes: count_strokes(doc.strokes.iter().map(|s| s.tool)),
        fog_strokes: count_strokes(doc.fog_strokes.iter().map(|s| s.tool)),
        tokens,
        grid: doc.grid,
    }
}

fn count_strokes(tools: impl Iterator<Item = StrokeTool>) -> StrokeCounts {
    let mut counts = StrokeCounts::default();
    for tool in tools {
        counts.total += 1;
        *counts.by_tool.entry(tool.name()).or_default() += 1;
    }
    counts
}
