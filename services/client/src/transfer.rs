//! services/client/src/transfer.rs
//!
//! JSON export of notes and favorites, and import of a previously exported file.

use chrono::NaiveDate;
use idea_notes_core::domain::{ImportSummary, Note, NoteDraft};
use idea_notes_core::ports::{FavoritesService, NotesService};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::adapters::records::NoteRecord;
use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Notes,
    Favorites,
}

impl ExportKind {
    /// e.g. `notes_2024-01-31.json`
    pub fn file_name(&self, date: NaiveDate) -> String {
        let prefix = match self {
            ExportKind::Notes => "notes",
            ExportKind::Favorites => "favorites",
        };
        format!("{}_{}.json", prefix, date.format("%Y-%m-%d"))
    }
}

/// Pretty-printed JSON array of notes, in backend record shape.
pub fn render_notes(notes: &[Note]) -> Result<String, ClientError> {
    let records: Vec<NoteRecord> = notes.iter().map(NoteRecord::from_domain).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// Fetches the notes of `kind` and writes them into `dir`. Returns the file path.
pub async fn export(
    kind: ExportKind,
    notes: &dyn NotesService,
    favorites: &dyn FavoritesService,
    dir: &Path,
    date: NaiveDate,
) -> Result<PathBuf, ClientError> {
    let items = match kind {
        ExportKind::Notes => notes.list_notes().await?,
        ExportKind::Favorites => favorites.list_favorites().await?,
    };
    let json = render_notes(&items)?;
    let path = dir.join(kind.file_name(date));
    tokio::fs::write(&path, json).await?;
    info!(path = %path.display(), count = items.len(), "Export written");
    Ok(path)
}

/// Parses an import file. The top level must be an array of objects; missing
/// titles become "Untitled" and missing content becomes empty.
pub fn parse_import(text: &str) -> Result<Vec<NoteDraft>, ClientError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(items) = value else {
        return Err(ClientError::InvalidImport("expected a JSON array of notes".to_string()));
    };
    if items.is_empty() {
        return Err(ClientError::InvalidImport("no notes to import".to_string()));
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let object = item.as_object().ok_or_else(|| {
                ClientError::InvalidImport(format!("entry {index} is not an object"))
            })?;
            let text_field = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);
            Ok(NoteDraft {
                title: text_field("title").unwrap_or_else(|| "Untitled".to_string()),
                content: text_field("content").unwrap_or_default(),
            })
        })
        .collect()
}

/// Reads `path` and imports its notes as new notes.
pub async fn import_file(notes: &dyn NotesService, path: &Path) -> Result<ImportSummary, ClientError> {
    let text = tokio::fs::read_to_string(path).await?;
    let drafts = parse_import(&text)?;
    let summary = notes.import_notes(&drafts).await?;
    info!(path = %path.display(), count = summary.count, "Notes imported");
    Ok(summary)
}
