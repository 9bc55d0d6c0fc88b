//! services/client/src/adapters/notes.rs
//!
//! Implements the `NotesService` and `FavoritesService` ports. These are plain
//! one-shot calls; failures always carry a generic message for the operation,
//! whatever the backend said.

use async_trait::async_trait;
use idea_notes_core::domain::{Favorite, ImportSummary, Note, NoteChanges, NoteDraft, NoteId};
use idea_notes_core::ports::{FavoritesService, NotesService, PortResult};
use reqwest::Method;

use crate::adapters::http::ApiClient;
use crate::adapters::records::{
    FavoriteCheckRecord, FavoriteCreateRecord, FavoriteRecord, ImportRecord, NoteChangesRecord,
    NoteDraftRecord, NoteRecord,
};

const LOAD_NOTES_FAILED: &str = "Failed to load notes";
const LOAD_NOTE_FAILED: &str = "Failed to load note";
const SAVE_NOTE_FAILED: &str = "Failed to save note";
const DELETE_NOTE_FAILED: &str = "Failed to delete note";
const IMPORT_FAILED: &str = "Failed to import notes";
const LOAD_FAVORITES_FAILED: &str = "Failed to load favorites";
const UPDATE_FAVORITE_FAILED: &str = "Failed to update favorites";

#[derive(Clone)]
pub struct HttpNotesAdapter {
    api: ApiClient,
}

impl HttpNotesAdapter {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        message: &str,
    ) -> PortResult<T> {
        self.api
            .send_json(builder, message)
            .await
            .map_err(|e| e.with_message(message))
    }

    async fn execute(&self, builder: reqwest::RequestBuilder, message: &str) -> PortResult<()> {
        self.api
            .send_empty(builder, message)
            .await
            .map_err(|e| e.with_message(message))
    }
}

//=========================================================================================
// `NotesService` Trait Implementation
//=========================================================================================

#[async_trait]
impl NotesService for HttpNotesAdapter {
    async fn list_notes(&self) -> PortResult<Vec<Note>> {
        let builder = self.api.request(Method::GET, "/api/notes");
        let records: Vec<NoteRecord> = self.fetch(builder, LOAD_NOTES_FAILED).await?;
        Ok(records.into_iter().map(NoteRecord::to_domain).collect())
    }

    async fn get_note(&self, id: NoteId) -> PortResult<Note> {
        let builder = self.api.request(Method::GET, &format!("/api/notes/{id}"));
        let record: NoteRecord = self.fetch(builder, LOAD_NOTE_FAILED).await?;
        Ok(record.to_domain())
    }

    async fn create_note(&self, draft: &NoteDraft) -> PortResult<Note> {
        let builder = self
            .api
            .request(Method::POST, "/api/notes")
            .json(&NoteDraftRecord::from(draft));
        let record: NoteRecord = self.fetch(builder, SAVE_NOTE_FAILED).await?;
        Ok(record.to_domain())
    }

    async fn update_note(&self, id: NoteId, changes: &NoteChanges) -> PortResult<Note> {
        let builder = self
            .api
            .request(Method::PUT, &format!("/api/notes/{id}"))
            .json(&NoteChangesRecord::from(changes));
        let record: NoteRecord = self.fetch(builder, SAVE_NOTE_FAILED).await?;
        Ok(record.to_domain())
    }

    async fn delete_note(&self, id: NoteId) -> PortResult<()> {
        let builder = self.api.request(Method::DELETE, &format!("/api/notes/{id}"));
        self.execute(builder, DELETE_NOTE_FAILED).await
    }

    async fn import_notes(&self, drafts: &[NoteDraft]) -> PortResult<ImportSummary> {
        let body: Vec<NoteDraftRecord<'_>> = drafts.iter().map(NoteDraftRecord::from).collect();
        let builder = self
            .api
            .request(Method::POST, "/api/notes/import")
            .json(&body);
        let record: ImportRecord = self.fetch(builder, IMPORT_FAILED).await?;
        Ok(record.to_domain())
    }
}

//=========================================================================================
// `FavoritesService` Trait Implementation
//=========================================================================================

#[async_trait]
impl FavoritesService for HttpNotesAdapter {
    async fn list_favorites(&self) -> PortResult<Vec<Note>> {
        let builder = self.api.request(Method::GET, "/api/favorites");
        let records: Vec<NoteRecord> = self.fetch(builder, LOAD_FAVORITES_FAILED).await?;
        Ok(records.into_iter().map(NoteRecord::to_domain).collect())
    }

    async fn add_favorite(&self, note_id: NoteId) -> PortResult<Favorite> {
        let builder = self
            .api
            .request(Method::POST, "/api/favorites")
            .json(&FavoriteCreateRecord { note_id });
        let record: FavoriteRecord = self.fetch(builder, UPDATE_FAVORITE_FAILED).await?;
        Ok(record.to_domain())
    }

    async fn remove_favorite(&self, note_id: NoteId) -> PortResult<()> {
        let builder = self
            .api
            .request(Method::DELETE, &format!("/api/favorites/{note_id}"));
        self.execute(builder, UPDATE_FAVORITE_FAILED).await
    }

    async fn is_favorite(&self, note_id: NoteId) -> PortResult<bool> {
        let builder = self
            .api
            .request(Method::GET, &format!("/api/favorites/{note_id}/check"));
        let record: FavoriteCheckRecord = self.fetch(builder, LOAD_FAVORITES_FAILED).await?;
        Ok(record.is_favorite)
    }
}
