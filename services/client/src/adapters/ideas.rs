//! services/client/src/adapters/ideas.rs
//!
//! Implements the `IdeaService` port against `/api/ai`.

use async_trait::async_trait;
use idea_notes_core::domain::{Generation, GenerationPage, GenerationRequest, Note, SaveAsNote};
use idea_notes_core::ports::{IdeaService, PortResult};
use reqwest::Method;

use crate::adapters::http::ApiClient;
use crate::adapters::records::{
    GenerationPageRecord, GenerationRecord, GenerationRequestRecord, NoteRecord, SaveAsNoteRecord,
};

const GENERATE_FAILED: &str = "Failed to generate idea. Please try again.";
const HISTORY_FAILED: &str = "Failed to fetch generation history. Please try again.";
const SAVE_FAILED: &str = "Failed to save as note. Please try again.";

#[derive(Clone)]
pub struct HttpIdeaAdapter {
    api: ApiClient,
}

impl HttpIdeaAdapter {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl IdeaService for HttpIdeaAdapter {
    async fn generate_idea(&self, request: &GenerationRequest) -> PortResult<Generation> {
        let builder = self
            .api
            .request(Method::POST, "/api/ai/generate-idea")
            .json(&GenerationRequestRecord::from(request));
        let record = self
            .api
            .send_json::<GenerationRecord>(builder, GENERATE_FAILED)
            .await?;
        Ok(record.to_domain())
    }

    async fn list_generations(&self, page: u32, per_page: u32) -> PortResult<GenerationPage> {
        let builder = self
            .api
            .request(Method::GET, "/api/ai/generations")
            .query(&[("page", page), ("per_page", per_page)]);
        let record = self
            .api
            .send_json::<GenerationPageRecord>(builder, HISTORY_FAILED)
            .await?;
        Ok(record.to_domain())
    }

    async fn save_as_note(&self, request: &SaveAsNote) -> PortResult<Note> {
        let builder = self
            .api
            .request(Method::POST, "/api/ai/save-as-note")
            .json(&SaveAsNoteRecord::from(request));
        let record = self
            .api
            .send_json::<NoteRecord>(builder, SAVE_FAILED)
            .await?;
        Ok(record.to_domain())
    }
}
