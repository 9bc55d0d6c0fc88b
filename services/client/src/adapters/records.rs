//! services/client/src/adapters/records.rs
//!
//! Wire records exchanged with the notes backend and their mapping onto the
//! pure domain types in the core crate.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use idea_notes_core::domain::{
    AccessToken, Favorite, Generation, GenerationPage, GenerationRequest, ImportSummary, Note,
    NoteChanges, NoteDraft, NoteId, SaveAsNote, User,
};
use serde::{Deserialize, Deserializer, Serialize};

//=========================================================================================
// Timestamps
//=========================================================================================

/// The backend emits naive ISO timestamps (no offset), which are UTC. Offsets
/// and bare dates are accepted too.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
}

//=========================================================================================
// Error payload
//=========================================================================================

/// The error body the backend returns with non-success responses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    /// A string for application errors, a list of objects for validation errors.
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn detail_text(&self) -> Option<&str> {
        self.detail
            .as_ref()
            .and_then(|d| d.as_str())
            .filter(|d| !d.trim().is_empty())
    }
}

//=========================================================================================
// Auth
//=========================================================================================

#[derive(Debug, Serialize)]
pub struct CredentialsRecord<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenRecord {
    access_token: String,
    #[serde(default = "bearer")]
    token_type: String,
}

fn bearer() -> String {
    "bearer".to_string()
}

impl TokenRecord {
    pub fn to_domain(self) -> AccessToken {
        AccessToken {
            access_token: self.access_token,
            token_type: self.token_type,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserRecord {
    id: NoteId,
    username: String,
    #[serde(default = "active")]
    is_active: bool,
    #[serde(deserialize_with = "timestamp")]
    created_date: DateTime<Utc>,
}

fn active() -> bool {
    true
}

impl UserRecord {
    pub fn to_domain(self) -> User {
        User {
            id: self.id,
            username: self.username,
            is_active: self.is_active,
            created_date: self.created_date,
        }
    }
}

//=========================================================================================
// Notes & Favorites
//=========================================================================================

/// A note as the backend sends it. Also the shape written by exports.
#[derive(Debug, Deserialize, Serialize)]
pub struct NoteRecord {
    id: NoteId,
    title: String,
    content: String,
    user_id: NoteId,
    #[serde(deserialize_with = "timestamp")]
    created_date: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp")]
    updated_date: DateTime<Utc>,
}

impl NoteRecord {
    pub fn to_domain(self) -> Note {
        Note {
            id: self.id,
            title: self.title,
            content: self.content,
            user_id: self.user_id,
            created_date: self.created_date,
            updated_date: self.updated_date,
        }
    }

    pub fn from_domain(note: &Note) -> Self {
        Self {
            id: note.id,
            title: note.title.clone(),
            content: note.content.clone(),
            user_id: note.user_id,
            created_date: note.created_date,
            updated_date: note.updated_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NoteDraftRecord<'a> {
    pub title: &'a str,
    pub content: &'a str,
}

impl<'a> From<&'a NoteDraft> for NoteDraftRecord<'a> {
    fn from(draft: &'a NoteDraft) -> Self {
        Self {
            title: &draft.title,
            content: &draft.content,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NoteChangesRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<&'a str>,
}

impl<'a> From<&'a NoteChanges> for NoteChangesRecord<'a> {
    fn from(changes: &'a NoteChanges) -> Self {
        Self {
            title: changes.title.as_deref(),
            content: changes.content.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ImportRecord {
    message: String,
    count: u64,
}

impl ImportRecord {
    pub fn to_domain(self) -> ImportSummary {
        ImportSummary {
            message: self.message,
            count: self.count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FavoriteCreateRecord {
    pub note_id: NoteId,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteRecord {
    id: NoteId,
    note_id: NoteId,
    user_id: NoteId,
    #[serde(deserialize_with = "timestamp")]
    created_date: DateTime<Utc>,
}

impl FavoriteRecord {
    pub fn to_domain(self) -> Favorite {
        Favorite {
            id: self.id,
            note_id: self.note_id,
            user_id: self.user_id,
            created_date: self.created_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FavoriteCheckRecord {
    pub is_favorite: bool,
}

//=========================================================================================
// AI Generation
//=========================================================================================

#[derive(Debug, Serialize)]
pub struct GenerationRequestRecord<'a> {
    pub note_ids: &'a [NoteId],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<&'a str>,
    pub ai_provider: &'static str,
}

impl<'a> From<&'a GenerationRequest> for GenerationRequestRecord<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        Self {
            note_ids: &request.note_ids,
            prompt: request.prompt.as_deref(),
            ai_provider: request.ai_provider.as_str(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerationRecord {
    id: NoteId,
    generated_content: String,
    ai_provider: String,
    note_ids: Vec<NoteId>,
    #[serde(default)]
    prompt: Option<String>,
    #[serde(deserialize_with = "timestamp")]
    created_date: DateTime<Utc>,
}

impl GenerationRecord {
    pub fn to_domain(self) -> Generation {
        Generation {
            id: self.id,
            generated_content: self.generated_content,
            ai_provider: self.ai_provider,
            note_ids: self.note_ids,
            prompt: self.prompt.unwrap_or_default(),
            created_date: self.created_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerationPageRecord {
    items: Vec<GenerationRecord>,
    total: u64,
    page: u32,
    per_page: u32,
}

impl GenerationPageRecord {
    pub fn to_domain(self) -> GenerationPage {
        GenerationPage {
            items: self.items.into_iter().map(GenerationRecord::to_domain).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SaveAsNoteRecord<'a> {
    pub generation_id: NoteId,
    pub title: &'a str,
}

impl<'a> From<&'a SaveAsNote> for SaveAsNoteRecord<'a> {
    fn from(request: &'a SaveAsNote) -> Self {
        Self {
            generation_id: request.generation_id,
            title: &request.title,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use idea_notes_core::domain::AiProvider;

    #[test]
    fn test_parse_timestamp_variants() {
        let naive = parse_timestamp("2024-03-05T10:20:30.123456").unwrap();
        assert_eq!((naive.year(), naive.month(), naive.day()), (2024, 3, 5));
        assert_eq!(naive.hour(), 10);

        let offset = parse_timestamp("2024-03-05T10:20:30+09:00").unwrap();
        assert_eq!(offset.hour(), 1);

        let date = parse_timestamp("2024-01-01").unwrap();
        assert_eq!((date.year(), date.hour()), (2024, 0));

        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_generation_request_omits_missing_prompt() {
        let request = GenerationRequest {
            note_ids: vec![1, 2],
            prompt: None,
            ai_provider: AiProvider::OpenAi,
        };
        let json = serde_json::to_value(GenerationRequestRecord::from(&request)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "note_ids": [1, 2], "ai_provider": "openai" })
        );
    }

    #[test]
    fn test_generation_record_maps_to_domain() {
        let record: GenerationRecord = serde_json::from_value(serde_json::json!({
            "id": 7,
            "generated_content": "X",
            "ai_provider": "openai",
            "note_ids": [1, 2],
            "prompt": "",
            "created_date": "2024-01-01"
        }))
        .unwrap();
        let generation = record.to_domain();
        assert_eq!(generation.id, 7);
        assert_eq!(generation.note_ids, vec![1, 2]);
    }

    #[test]
    fn test_error_body_detail_must_be_text() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"detail":[{"loc":["body","title"],"msg":"too short"}]}"#)
                .unwrap();
        assert!(body.detail_text().is_none());

        let body: ErrorBody =
            serde_json::from_str(r#"{"detail":"Rate limit exceeded","retry_after":60}"#).unwrap();
        assert_eq!(body.detail_text(), Some("Rate limit exceeded"));
    }
}
