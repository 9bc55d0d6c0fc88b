//! crates/idea_notes_core/src/domain.rs
//!
//! Defines the pure, core data structures for the notes client.
//! These structs are independent of any transport or serialization format;
//! the adapters map wire records onto them.

use chrono::{DateTime, Utc};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Number of generations requested per history page.
pub const HISTORY_PER_PAGE: u32 = 20;

/// Identifier the backend assigns to notes, favorites and generations.
pub type NoteId = i64;

//=========================================================================================
// Accounts
//=========================================================================================

/// The username/password pair submitted to login and register.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// The bearer token handed out by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

/// What the client keeps on disk between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    pub access_token: String,
    pub username: Option<String>,
}

// Represents a registered user as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: NoteId,
    pub username: String,
    pub is_active: bool,
    pub created_date: DateTime<Utc>,
}

//=========================================================================================
// Notes & Favorites
//=========================================================================================

/// A note owned by the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub user_id: NoteId,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

/// Fields for a brand new note (also used for imported notes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

/// A partial update; `None` leaves the field unchanged on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl NoteChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

/// The record created when a note is favorited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Favorite {
    pub id: NoteId,
    pub note_id: NoteId,
    pub user_id: NoteId,
    pub created_date: DateTime<Utc>,
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub message: String,
    pub count: u64,
}

//=========================================================================================
// AI Generation
//=========================================================================================

/// The AI backends the server can route a generation to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AiProvider {
    #[default]
    OpenAi,
    Anthropic,
    Gemini,
}

impl AiProvider {
    pub const ALL: [AiProvider; 3] = [AiProvider::OpenAi, AiProvider::Anthropic, AiProvider::Gemini];

    /// The name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            AiProvider::OpenAi => "openai",
            AiProvider::Anthropic => "anthropic",
            AiProvider::Gemini => "gemini",
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown AI provider: '{0}' (expected 'openai', 'anthropic', or 'gemini')")]
pub struct UnknownProvider(pub String);

impl FromStr for AiProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(AiProvider::OpenAi),
            "anthropic" | "claude" => Ok(AiProvider::Anthropic),
            "gemini" => Ok(AiProvider::Gemini),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// A request to synthesize an idea from a set of notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub note_ids: Vec<NoteId>,
    /// Omitted from the request when the user gave no prompt.
    pub prompt: Option<String>,
    pub ai_provider: AiProvider,
}

/// An AI-produced content record returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub id: NoteId,
    pub generated_content: String,
    /// Kept as reported; the server may name providers this client doesn't know.
    pub ai_provider: String,
    pub note_ids: Vec<NoteId>,
    pub prompt: String,
    pub created_date: DateTime<Utc>,
}

/// Request to persist a generation as a regular note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveAsNote {
    pub generation_id: NoteId,
    pub title: String,
}

/// One page of the generation history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPage {
    pub items: Vec<Generation>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

/// Number of pages needed to show `total` items, `per_page` at a time.
pub fn total_pages(total: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(u64::from(per_page)).min(u64::from(u32::MAX)) as u32
}

/// The page numbers shown in a pager of `width` buttons, centred on `current`
/// where possible and clamped to `1..=total_pages`.
pub fn page_window(current: u32, total_pages: u32, width: u32) -> RangeInclusive<u32> {
    if total_pages == 0 || width == 0 {
        return 1..=0;
    }
    if total_pages <= width {
        return 1..=total_pages;
    }
    let half = width / 2;
    let current = current.clamp(1, total_pages);
    let start = if current <= half + 1 {
        1
    } else if current + half >= total_pages {
        total_pages - width + 1
    } else {
        current - half
    };
    start..=start + width - 1
}
