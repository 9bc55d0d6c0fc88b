//! crates/idea_notes_core/src/ports.rs
//!
//! Defines the service contracts (traits) the stores depend on.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the HTTP client and of where credentials are persisted.

use async_trait::async_trait;

use crate::domain::{
    AccessToken, Credentials, Favorite, Generation, GenerationPage, GenerationRequest,
    ImportSummary, Note, NoteChanges, NoteDraft, NoteId, SaveAsNote, StoredCredential, User,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
///
/// Every variant carries the human-readable message that ends up in store state:
/// either the backend's `detail` or the per-call fallback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// The backend rejected the credential (HTTP 401).
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    /// Any other non-success response.
    #[error("{detail}")]
    Rejected { status: u16, detail: String },
    /// No response at all: connection refused, DNS, timeout.
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Unexpected(String),
}

impl PortError {
    pub fn message(&self) -> &str {
        match self {
            PortError::Unauthorized(m)
            | PortError::NotFound(m)
            | PortError::Unavailable(m)
            | PortError::Unexpected(m) => m,
            PortError::Rejected { detail, .. } => detail,
        }
    }

    /// Keeps the kind of failure but swaps the message.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        let message = message.into();
        match self {
            PortError::Unauthorized(_) => PortError::Unauthorized(message),
            PortError::NotFound(_) => PortError::NotFound(message),
            PortError::Rejected { status, .. } => PortError::Rejected {
                status,
                detail: message,
            },
            PortError::Unavailable(_) => PortError::Unavailable(message),
            PortError::Unexpected(_) => PortError::Unexpected(message),
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Where the bearer token survives between runs.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Option<StoredCredential>;

    fn save(&self, credential: &StoredCredential) -> PortResult<()>;

    /// Removing a credential that isn't there is not an error.
    fn clear(&self);

    fn has_token(&self) -> bool {
        self.load().is_some()
    }
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchanges credentials for a token and persists it on success.
    async fn login(&self, credentials: &Credentials) -> PortResult<AccessToken>;

    async fn register(&self, credentials: &Credentials) -> PortResult<User>;

    async fn current_user(&self) -> PortResult<User>;

    /// Drops the persisted credential. Never fails.
    fn logout(&self);
}

#[async_trait]
pub trait IdeaService: Send + Sync {
    async fn generate_idea(&self, request: &GenerationRequest) -> PortResult<Generation>;

    async fn list_generations(&self, page: u32, per_page: u32) -> PortResult<GenerationPage>;

    /// Returns the newly created note.
    async fn save_as_note(&self, request: &SaveAsNote) -> PortResult<Note>;
}

#[async_trait]
pub trait NotesService: Send + Sync {
    async fn list_notes(&self) -> PortResult<Vec<Note>>;

    async fn get_note(&self, id: NoteId) -> PortResult<Note>;

    async fn create_note(&self, draft: &NoteDraft) -> PortResult<Note>;

    async fn update_note(&self, id: NoteId, changes: &NoteChanges) -> PortResult<Note>;

    async fn delete_note(&self, id: NoteId) -> PortResult<()>;

    async fn import_notes(&self, drafts: &[NoteDraft]) -> PortResult<ImportSummary>;
}

#[async_trait]
pub trait FavoritesService: Send + Sync {
    /// The favorited notes themselves, not the favorite records.
    async fn list_favorites(&self) -> PortResult<Vec<Note>>;

    async fn add_favorite(&self, note_id: NoteId) -> PortResult<Favorite>;

    async fn remove_favorite(&self, note_id: NoteId) -> PortResult<()>;

    async fn is_favorite(&self, note_id: NoteId) -> PortResult<bool>;
}
