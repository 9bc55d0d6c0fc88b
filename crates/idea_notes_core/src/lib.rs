pub mod domain;
pub mod failure;
pub mod favorites;
pub mod ports;
pub mod stores;
pub mod validation;

pub use domain::{
    AccessToken, AiProvider, Credentials, Favorite, Generation, GenerationPage,
    GenerationRequest, ImportSummary, Note, NoteChanges, NoteDraft, NoteId, SaveAsNote,
    StoredCredential, User, HISTORY_PER_PAGE,
};
pub use failure::{classify, FailureKind};
pub use favorites::FavoriteMirror;
pub use ports::{
    AuthService, CredentialStore, FavoritesService, IdeaService, NotesService, PortError,
    PortResult,
};
pub use stores::{GenerationState, GenerationStore, SessionState, SessionStore, StoreError, StoreResult};
