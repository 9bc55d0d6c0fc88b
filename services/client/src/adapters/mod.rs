pub mod auth;
pub mod credentials;
pub mod http;
pub mod ideas;
pub mod notes;
pub mod records;

pub use auth::HttpAuthAdapter;
pub use credentials::FileCredentialStore;
pub use http::ApiClient;
pub use ideas::HttpIdeaAdapter;
pub use notes::HttpNotesAdapter;
