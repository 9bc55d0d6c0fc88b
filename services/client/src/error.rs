//! services/client/src/error.rs
//!
//! Defines the primary error type for the client service.

use crate::config::ConfigError;
use idea_notes_core::ports::PortError;
use idea_notes_core::stores::StoreError;

/// The primary error type for the `client` service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("{0}")]
    Port(#[from] PortError),

    /// A store action failed; its state already records the message.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Building the underlying HTTP client failed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Reading or writing an export/import file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The import file parsed, but isn't a list of notes.
    #[error("Invalid file format: {0}")]
    InvalidImport(String),

    #[error("Not logged in. Run `notes login` first.")]
    NotAuthenticated,

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ClientError {
    /// The wording validation or the backend gave for this failure, when there is one.
    pub fn explained_message(&self) -> Option<&str> {
        match self {
            ClientError::Store(e) => Some(e.message()),
            ClientError::Port(e) => Some(e.message()),
            _ => None,
        }
    }
}
