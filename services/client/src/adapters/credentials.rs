//! services/client/src/adapters/credentials.rs
//!
//! A `CredentialStore` backed by a small JSON file in the user's config directory.

use idea_notes_core::domain::StoredCredential;
use idea_notes_core::ports::{CredentialStore, PortError, PortResult};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Serialize, Deserialize)]
struct CredentialFile {
    access_token: String,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Option<StoredCredential> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), "Failed to read credential file: {}", e);
                return None;
            }
        };
        match serde_json::from_str::<CredentialFile>(&text) {
            Ok(file) if !file.access_token.is_empty() => Some(StoredCredential {
                access_token: file.access_token,
                username: file.username,
            }),
            Ok(_) => None,
            Err(e) => {
                warn!(path = %self.path.display(), "Ignoring corrupt credential file: {}", e);
                None
            }
        }
    }

    fn save(&self, credential: &StoredCredential) -> PortResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| PortError::Unexpected(format!("Cannot create {}: {e}", parent.display())))?;
        }
        let file = CredentialFile {
            access_token: credential.access_token.clone(),
            username: credential.username.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        std::fs::write(&self.path, json)
            .map_err(|e| PortError::Unexpected(format!("Cannot write {}: {e}", self.path.display())))?;

        // The file holds a bearer token: user read/write only on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600)).map_err(
                |e| PortError::Unexpected(format!("Cannot restrict {}: {e}", self.path.display())),
            )?;
        }
        debug!(path = %self.path.display(), "Credential saved");
        Ok(())
    }

    fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Credential removed"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), "Failed to remove credential file: {}", e),
        }
    }
}
