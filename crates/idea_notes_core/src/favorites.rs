//! A local mirror of which notes are favorited.
//!
//! The mirror is only updated after the backend confirms a change. It is not
//! reconciled with edits made elsewhere, so it can drift until the next `load`.

use std::collections::BTreeSet;
use tracing::debug;

use crate::domain::NoteId;
use crate::ports::{FavoritesService, NotesService, PortResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteMirror {
    ids: BTreeSet<NoteId>,
}

impl FavoriteMirror {
    /// Replaces the mirror with the server's current favorites.
    pub async fn load(&mut self, service: &dyn FavoritesService) -> PortResult<()> {
        let notes = service.list_favorites().await?;
        self.ids = notes.into_iter().map(|n| n.id).collect();
        debug!(count = self.ids.len(), "Favorites loaded");
        Ok(())
    }

    /// Flips the favorite flag on the server, then locally. Returns the new flag.
    pub async fn toggle(&mut self, service: &dyn FavoritesService, note_id: NoteId) -> PortResult<bool> {
        if self.ids.contains(&note_id) {
            service.remove_favorite(note_id).await?;
            self.ids.remove(&note_id);
            Ok(false)
        } else {
            service.add_favorite(note_id).await?;
            self.ids.insert(note_id);
            Ok(true)
        }
    }

    /// Deletes the note on the server and prunes it from the mirror. Returns
    /// whether the note was a favorite.
    pub async fn delete_note(&mut self, notes: &dyn NotesService, note_id: NoteId) -> PortResult<bool> {
        notes.delete_note(note_id).await?;
        Ok(self.forget(note_id))
    }

    /// Drops a deleted note from the mirror. Returns whether it was present.
    pub fn forget(&mut self, note_id: NoteId) -> bool {
        self.ids.remove(&note_id)
    }

    pub fn contains(&self, note_id: NoteId) -> bool {
        self.ids.contains(&note_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
