//! crates/idea_notes_core/src/stores/mod.rs
//!
//! The two client-side state controllers. Each owns its state behind a lock and
//! exposes pure-data snapshots plus action methods. Actions report failures twice:
//! the store's `error` field is updated, and the same error is returned to the caller.

pub mod generation;
pub mod session;

pub use generation::{GenerationState, GenerationStore};
pub use session::{SessionState, SessionStore};

use crate::ports::PortError;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The error returned by every fallible store action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Rejected locally before any network call.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Port(#[from] PortError),
}

impl StoreError {
    pub fn message(&self) -> &str {
        match self {
            StoreError::Validation(m) => m,
            StoreError::Port(e) => e.message(),
        }
    }
}

/// A convenience type alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// The text recorded in store state for a port failure.
fn failure_message(error: &PortError, fallback: &str) -> String {
    let message = error.message().trim();
    if message.is_empty() {
        fallback.to_string()
    } else {
        message.to_string()
    }
}

// State is only touched between await points, so a panic mid-update cannot leave
// it half-written; a poisoned lock is still safe to reuse.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
