//! Error types for the storage layer.

use notes_core::{Denial, DuplicateSlugError, NoteId, UserId};
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Another note already uses this slug.
    #[error(transparent)]
    DuplicateSlug(#[from] DuplicateSlugError),

    /// No note with this slug is visible to the caller.
    #[error("note not found: {0}")]
    NoteNotFound(String),

    /// No note with this id.
    #[error("note not found: {0}")]
    NoteIdNotFound(NoteId),

    /// User not found.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// Username already registered.
    #[error("username already taken: {0}")]
    UsernameTaken(String),

    /// The caller must log in first.
    #[error("authentication required")]
    Unauthenticated,

    /// Requested list page does not exist.
    #[error("invalid page: {0}")]
    InvalidPage(#[from] notes_core::PageError),

    /// Migration error.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl StoreError {
    /// Map an access-policy refusal for the note addressed by `slug`.
    pub fn from_denial(denial: Denial, slug: &str) -> Self {
        match denial {
            Denial::Unauthenticated => Self::Unauthenticated,
            Denial::NotFound => Self::NoteNotFound(slug.to_string()),
        }
    }

    /// Whether this error means "nothing to show" rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NoteNotFound(_)
                | Self::NoteIdNotFound(_)
                | Self::UserNotFound(_)
                | Self::InvalidPage(_)
        )
    }
}
