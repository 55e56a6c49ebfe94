//! Persistence layer for bento
//!
//! Provides:
//! - Repository traits for todos and journal entries
//! - The identity service trait (registration, sessions)
//! - SQLite backend used by bentod
//! - In-memory backend for tests and offline use

mod credentials;
mod memory;
mod sqlite;
mod traits;

pub use credentials::*;
pub use memory::*;
pub use sqlite::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Remote store error: {0}")]
    Remote(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<bento_util::DateKeyError> for StoreError {
    fn from(e: bento_util::DateKeyError) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Minimum password length when the caller does not configure one
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;

/// Reject todo text that is empty after trimming
pub(crate) fn check_todo_text(text: &str) -> StoreResult<()> {
    if text.trim().is_empty() {
        return Err(StoreError::Validation("todo text cannot be empty".into()));
    }
    Ok(())
}
