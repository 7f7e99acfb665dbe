//! Database error types.

use std::path::PathBuf;

use thiserror::Error;

/// Database operation errors.
#[derive(Error, Debug)]
pub enum DbError {
    /// No row matched the requested id.
    #[error("No {entity} with id={id} exists")]
    NotFound { entity: &'static str, id: i64 },

    /// Input rejected before reaching the store.
    #[error("{0}")]
    InvalidData(String),

    /// A seed file could not be opened or decoded.
    #[error("Seed file {}: {source}", path.display())]
    Seed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Hashing a seeded password failed.
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    /// SQLx error.
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

impl DbError {
    /// Check if this is a not found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
