//! Database-specific error types and conversions.

use idstore_core::error::StoreError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid {entity} record: {reason}")]
    InvalidRecord { entity: &'static str, reason: String },

    #[error("Column `{column}` is not writable on {table}")]
    UnknownColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl DbError {
    pub(crate) fn invalid(entity: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            entity,
            reason: reason.into(),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        StoreError::storage(err)
    }
}
