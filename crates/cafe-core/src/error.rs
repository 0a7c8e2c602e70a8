//! Error types for the cafe API

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CafeError>;

#[derive(Error, Debug)]
pub enum CafeError {
    /// The target row was changed or removed between read and write.
    #[error("Concurrency conflict on cafe item {id}")]
    ConcurrencyConflict { id: i64 },

    #[error("Collection unavailable: {0}")]
    CollectionUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl CafeError {
    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, CafeError::ConcurrencyConflict { .. })
    }

    pub fn is_collection_unavailable(&self) -> bool {
        matches!(self, CafeError::CollectionUnavailable(_))
    }
}

