//! Storage traits for persistence

use crate::types::CafeItem;
use crate::Result;
use async_trait::async_trait;

/// A staged write, applied by [`CafeItemStore::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Added(CafeItem),
    Modified(CafeItem),
    Deleted(CafeItem),
}

/// Cafe item store
#[async_trait]
pub trait CafeItemStore: Send + Sync {
    /// All items, ordered by id.
    async fn list(&self) -> Result<Vec<CafeItem>>;

    async fn find(&self, id: i64) -> Result<Option<CafeItem>>;

    async fn exists(&self, id: i64) -> Result<bool>;

    /// Applies every change in a single transaction.
    ///
    /// Returns the persisted form of each added or modified item, in order.
    /// A modify or delete that matches no row rolls the whole batch back
    /// and fails with [`crate::CafeError::ConcurrencyConflict`].
    async fn commit(&self, changes: Vec<Change>) -> Result<Vec<CafeItem>>;
}
