//! Request-scoped unit of work over a [`CafeItemStore`]
//!
//! Writes are staged in memory with [`RestContext::add`],
//! [`RestContext::remove`] and [`RestContext::mark_modified`], then applied
//! together by [`RestContext::save_changes`]. Reads always go to the store.

use crate::ports::{CafeItemStore, Change};
use crate::types::CafeItem;
use crate::Result;
use std::sync::Arc;
use tracing::debug;

pub struct RestContext {
    store: Arc<dyn CafeItemStore>,
    pending: Vec<Change>,
}

impl RestContext {
    pub fn new(store: Arc<dyn CafeItemStore>) -> Self {
        Self {
            store,
            pending: Vec::new(),
        }
    }

    /// The whole `CafeItems` collection.
    pub async fn cafe_items(&self) -> Result<Vec<CafeItem>> {
        self.store.list().await
    }

    pub async fn find(&self, id: i64) -> Result<Option<CafeItem>> {
        self.store.find(id).await
    }

    pub async fn exists(&self, id: i64) -> Result<bool> {
        self.store.exists(id).await
    }

    pub fn add(&mut self, item: CafeItem) {
        self.pending.push(Change::Added(item));
    }

    pub fn remove(&mut self, item: CafeItem) {
        self.pending.push(Change::Deleted(item));
    }

    /// Stages a full replace of the stored row with `item`.
    pub fn mark_modified(&mut self, item: CafeItem) {
        self.pending.push(Change::Modified(item));
    }

    pub fn has_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Commits every staged change atomically.
    ///
    /// The buffer is drained whether or not the commit succeeds. Returns the
    /// persisted added/modified items in staging order.
    pub async fn save_changes(&mut self) -> Result<Vec<CafeItem>> {
        if !self.has_changes() {
            return Ok(Vec::new());
        }

        let changes = std::mem::take(&mut self.pending);
        debug!("Saving {} staged change(s)", changes.len());
        self.store.commit(changes).await
    }
}
