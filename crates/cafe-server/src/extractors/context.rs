//! Per-request storage context extractor

use crate::AppState;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use cafe_core::RestContext;
use std::convert::Infallible;
use std::ops::{Deref, DerefMut};

/// A fresh [`RestContext`] for the current request.
///
/// Staged changes live only as long as the request that created them.
pub struct DbContext(pub RestContext);

#[async_trait]
impl FromRequestParts<AppState> for DbContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(DbContext(RestContext::new(state.store.clone())))
    }
}

impl Deref for DbContext {
    type Target = RestContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DbContext {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
