//! Cafe item handlers

use crate::error::ApiError;
use crate::extractors::DbContext;
use axum::{
    extract::{rejection::JsonRejection, Path, Request},
    http::{header, StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use cafe_core::{CafeError, CafeItem, RestContext};
use tracing::info;

/// Canonical resource path, used for routing and `Location` headers.
pub const RESOURCE_PATH: &str = "/api/cafemodels";

/// Rewrites any casing of the resource prefix to [`RESOURCE_PATH`].
///
/// Only the prefix is touched; the rest of the path and the query are kept.
pub async fn normalize_path(mut request: Request) -> Request {
    let path = request.uri().path();
    let len = RESOURCE_PATH.len();

    let needs_rewrite = path.get(..len).is_some_and(|prefix| {
        prefix != RESOURCE_PATH && prefix.eq_ignore_ascii_case(RESOURCE_PATH)
    }) && matches!(path.as_bytes().get(len), None | Some(b'/'));
    if !needs_rewrite {
        return request;
    }

    let rewritten = match request.uri().query() {
        Some(query) => format!("{}{}?{}", RESOURCE_PATH, &path[len..], query),
        None => format!("{}{}", RESOURCE_PATH, &path[len..]),
    };

    let mut parts = request.uri().clone().into_parts();
    parts.path_and_query = rewritten.parse().ok();
    if let Ok(uri) = Uri::from_parts(parts) {
        *request.uri_mut() = uri;
    }
    request
}

pub async fn list(ctx: DbContext) -> Result<Json<Vec<CafeItem>>, ApiError> {
    let items = ctx.cafe_items().await.map_err(ApiError::from_store)?;
    Ok(Json(items))
}

pub async fn get(ctx: DbContext, Path(id): Path<i64>) -> Result<Json<CafeItem>, ApiError> {
    match ctx.find(id).await.map_err(ApiError::from_store)? {
        Some(item) => Ok(Json(item)),
        None => Err(ApiError::NotFound),
    }
}

pub async fn create(
    mut ctx: DbContext,
    payload: Result<Json<CafeItem>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(item) = payload?;

    ctx.add(item);
    let saved = ctx.save_changes().await.map_err(|e| {
        if e.is_collection_unavailable() {
            ApiError::BadRequest(e.to_string())
        } else {
            ApiError::Internal(e)
        }
    })?;

    let item = saved.into_iter().next().ok_or_else(|| {
        ApiError::Internal(CafeError::Database("Insert returned no row".to_string()))
    })?;
    info!("Created cafe item {}", item.id);

    let location = format!("{}/{}", RESOURCE_PATH, item.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(item)))
}

pub async fn update(
    mut ctx: DbContext,
    Path(id): Path<i64>,
    payload: Result<Json<CafeItem>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(item) = payload?;

    if id != item.id {
        return Err(ApiError::BadRequest(format!(
            "Path id {} does not match body id {}",
            id, item.id
        )));
    }

    ctx.mark_modified(item);
    save_resolving_conflict(&mut ctx, id).await?;
    info!("Updated cafe item {}", id);

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(mut ctx: DbContext, Path(id): Path<i64>) -> Result<StatusCode, ApiError> {
    let item = ctx
        .find(id)
        .await
        .map_err(ApiError::from_store)?
        .ok_or(ApiError::NotFound)?;

    ctx.remove(item);
    save_resolving_conflict(&mut ctx, id).await?;
    info!("Deleted cafe item {}", id);

    Ok(StatusCode::NO_CONTENT)
}

/// Saves staged changes for `id`.
///
/// On a concurrency conflict the row is looked up again: if it is gone the
/// request is not-found, otherwise the conflict is escalated as is.
async fn save_resolving_conflict(ctx: &mut RestContext, id: i64) -> Result<(), ApiError> {
    match ctx.save_changes().await {
        Ok(_) => Ok(()),
        Err(e) if e.is_concurrency_conflict() => {
            if ctx.exists(id).await.map_err(ApiError::from_store)? {
                Err(ApiError::Internal(e))
            } else {
                Err(ApiError::NotFound)
            }
        }
        Err(e) => Err(ApiError::from_store(e)),
    }
}
