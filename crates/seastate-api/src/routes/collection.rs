// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! CRUD over one stored collection.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use seastate_store::{apply_patch, PatchOperation, StoreError};
use serde_json::Value;
use tracing::info;

use super::{etag, if_match, Collection};
use crate::error::ApiError;
use crate::state::{blocking, AppState};

type Tagged = (HeaderMap, Json<Value>);

/// A conflict on a replace guarded by `If-Match` is the client's stale tag,
/// not a lost race.
fn stale_tag(expected: Option<u64>) -> impl Fn(StoreError) -> ApiError {
    move |err| match err {
        StoreError::Conflict { actual, .. } if expected.is_some() => {
            ApiError::PreconditionFailed { actual }
        }
        other => ApiError::Store(other),
    }
}

fn list(collection: Collection, state: &AppState) -> Result<Json<Vec<Value>>, ApiError> {
    Ok(Json(state.store.list(collection.name())?))
}

fn create(
    collection: Collection,
    state: &AppState,
    body: Value,
) -> Result<(StatusCode, HeaderMap, Json<Value>), ApiError> {
    let body = collection.normalize(body)?;
    let saved = state.store.create(collection.name(), body)?;
    info!(
        collection = collection.name(),
        id = saved.body["id"].as_str().unwrap_or_default(),
        "document created"
    );
    Ok((StatusCode::CREATED, etag(saved.version), Json(saved.body)))
}

fn fetch(collection: Collection, state: &AppState, id: &str) -> Result<Tagged, ApiError> {
    let doc = state.store.get(collection.name(), id)?;
    Ok((etag(doc.version), Json(doc.body)))
}

fn replace(
    collection: Collection,
    state: &AppState,
    id: &str,
    expected: Option<u64>,
    body: Value,
) -> Result<Tagged, ApiError> {
    let body = collection.normalize(body)?;
    let saved = state
        .store
        .replace(collection.name(), id, body, expected)
        .map_err(stale_tag(expected))?;
    info!(collection = collection.name(), id = %id, version = saved.version, "document replaced");
    Ok((etag(saved.version), Json(saved.body)))
}

fn patch(
    collection: Collection,
    state: &AppState,
    id: &str,
    expected: Option<u64>,
    operations: &[PatchOperation],
) -> Result<Tagged, ApiError> {
    let current = state.store.get(collection.name(), id)?;
    if let Some(version) = expected {
        if version != current.version {
            return Err(ApiError::PreconditionFailed {
                actual: current.version,
            });
        }
    }
    let patched = collection.normalize(apply_patch(&current.body, operations)?)?;
    let saved = state
        .store
        .replace(collection.name(), id, patched, Some(current.version))
        .map_err(stale_tag(expected))?;
    info!(
        collection = collection.name(),
        id = %id,
        operations = operations.len(),
        version = saved.version,
        "document patched"
    );
    Ok((etag(saved.version), Json(saved.body)))
}

fn remove(collection: Collection, state: &AppState, id: &str) -> Result<StatusCode, ApiError> {
    state.store.delete(collection.name(), id)?;
    info!(collection = collection.name(), id = %id, "document deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `/api/{name}` and `/api/{name}/{id}` for `collection`.
pub(super) fn router(collection: Collection) -> Router<Arc<AppState>> {
    let base = format!("/api/{}", collection.name());
    let item = format!("{base}/{{id}}");
    Router::new()
        .route(
            &base,
            get(move |State(state): State<Arc<AppState>>| async move {
                blocking(&state, move |s| list(collection, s)).await
            })
            .post(
                move |State(state): State<Arc<AppState>>,
                      body: Result<Json<Value>, JsonRejection>| async move {
                    let Json(body) = body?;
                    blocking(&state, move |s| create(collection, s, body)).await
                },
            ),
        )
        .route(
            &item,
            get(
                move |State(state): State<Arc<AppState>>, Path(id): Path<String>| async move {
                    blocking(&state, move |s| fetch(collection, s, &id)).await
                },
            )
            .put(
                move |State(state): State<Arc<AppState>>,
                      Path(id): Path<String>,
                      headers: HeaderMap,
                      body: Result<Json<Value>, JsonRejection>| async move {
                    let expected = if_match(&headers)?;
                    let Json(body) = body?;
                    blocking(&state, move |s| replace(collection, s, &id, expected, body)).await
                },
            )
            .patch(
                move |State(state): State<Arc<AppState>>,
                      Path(id): Path<String>,
                      headers: HeaderMap,
                      body: Result<Json<Vec<PatchOperation>>, JsonRejection>| async move {
                    let expected = if_match(&headers)?;
                    let Json(operations) = body?;
                    blocking(&state, move |s| {
                        patch(collection, s, &id, expected, &operations)
                    })
                    .await
                },
            )
            .delete(
                move |State(state): State<Arc<AppState>>, Path(id): Path<String>| async move {
                    blocking(&state, move |s| remove(collection, s, &id)).await
                },
            ),
        )
}
