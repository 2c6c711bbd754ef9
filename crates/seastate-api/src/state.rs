// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared handler state.

use std::sync::Arc;

use seastate_store::DocumentStore;

use crate::auth::Authorizer;
use crate::error::ApiError;

/// Everything a handler needs, injected once at startup.
pub struct AppState {
    /// Document storage.
    pub store: Arc<dyn DocumentStore>,
    /// Token verification and organization allow-list.
    pub auth: Authorizer,
    /// Extra load-merge-replace attempts after a version conflict.
    pub update_retries: u32,
}

impl AppState {
    /// Bundle the collaborators.
    pub fn new(store: Arc<dyn DocumentStore>, auth: Authorizer, update_retries: u32) -> Self {
        Self {
            store,
            auth,
            update_retries,
        }
    }
}

/// Run `work` on the blocking pool; store adapters do synchronous file I/O.
pub async fn blocking<T, F>(state: &Arc<AppState>, work: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppState) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || work(&state)).await?
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use seastate_store::MemoryStore;
    use serde_json::json;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(
            Arc::new(MemoryStore::new()),
            Authorizer::development(),
            0,
        ))
    }

    #[tokio::test]
    async fn store_work_leaves_the_async_thread() {
        let state = state();
        let caller = std::thread::current().id();
        let (worker, created) = blocking(&state, |s| {
            let created = s.store.create("vessels", json!({"name": "A", "imo": 1}))?;
            Ok((std::thread::current().id(), created))
        })
        .await
        .unwrap();
        assert_ne!(caller, worker);
        assert_eq!(created.version, 1);
    }

    #[tokio::test]
    async fn panicking_store_work_is_a_server_error() {
        let err = blocking(&state(), |_| -> Result<(), ApiError> { panic!("disk on fire") })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Task(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
