// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! HTTP error mapping. Every failure leaves as `{"detail": "..."}`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use seastate_core::{MergeError, ValidationError};
use seastate_store::{PatchError, StoreError};
use serde_json::json;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::error;

use crate::auth::AuthError;

/// Errors surfaced by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Malformed patch.
    #[error(transparent)]
    Patch(#[from] PatchError),
    /// Update could not be merged.
    #[error(transparent)]
    Merge(#[from] MergeError),
    /// Field outside its domain.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Caller not authenticated or not admitted.
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// Body did not match the record schema.
    #[error("{0}")]
    Schema(#[from] serde_json::Error),
    /// Body could not be read as JSON.
    #[error(transparent)]
    Body(#[from] JsonRejection),
    /// Query string could not be parsed.
    #[error(transparent)]
    Query(#[from] QueryRejection),
    /// `If-Match` did not name the current version.
    #[error("precondition failed: document is at version {actual}")]
    PreconditionFailed {
        /// Stored version.
        actual: u64,
    },
    /// `If-Match` is not a version tag.
    #[error("malformed If-Match header")]
    BadPrecondition,
    /// Blocking store work panicked or was cancelled.
    #[error("store task failed: {0}")]
    Task(#[from] JoinError),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::NotFound { .. } | StoreError::InvalidKey(_)) => {
                StatusCode::NOT_FOUND
            }
            Self::Store(StoreError::Conflict { .. }) => StatusCode::CONFLICT,
            Self::Store(StoreError::InvalidDocument(_))
            | Self::Merge(_)
            | Self::Validation(_)
            | Self::Schema(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(StoreError::Poisoned | StoreError::Io(_) | StoreError::Serde(_))
            | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Patch(_) | Self::BadPrecondition => StatusCode::BAD_REQUEST,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Body(rejection) => rejection.status(),
            Self::Query(rejection) => rejection.status(),
            Self::PreconditionFailed { .. } => StatusCode::PRECONDITION_FAILED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(err = %self, "request failed");
        }
        let detail = match &self {
            Self::Body(rejection) => rejection.body_text(),
            Self::Query(rejection) => rejection.body_text(),
            other => other.to_string(),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
