// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `/api/analysesresults`: result-centric aliases over the analyses collection.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, put};
use axum::{Json, Router};
use seastate_core::{summarize, SummaryLevel};
use serde_json::Value;

use super::analyses;
use crate::error::ApiError;
use crate::state::{blocking, AppState};

/// Every analysis with its metadata and general results.
async fn analyses_meta(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Value>>, ApiError> {
    let documents = blocking(&state, analyses::load_all).await?;
    Ok(Json(summarize(&documents, &BTreeMap::new(), SummaryLevel::Full)))
}

pub(super) fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/analysesresults/seastate_summary_results/{id}",
            get(analyses::seastate_results),
        )
        .route("/api/analysesresults/analysesmeta", get(analyses_meta))
        .route(
            "/api/analysesresults/seastate_summary_update",
            put(analyses::summary_update),
        )
}
