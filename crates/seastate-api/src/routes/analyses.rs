// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Analysis result views, listings and merge updates.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, put};
use axum::{Extension, Json, Router};
use seastate_core::{
    apply_timeseries_links, apply_updates, available_methods, flatten, group_by_series_key,
    series_key_types, summarize, timeseries_index, AnalysisDocument, FlatRow, Location,
    MergeError, Method, ResultType, ScatterGroup, SeriesKey, SummaryLevel, TimeSeriesEntry,
    TimeSeriesLinkRequest, UpdateRequest, Validate,
};
use seastate_store::{StoreError, Versioned};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::{etag, Collection};
use crate::auth::User;
use crate::error::ApiError;
use crate::state::{blocking, AppState};

const ANALYSES: &str = Collection::Analyses.name();

/// Fetch and type one analysis.
pub(super) fn load(state: &AppState, id: &str) -> Result<Versioned<AnalysisDocument>, ApiError> {
    let stored = state.store.get(ANALYSES, id)?;
    Ok(Versioned {
        version: stored.version,
        body: serde_json::from_value(stored.body)?,
    })
}

/// Every analysis that parses; unparseable documents are skipped.
pub(super) fn load_all(state: &AppState) -> Result<Vec<AnalysisDocument>, ApiError> {
    let documents = state
        .store
        .list(ANALYSES)?
        .into_iter()
        .filter_map(|body| {
            let id = body["id"].as_str().unwrap_or_default().to_owned();
            match serde_json::from_value(body) {
                Ok(doc) => Some(doc),
                Err(err) => {
                    warn!(id = %id, %err, "skipping malformed analysis");
                    None
                }
            }
        })
        .collect();
    Ok(documents)
}

/// Load, edit and replace an analysis guarded by the loaded version,
/// reloading after a lost race up to `update_retries` times.
fn modify(
    state: &AppState,
    id: &str,
    edit: impl Fn(&AnalysisDocument) -> Result<AnalysisDocument, MergeError>,
) -> Result<Versioned<Value>, ApiError> {
    let mut attempt = 0;
    loop {
        let current = load(state, id)?;
        let merged = serde_json::to_value(edit(&current.body)?)?;
        match state
            .store
            .replace(ANALYSES, id, merged, Some(current.version))
        {
            Ok(saved) => return Ok(saved),
            Err(StoreError::Conflict { actual, .. }) if attempt < state.update_retries => {
                attempt += 1;
                warn!(id = %id, attempt, actual, "analysis changed underneath update; retrying");
            }
            Err(err) => return Err(err.into()),
        }
    }
}

pub(super) async fn seastate_results(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<FlatRow>>, ApiError> {
    let doc = blocking(&state, move |s| load(s, &id)).await?.body;
    Ok(Json(flatten(&doc)))
}

async fn result_types(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BTreeSet<SeriesKey>>, ApiError> {
    let doc = blocking(&state, move |s| load(s, &id)).await?.body;
    Ok(Json(series_key_types(&doc)))
}

/// Methods observed in one series.
#[derive(Debug, Serialize)]
struct SeriesMethods {
    location: Location,
    result_type: ResultType,
    methods: BTreeSet<Method>,
}

async fn result_methods(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<SeriesMethods>>, ApiError> {
    let doc = blocking(&state, move |s| load(s, &id)).await?.body;
    let rows = doc
        .all_seastate_results
        .iter()
        .map(|series| SeriesMethods {
            location: series.meta.location,
            result_type: series.meta.result_type,
            methods: available_methods(series),
        })
        .collect();
    Ok(Json(rows))
}

async fn time_series_ids(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BTreeMap<String, BTreeMap<String, TimeSeriesEntry>>>, ApiError> {
    let doc = blocking(&state, move |s| load(s, &id)).await?.body;
    Ok(Json(timeseries_index(&doc)))
}

async fn dynamic_interpolator(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ScatterGroup>>, ApiError> {
    let doc = blocking(&state, move |s| load(s, &id)).await?.body;
    Ok(Json(group_by_series_key(&flatten(&doc))))
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    #[serde(default)]
    result_type: SummaryLevel,
}

/// Vessel id to vessel name.
fn vessel_names(state: &AppState) -> Result<BTreeMap<String, String>, ApiError> {
    Ok(state
        .store
        .list(Collection::Vessels.name())?
        .into_iter()
        .filter_map(|v| Some((v["id"].as_str()?.to_owned(), v["name"].as_str()?.to_owned())))
        .collect())
}

async fn result_summary(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let Query(query) = query?;
    let (documents, vessels) =
        blocking(&state, |s| Ok((load_all(s)?, vessel_names(s)?))).await?;
    Ok(Json(summarize(&documents, &vessels, query.result_type)))
}

/// Merge a batch of statistic updates into one analysis.
pub(super) async fn summary_update(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    body: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<(HeaderMap, Json<Value>), ApiError> {
    let Json(request) = body?;
    request.validate()?;
    let id = request.id.to_string();
    let count = request.updates.len();
    let key = id.clone();
    let saved = blocking(&state, move |s| {
        modify(s, &key, |doc| apply_updates(doc, &request.updates))
    })
    .await?;
    info!(
        id = %id,
        updates = count,
        version = saved.version,
        user = %user.email,
        "seastate summary updated"
    );
    Ok((etag(saved.version), Json(saved.body)))
}

/// Attach raw time-series references to sea-state points of one analysis.
async fn timeseries_update(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    body: Result<Json<TimeSeriesLinkRequest>, JsonRejection>,
) -> Result<(HeaderMap, Json<Value>), ApiError> {
    let Json(request) = body?;
    request.validate()?;
    let id = request.id.to_string();
    let count = request.links.len();
    let key = id.clone();
    let saved = blocking(&state, move |s| {
        modify(s, &key, |doc| apply_timeseries_links(doc, &request.links))
    })
    .await?;
    info!(
        id = %id,
        links = count,
        version = saved.version,
        user = %user.email,
        "seastate time-series links updated"
    );
    Ok((etag(saved.version), Json(saved.body)))
}

pub(super) fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/analyses/{id}/seastate_results", get(seastate_results))
        .route("/api/analyses/{id}/result_types", get(result_types))
        .route("/api/analyses/{id}/result_methods", get(result_methods))
        .route("/api/analyses/{id}/drio_time_series_ids", get(time_series_ids))
        .route("/api/analyses/{id}/dynamic_interpolator", get(dynamic_interpolator))
        .route("/api/analyses/summary/result_summary", get(result_summary))
        .route(
            "/api/analyses/update/seastate_summary_update",
            put(summary_update),
        )
        .route(
            "/api/analyses/update/seastate_timeseries_update",
            put(timeseries_update),
        )
}
