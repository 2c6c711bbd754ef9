// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `/api` routes.

mod analyses;
mod collection;
mod results;

use std::sync::Arc;

use axum::http::header::{ETAG, IF_MATCH};
use axum::http::{HeaderMap, HeaderValue};
use axum::Router;
use seastate_core::{AnalysisDocument, AnalysisInput, Soil, Validate, Vessel};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

/// A stored collection and the record type its bodies must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// Analysis documents.
    Analyses,
    /// Vessels.
    Vessels,
    /// Soil profiles.
    Soil,
    /// Analysis inputs.
    AnalysisInput,
}

impl Collection {
    /// Every served collection.
    pub const ALL: [Self; 4] = [
        Self::Analyses,
        Self::Vessels,
        Self::Soil,
        Self::AnalysisInput,
    ];

    /// Collection name in the store and in the URL.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Analyses => "analyses",
            Self::Vessels => "vessels",
            Self::Soil => "soil",
            Self::AnalysisInput => "analysis_input",
        }
    }

    /// Deserialize `body` as this collection's record, range-check it, and
    /// return its canonical JSON form.
    pub fn normalize(self, body: Value) -> Result<Value, ApiError> {
        match self {
            Self::Analyses => normalize::<AnalysisDocument>(body),
            Self::Vessels => normalize::<Vessel>(body),
            Self::Soil => normalize::<Soil>(body),
            Self::AnalysisInput => normalize::<AnalysisInput>(body),
        }
    }
}

fn normalize<T>(body: Value) -> Result<Value, ApiError>
where
    T: DeserializeOwned + Serialize + Validate,
{
    let record: T = serde_json::from_value(body)?;
    record.validate()?;
    Ok(serde_json::to_value(&record)?)
}

/// `ETag` header carrying a document version.
pub(crate) fn etag(version: u64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&format!("\"{version}\"")) {
        headers.insert(ETAG, value);
    }
    headers
}

/// Version named by `If-Match`, if the header is present and not `*`.
pub(crate) fn if_match(headers: &HeaderMap) -> Result<Option<u64>, ApiError> {
    let Some(raw) = headers.get(IF_MATCH) else {
        return Ok(None);
    };
    let raw = raw.to_str().map_err(|_| ApiError::BadPrecondition)?.trim();
    if raw == "*" {
        return Ok(None);
    }
    let tag = raw.strip_prefix("W/").unwrap_or(raw).trim_matches('"');
    tag.parse()
        .map(Some)
        .map_err(|_| ApiError::BadPrecondition)
}

/// Every authorized route.
pub fn api_router() -> Router<Arc<AppState>> {
    let collections = Collection::ALL
        .into_iter()
        .fold(Router::new(), |router, c| router.merge(collection::router(c)));
    collections
        .merge(analyses::router())
        .merge(results::router())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn if_match_forms() {
        let mut headers = HeaderMap::new();
        assert_eq!(if_match(&headers).unwrap(), None);
        headers.insert(IF_MATCH, HeaderValue::from_static("\"4\""));
        assert_eq!(if_match(&headers).unwrap(), Some(4));
        headers.insert(IF_MATCH, HeaderValue::from_static("W/\"5\""));
        assert_eq!(if_match(&headers).unwrap(), Some(5));
        headers.insert(IF_MATCH, HeaderValue::from_static("*"));
        assert_eq!(if_match(&headers).unwrap(), None);
        headers.insert(IF_MATCH, HeaderValue::from_static("\"abc\""));
        assert!(matches!(if_match(&headers), Err(ApiError::BadPrecondition)));
    }

    #[test]
    fn normalize_rejects_unknown_vessel_fields() {
        let ok = Collection::Vessels
            .normalize(json!({"name": "Deep Explorer", "imo": 9000001}))
            .unwrap();
        assert_eq!(ok["name"], "Deep Explorer");
        assert!(matches!(
            Collection::Vessels.normalize(json!({"name": "x", "imo": 1, "flag": "NO"})),
            Err(ApiError::Schema(_))
        ));
        assert!(matches!(
            Collection::Vessels.normalize(json!({"name": "x", "imo": 0})),
            Err(ApiError::Validation(_))
        ));
    }
}
