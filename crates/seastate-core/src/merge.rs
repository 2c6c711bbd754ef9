// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Seastate summary-result merge engine.
//!
//! Every operation takes the document by reference and returns a fresh one;
//! the input is never modified and never aliased into the output.
//!
//! # Ambiguous keys
//!
//! A `(location, result_type)` key that matches more than one series, or an
//! `(hs, tp)` pair that matches more than one point, is handled exactly like
//! a miss: a new series (or point) is appended. This compounds rather than
//! repairs a duplicate, so it is logged at `warn`.

use tracing::warn;

use crate::error::MergeError;
use crate::filter::{find, Constraint, FieldValue, Matches};
use crate::model::{
    AnalysisDocument, Location, Method, PointResult, PointUpdate, ResultSeries, ResultType,
    SeaStatePoint, SeriesMeta, Statistic, TimeSeriesLink, Unit,
};
use crate::units::resolve_unit;

/// Replace the value for `method`, keeping its position, or append it.
pub fn upsert_method(values: &[Statistic], method: Method, value: f64) -> Vec<Statistic> {
    let mut out = values.to_vec();
    match out.iter_mut().find(|s| s.method == method) {
        Some(existing) => existing.value = value,
        None => out.push(Statistic::new(method, value)),
    }
    out
}

/// Natural key of the point an edit lands on.
struct Target {
    hs: f64,
    tp: f64,
    location: Location,
    result_type: ResultType,
}

fn series_index(series: &[ResultSeries], target: &Target) -> Option<usize> {
    let constraints: [Constraint<'_>; 2] = [
        ("result_type", FieldValue::Text(target.result_type.as_str())),
        ("location", FieldValue::Text(target.location.as_str())),
    ];
    match find(series, &constraints, Some("meta")) {
        Matches::One(idx, _) => Some(idx),
        Matches::Zero => None,
        Matches::Many(hits) => {
            warn!(
                location = %target.location,
                result_type = %target.result_type,
                duplicates = hits.len(),
                "series key is duplicated; appending a new series"
            );
            None
        }
    }
}

fn point_index(points: &[SeaStatePoint], target: &Target) -> Option<usize> {
    let constraints: [Constraint<'_>; 2] = [
        ("hs", FieldValue::Number(target.hs)),
        ("tp", FieldValue::Number(target.tp)),
    ];
    let found = find(points, &constraints, None);
    if let Matches::Many(hits) = &found {
        warn!(
            hs = target.hs,
            tp = target.tp,
            location = %target.location,
            result_type = %target.result_type,
            duplicates = hits.len(),
            "sea-state point is duplicated; appending a new point"
        );
    }
    found.single_index()
}

fn new_point(target: &Target, result: PointResult) -> SeaStatePoint {
    SeaStatePoint {
        hs: target.hs,
        tp: target.tp,
        result,
    }
}

/// Shared skeleton of the point-level edits.
///
/// `edit` modifies an existing point's result; `fresh` builds the result of
/// a newly created point.
fn apply_at(
    document: &AnalysisDocument,
    target: &Target,
    unit: Option<Unit>,
    edit: impl FnOnce(&mut PointResult),
    fresh: impl FnOnce() -> PointResult,
) -> Result<AnalysisDocument, MergeError> {
    match series_index(&document.all_seastate_results, target) {
        Some(idx) => {
            let mut out = document.clone();
            let series = &mut out.all_seastate_results[idx];
            match point_index(&series.data, target) {
                Some(p) => edit(&mut series.data[p].result),
                None => series.data.push(new_point(target, fresh())),
            }
            Ok(out)
        }
        None => {
            // resolved before cloning so a lookup failure builds nothing
            let unit = resolve_unit(target.result_type, unit)?;
            let mut out = document.clone();
            out.all_seastate_results.push(ResultSeries {
                meta: SeriesMeta {
                    location: target.location,
                    result_type: target.result_type,
                    unit,
                },
                data: vec![new_point(target, fresh())],
            });
            Ok(out)
        }
    }
}

/// Merge one statistic into `document`.
///
/// `unit` is only consulted when a new series has to be created; without it
/// the result type's default unit is used.
pub fn apply_point_update(
    document: &AnalysisDocument,
    update: &PointUpdate,
    unit: Option<Unit>,
) -> Result<AnalysisDocument, MergeError> {
    let target = Target {
        hs: update.hs,
        tp: update.tp,
        location: update.location,
        result_type: update.result_type,
    };
    apply_at(
        document,
        &target,
        unit,
        |result| {
            result.summary_values =
                upsert_method(&result.summary_values, update.method, update.value);
        },
        || PointResult {
            summary_values: vec![Statistic::new(update.method, update.value)],
            time_series_id: None,
        },
    )
}

/// Set the raw time-series reference of one sea-state point.
///
/// A point created here starts with no statistics.
pub fn apply_timeseries_link(
    document: &AnalysisDocument,
    link: &TimeSeriesLink,
) -> Result<AnalysisDocument, MergeError> {
    let target = Target {
        hs: link.hs,
        tp: link.tp,
        location: link.location,
        result_type: link.result_type,
    };
    apply_at(
        document,
        &target,
        link.unit,
        |result| result.time_series_id = Some(link.time_series_id.clone()),
        || PointResult {
            summary_values: Vec::new(),
            time_series_id: Some(link.time_series_id.clone()),
        },
    )
}

/// Fold `updates` over `document` in order; later updates see earlier ones.
///
/// Stops at the first failing update and returns its error; the caller's
/// document is untouched either way.
pub fn apply_updates(
    document: &AnalysisDocument,
    updates: &[PointUpdate],
) -> Result<AnalysisDocument, MergeError> {
    updates
        .iter()
        .try_fold(document.clone(), |doc, update| apply_point_update(&doc, update, None))
}

/// Fold `links` over `document` in order.
pub fn apply_timeseries_links(
    document: &AnalysisDocument,
    links: &[TimeSeriesLink],
) -> Result<AnalysisDocument, MergeError> {
    links
        .iter()
        .try_fold(document.clone(), |doc, link| apply_timeseries_link(&doc, link))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn stats(pairs: &[(Method, f64)]) -> Vec<Statistic> {
        pairs.iter().map(|(m, v)| Statistic::new(*m, *v)).collect()
    }

    #[test]
    fn upsert_appends_new_method() {
        let before = stats(&[(Method::Std, 1.0), (Method::Max, 2.0)]);
        let after = upsert_method(&before, Method::Min, 3.0);
        assert_eq!(
            after,
            stats(&[(Method::Std, 1.0), (Method::Max, 2.0), (Method::Min, 3.0)])
        );
        assert_eq!(before.len(), 2);
    }

    #[test]
    fn upsert_replaces_in_place() {
        let before = stats(&[(Method::Std, 1.0), (Method::Max, 2.0)]);
        let after = upsert_method(&before, Method::Max, 5.0);
        assert_eq!(after, stats(&[(Method::Std, 1.0), (Method::Max, 5.0)]));
        assert_eq!(before[1].value, 2.0);
    }

    #[test]
    fn upsert_into_empty() {
        assert_eq!(
            upsert_method(&[], Method::Max, 5.0),
            stats(&[(Method::Max, 5.0)])
        );
    }
}
