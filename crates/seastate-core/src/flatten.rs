// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Read-side views over the nested result structure.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::{AnalysisDocument, Location, Method, ResultSeries, ResultType, SeriesKey, Unit};

/// One statistic with its full natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRow {
    /// Significant wave height.
    pub hs: f64,
    /// Peak wave period.
    pub tp: f64,
    /// Measurement position.
    pub location: Location,
    /// Physical quantity.
    pub result_type: ResultType,
    /// Series unit.
    pub unit: Unit,
    /// Aggregation method.
    pub method: Method,
    /// Statistic value.
    pub value: f64,
}

/// One row per `(series, point, statistic)`, in series, point, statistic order.
pub fn flatten(document: &AnalysisDocument) -> Vec<FlatRow> {
    document
        .all_seastate_results
        .iter()
        .flat_map(|series| {
            series.data.iter().flat_map(move |point| {
                point.result.summary_values.iter().map(move |stat| FlatRow {
                    hs: point.hs,
                    tp: point.tp,
                    location: series.meta.location,
                    result_type: series.meta.result_type,
                    unit: series.meta.unit,
                    method: stat.method,
                    value: stat.value,
                })
            })
        })
        .collect()
}

/// Identity of a scatter group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScatterGroupMeta {
    /// Measurement position.
    pub location: Location,
    /// Physical quantity.
    pub result_type: ResultType,
    /// Aggregation method.
    pub method: Method,
}

/// One `(Hs, Tp) -> z` sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    /// Significant wave height.
    #[serde(rename = "Hs")]
    pub hs: f64,
    /// Peak wave period.
    #[serde(rename = "Tp")]
    pub tp: f64,
    /// Statistic value.
    pub z: f64,
}

/// A 2-D scatter dataset. `meta` is reserved for interpolation hints and
/// is currently always empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scatter {
    /// Dataset metadata.
    pub meta: BTreeMap<String, String>,
    /// Samples in row order.
    pub data: Vec<ScatterPoint>,
}

/// All samples of one `(location, result_type, method)` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterGroup {
    /// Group key.
    pub meta: ScatterGroupMeta,
    /// One scatter holding every sample of the key.
    pub scatters: Vec<Scatter>,
}

/// Group flat rows by `(location, result_type, method)`.
///
/// Groups come out ordered by their `location__result_type__method` wire key;
/// samples keep row order within a group.
pub fn group_by_series_key(rows: &[FlatRow]) -> Vec<ScatterGroup> {
    let mut groups: BTreeMap<String, (ScatterGroupMeta, Vec<ScatterPoint>)> = BTreeMap::new();
    for row in rows {
        let meta = ScatterGroupMeta {
            location: row.location,
            result_type: row.result_type,
            method: row.method,
        };
        let key = format!("{}__{}__{}", row.location, row.result_type, row.method);
        groups
            .entry(key)
            .or_insert_with(|| (meta, Vec::new()))
            .1
            .push(ScatterPoint {
                hs: row.hs,
                tp: row.tp,
                z: row.value,
            });
    }
    groups
        .into_values()
        .map(|(meta, data)| ScatterGroup {
            meta,
            scatters: vec![Scatter {
                meta: BTreeMap::new(),
                data,
            }],
        })
        .collect()
}

/// Distinct series keys present in `document`.
pub fn series_key_types(document: &AnalysisDocument) -> BTreeSet<SeriesKey> {
    document
        .all_seastate_results
        .iter()
        .map(ResultSeries::key)
        .collect()
}

/// Distinct methods observed across every point of `series`.
pub fn available_methods(series: &ResultSeries) -> BTreeSet<Method> {
    series
        .data
        .iter()
        .flat_map(|point| point.result.summary_values.iter().map(|s| s.method))
        .collect()
}

/// A sea-state point that references a raw time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesEntry {
    /// Significant wave height.
    pub hs: f64,
    /// Peak wave period.
    pub tp: f64,
    /// External time-series id.
    pub time_series_id: String,
    /// Measurement position.
    pub location: Location,
    /// Physical quantity.
    pub result_type: ResultType,
    /// Series unit.
    pub unit: Unit,
}

/// Canonical `H0150_T0550` label of a sea state (centi-units, truncated).
#[allow(clippy::cast_possible_truncation)]
pub fn hs_tp_label(hs: f64, tp: f64) -> String {
    let hs = (hs * 100.0) as i64;
    let tp = (tp * 100.0) as i64;
    format!("H{hs:04}_T{tp:04}")
}

/// Time-series references of every series, keyed by `location__result_type`
/// and then by [`hs_tp_label`].
///
/// Series without any reference map to an empty entry. When two series share
/// a key, or two points share a label, the later one wins.
pub fn timeseries_index(
    document: &AnalysisDocument,
) -> BTreeMap<String, BTreeMap<String, TimeSeriesEntry>> {
    document
        .all_seastate_results
        .iter()
        .map(|series| {
            let entries = series
                .data
                .iter()
                .filter_map(|point| {
                    let id = point.result.time_series_id.as_ref()?;
                    Some((
                        hs_tp_label(point.hs, point.tp),
                        TimeSeriesEntry {
                            hs: point.hs,
                            tp: point.tp,
                            time_series_id: id.clone(),
                            location: series.meta.location,
                            result_type: series.meta.result_type,
                            unit: series.meta.unit,
                        },
                    ))
                })
                .collect();
            (series.key().wire_key(), entries)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_truncates_centi_units() {
        assert_eq!(hs_tp_label(0.5, 5.5), "H0050_T0550");
        assert_eq!(hs_tp_label(12.345, 10.0), "H1234_T1000");
    }

    #[test]
    fn grouping_orders_by_wire_key() {
        let row = |location, method, hs, value| FlatRow {
            hs,
            tp: 5.5,
            location,
            result_type: ResultType::AngleRx,
            unit: Unit::Degree,
            method,
            value,
        };
        let rows = vec![
            row(Location::WhDatum, Method::Std, 0.5, 1.0),
            row(Location::LfjAbove, Method::Std, 0.5, 2.0),
            row(Location::WhDatum, Method::Std, 1.5, 3.0),
            row(Location::WhDatum, Method::Max, 0.5, 4.0),
        ];
        let groups = group_by_series_key(&rows);
        let keys: Vec<_> = groups
            .iter()
            .map(|g| (g.meta.location, g.meta.method))
            .collect();
        assert_eq!(
            keys,
            vec![
                (Location::LfjAbove, Method::Std),
                (Location::WhDatum, Method::Max),
                (Location::WhDatum, Method::Std),
            ]
        );
        let wh_std = &groups[2].scatters[0].data;
        assert_eq!(
            wh_std,
            &vec![
                ScatterPoint { hs: 0.5, tp: 5.5, z: 1.0 },
                ScatterPoint { hs: 1.5, tp: 5.5, z: 3.0 },
            ]
        );
    }
}
