// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tabular listings over every stored analysis.
//!
//! Rows are plain JSON objects so that the `detailed` and `full` levels can
//! splice metadata and general results into one flat record.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::model::{AnalysisDocument, WellInfo};

/// How much of each analysis a summary row carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLevel {
    /// Headline columns plus a human-readable well description.
    #[default]
    Simple,
    /// Engineering columns plus general results.
    Detailed,
    /// Every metadata field plus general results.
    Full,
}

fn or_none<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "None".to_owned(), |v| v.to_string())
}

/// Multi-line `key: value` description of a well.
pub fn well_summary(well: &WellInfo) -> String {
    let soil = well.soil.as_ref().map_or_else(
        || "soil-type: None\n".to_owned(),
        |soil| {
            format!(
                "soil-type: {}\nsoil-version: {}\nsoil-sensitivity: {}\n",
                or_none(soil.soil_type),
                or_none(soil.soil_version),
                or_none(soil.soil_sensitivity),
            )
        },
    );
    format!(
        "name: {}\nboundary-type: {}\nwell-design-type: {}\nwell-stiffness: {}\nsupport-feature: {}\n{soil}",
        or_none(well.name.as_deref()),
        well.well_boundary_type,
        or_none(well.design_type),
        well.stiffness,
        or_none(well.feature),
    )
}

/// Present general results as an object, omitting absent quantities.
fn general_results_fields(document: &AnalysisDocument) -> Map<String, Value> {
    let g = &document.general_results;
    [
        ("m_eq_dominant_direction", g.m_eq_dominant_direction),
        ("m_extreme_drilling", g.m_extreme_drilling),
        ("m_extreme_nondrilling", g.m_extreme_nondrilling),
    ]
    .into_iter()
    .filter_map(|(k, v)| v.map(|v| (k.to_owned(), json!(v))))
    .collect()
}

fn simple_row(document: &AnalysisDocument, vessel: Option<&String>) -> Value {
    let m = &document.metadata;
    json!({
        "id": document.id,
        "analysis_type": m.analysis_type,
        "water_depth": m.water_depth,
        "vessel": vessel,
        "project_id": m.project_id,
        "well_name": m.well.name,
        "version": m.version,
        "wave_direction_relative_to_rig": (m.wave_direction - m.vessel_heading).abs(),
        "current": m.current,
        "xt": if m.xt { "Yes" } else { "No" },
        "overpull": m.overpull,
        "well_data": well_summary(&m.well),
        "comment": m.comment,
        "client": m.client,
        "m_eq_dominant_direction": document.general_results.m_eq_dominant_direction,
    })
}

fn detailed_row(document: &AnalysisDocument, vessel: Option<&String>) -> Value {
    let m = &document.metadata;
    let mut row = json!({
        "id": document.id,
        "analysis_type": m.analysis_type,
        "water_depth": m.water_depth,
        "vessel": vessel,
        "project_id": m.project_id,
        "well_name": m.well.name,
        "wave_direction": m.wave_direction,
        "vessel_heading": m.vessel_heading,
        "current": m.current,
        "xt": m.xt,
        "overpull": m.overpull,
        "drillpipe_tension": m.drillpipe_tension,
        "comment": m.comment,
        "offset_percent_of_wd": m.offset_percent_of_wd,
        "client": m.client,
        "well_boundary_type": m.well.well_boundary_type,
    });
    if let Some(obj) = row.as_object_mut() {
        obj.extend(general_results_fields(document));
    }
    row
}

fn full_row(document: &AnalysisDocument) -> Value {
    let mut row = Map::new();
    row.insert("id".to_owned(), json!(document.id));
    if let Value::Object(metadata) = json!(document.metadata) {
        row.extend(metadata);
    }
    row.extend(general_results_fields(document));
    Value::Object(row)
}

/// One row per document, in input order.
///
/// `vessel_names` maps vessel ids to names; an unknown `vessel_id` yields a
/// `null` vessel column.
pub fn summarize(
    documents: &[AnalysisDocument],
    vessel_names: &BTreeMap<String, String>,
    level: SummaryLevel,
) -> Vec<Value> {
    documents
        .iter()
        .map(|doc| {
            let vessel = vessel_names.get(&doc.metadata.vessel_id);
            match level {
                SummaryLevel::Simple => simple_row(doc, vessel),
                SummaryLevel::Detailed => detailed_row(doc, vessel),
                SummaryLevel::Full => full_row(doc),
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn document() -> AnalysisDocument {
        serde_json::from_value(json!({
            "id": "a1",
            "metadata": {
                "responsible_engineer": "kari",
                "project_id": 1234,
                "well": {
                    "name": "W-1",
                    "well_boundary_type": "fixed",
                    "stiffness": 0.0,
                    "soil": {"soil_type": "api"}
                },
                "version": "v1",
                "analysis_type": "fatigue",
                "simulation_lenght": 3600.0,
                "water_depth": 350.0,
                "wave_direction": 30.0,
                "vessel_heading": 90.0,
                "current": "1yr",
                "vessel_id": "v-1",
                "xt": true,
                "soil_profile": "clay-1",
                "overpull": 50.0,
                "drillpipe_tension": 10.0,
                "offset_percent_of_wd": 2.0,
                "client": "acme"
            },
            "general_results": {"m_eq_dominant_direction": 12.5}
        }))
        .unwrap()
    }

    fn vessels() -> BTreeMap<String, String> {
        BTreeMap::from([("v-1".to_owned(), "Deep Explorer".to_owned())])
    }

    #[test]
    fn simple_row_columns() {
        let rows = summarize(&[document()], &vessels(), SummaryLevel::Simple);
        let row = &rows[0];
        assert_eq!(row["vessel"], "Deep Explorer");
        assert_eq!(row["wave_direction_relative_to_rig"], 60.0);
        assert_eq!(row["xt"], "Yes");
        assert_eq!(row["current"], "1yr");
        assert_eq!(row["m_eq_dominant_direction"], 12.5);
        assert!(row["comment"].is_null());
        let well = row["well_data"].as_str().unwrap();
        assert!(well.starts_with("name: W-1\nboundary-type: fixed\n"));
        assert!(well.contains("soil-type: api\nsoil-version: None\n"));
    }

    #[test]
    fn well_summary_lists_each_line_once() {
        let mut well = document().metadata.well;
        assert_eq!(
            well_summary(&well),
            "name: W-1\nboundary-type: fixed\nwell-design-type: None\nwell-stiffness: 0\n\
             support-feature: None\nsoil-type: api\nsoil-version: None\nsoil-sensitivity: None\n"
        );
        well.soil = None;
        assert!(well_summary(&well).ends_with("support-feature: None\nsoil-type: None\n"));
    }

    #[test]
    fn unknown_vessel_is_null() {
        let rows = summarize(&[document()], &BTreeMap::new(), SummaryLevel::Detailed);
        assert!(rows[0]["vessel"].is_null());
        assert_eq!(rows[0]["xt"], true);
        assert_eq!(rows[0]["well_boundary_type"], "fixed");
        assert_eq!(rows[0]["m_eq_dominant_direction"], 12.5);
        assert!(rows[0].get("m_extreme_drilling").is_none());
    }

    #[test]
    fn full_row_flattens_metadata() {
        let rows = summarize(&[document()], &vessels(), SummaryLevel::Full);
        let row = rows[0].as_object().unwrap();
        assert_eq!(row["id"], "a1");
        assert_eq!(row["simulation_length"], 3600.0);
        assert_eq!(row["responsible_engineer"], "kari");
        assert_eq!(row["m_eq_dominant_direction"], 12.5);
        assert!(row.contains_key("well"));
    }

    #[test]
    fn level_defaults_to_simple() {
        assert_eq!(SummaryLevel::default(), SummaryLevel::Simple);
        let level: SummaryLevel = serde_json::from_value(json!("detailed")).unwrap();
        assert_eq!(level, SummaryLevel::Detailed);
    }
}
