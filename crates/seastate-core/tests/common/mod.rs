// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code, clippy::unwrap_used)]

use seastate_core::{AnalysisDocument, Location, Method, PointUpdate, ResultType};
use serde_json::{json, Value};

/// Two wellhead bending-moment series with three points each.
pub fn fixture_json() -> Value {
    json!({
        "id": "683807f5-5823-49fe-95fb-f3a3a1cebdb4",
        "metadata": {
            "responsible_engineer": "jonny loggon",
            "project_id": 1001,
            "well": {
                "name": "wellewell",
                "well_boundary_type": "fixed",
                "location": {"longitude": 2.0, "latitude": 5.0},
                "stiffness": 0.0
            },
            "version": "testversion",
            "analysis_type": "string",
            "simulation_lenght": 1800.0,
            "water_depth": 150.0,
            "wave_direction": 55.0,
            "vessel_heading": 62.0,
            "current": "None",
            "vessel_id": "61ecac4b-b2ba-48cc-8646-fabb1e9fd44b",
            "xt": true,
            "soil_profile": "suppesoil1",
            "overpull": 490500.0,
            "drillpipe_tension": 738750.0,
            "offset_percent_of_wd": 0.0,
            "client": "acme"
        },
        "general_results": {"m_eq_dominant_direction": 1000.0},
        "all_seastate_results": [
            {
                "meta": {"location": "wh_datum", "result_type": "bending moment local x", "unit": "kNm"},
                "data": [
                    {"hs": 0.5, "tp": 5.5, "result": {
                        "summary_values": [{"method": "std", "value": 120.5}],
                        "time_series_id": "3fa85f64-5717-4562-b3fc-2c963f66afa1"}},
                    {"hs": 1.5, "tp": 5.5, "result": {
                        "summary_values": [{"method": "std", "value": 134.5}],
                        "time_series_id": "3fa85f64-5717-4562-b3fc-2c963f66afa2"}},
                    {"hs": 0.5, "tp": 2.5, "result": {
                        "summary_values": [{"method": "std", "value": 152.5}],
                        "time_series_id": "3fa85f64-5717-4562-b3fc-2c963f66afa3"}}
                ]
            },
            {
                "meta": {"location": "wh_datum", "result_type": "bending moment local y", "unit": "kNm"},
                "data": [
                    {"hs": 0.5, "tp": 5.5, "result": {
                        "summary_values": [{"method": "std", "value": 20.5}],
                        "time_series_id": "3fa85f64-5717-4562-b3fc-2c963f66afa4"}},
                    {"hs": 1.5, "tp": 5.5, "result": {
                        "summary_values": [
                            {"method": "std", "value": 34.5},
                            {"method": "min", "value": 40.5}
                        ],
                        "time_series_id": "3fa85f64-5717-4562-b3fc-2c963f66afa5"}},
                    {"hs": 0.5, "tp": 2.5, "result": {
                        "summary_values": [{"method": "std", "value": 52.5}],
                        "time_series_id": "3fa85f64-5717-4562-b3fc-2c963f66afa6"}}
                ]
            }
        ]
    })
}

pub fn fixture() -> AnalysisDocument {
    serde_json::from_value(fixture_json()).unwrap()
}

pub fn update(
    hs: f64,
    tp: f64,
    location: Location,
    result_type: ResultType,
    method: Method,
    value: f64,
) -> PointUpdate {
    PointUpdate {
        hs,
        tp,
        location,
        result_type,
        method,
        value,
    }
}
