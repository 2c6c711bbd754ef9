// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Domain-range checks for records entering the service.
//!
//! Structure (required keys, enum membership, unknown fields) is enforced by
//! deserialization; this module covers the numeric and non-empty constraints
//! that serde cannot express. Each check reports the first violation only.

use crate::error::ValidationError;
use crate::model::{
    AnalysisDocument, AnalysisInput, AnalysisMetadata, GeneralResults, LonLat, PointUpdate,
    ResultSeries, Soil, TimeSeriesLink, TimeSeriesLinkRequest, UpdateRequest, Vessel, WellInfo,
};

/// A record whose fields can be range-checked.
pub trait Validate {
    /// `Ok` when every field is inside its domain.
    fn validate(&self) -> Result<(), ValidationError>;
}

fn finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new(field, "must be a finite number"))
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new(field, "must be greater than 0"))
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), ValidationError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new(field, "must be greater than or equal to 0"))
    }
}

fn within(field: &str, value: f64, lo: f64, hi: f64) -> Result<(), ValidationError> {
    finite(field, value)?;
    if (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            format!("must be between {lo} and {hi}"),
        ))
    }
}

fn non_empty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(ValidationError::new(field, "must not be empty"))
    } else {
        Ok(())
    }
}

impl Validate for LonLat {
    fn validate(&self) -> Result<(), ValidationError> {
        within("longitude", self.longitude, -180.0, 180.0)?;
        within("latitude", self.latitude, -90.0, 90.0)
    }
}

impl Validate for WellInfo {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            non_empty("name", name)?;
        }
        if let Some(location) = &self.location {
            location.validate().map_err(|e| e.nested("location"))?;
        }
        non_negative("stiffness", self.stiffness)
    }
}

impl Validate for AnalysisMetadata {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.project_id <= 1000 {
            return Err(ValidationError::new("project_id", "must be greater than 1000"));
        }
        self.well.validate().map_err(|e| e.nested("well"))?;
        non_empty("version", &self.version)?;
        positive("simulation_length", self.simulation_length)?;
        positive("water_depth", self.water_depth)?;
        within("wave_direction", self.wave_direction, 0.0, 360.0)?;
        within("vessel_heading", self.vessel_heading, 0.0, 360.0)?;
        non_empty("soil_profile", &self.soil_profile)?;
        non_negative("overpull", self.overpull)?;
        non_negative("drillpipe_tension", self.drillpipe_tension)?;
        non_negative("offset_percent_of_wd", self.offset_percent_of_wd)?;
        non_empty("client", &self.client)
    }
}

impl Validate for GeneralResults {
    fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("m_eq_dominant_direction", self.m_eq_dominant_direction),
            ("m_extreme_drilling", self.m_extreme_drilling),
            ("m_extreme_nondrilling", self.m_extreme_nondrilling),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                non_negative(field, value)?;
            }
        }
        Ok(())
    }
}

impl Validate for ResultSeries {
    fn validate(&self) -> Result<(), ValidationError> {
        for (i, point) in self.data.iter().enumerate() {
            let at = |e: ValidationError| e.nested(&format!("data[{i}]"));
            positive("hs", point.hs).map_err(at)?;
            positive("tp", point.tp).map_err(at)?;
            for (j, stat) in point.result.summary_values.iter().enumerate() {
                finite("value", stat.value)
                    .map_err(|e| at(e.nested(&format!("result.summary_values[{j}]"))))?;
            }
        }
        Ok(())
    }
}

impl Validate for AnalysisDocument {
    fn validate(&self) -> Result<(), ValidationError> {
        self.metadata.validate().map_err(|e| e.nested("metadata"))?;
        self.general_results
            .validate()
            .map_err(|e| e.nested("general_results"))?;
        for (i, series) in self.all_seastate_results.iter().enumerate() {
            series
                .validate()
                .map_err(|e| e.nested(&format!("all_seastate_results[{i}]")))?;
        }
        Ok(())
    }
}

impl Validate for PointUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        positive("hs", self.hs)?;
        positive("tp", self.tp)?;
        finite("value", self.value)
    }
}

impl Validate for UpdateRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        for (i, update) in self.updates.iter().enumerate() {
            update
                .validate()
                .map_err(|e| e.nested(&format!("updates[{i}]")))?;
        }
        Ok(())
    }
}

impl Validate for TimeSeriesLink {
    fn validate(&self) -> Result<(), ValidationError> {
        positive("hs", self.hs)?;
        positive("tp", self.tp)?;
        non_empty("time_series_id", &self.time_series_id)
    }
}

impl Validate for TimeSeriesLinkRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        for (i, link) in self.links.iter().enumerate() {
            link.validate()
                .map_err(|e| e.nested(&format!("links[{i}]")))?;
        }
        Ok(())
    }
}

impl Validate for Vessel {
    fn validate(&self) -> Result<(), ValidationError> {
        non_empty("name", &self.name)?;
        if self.imo <= 0 {
            return Err(ValidationError::new("imo", "must be greater than 0"));
        }
        match self.year_built {
            Some(year) if year <= 0 => Err(ValidationError::new(
                "year_built",
                "must be greater than 0",
            )),
            _ => Ok(()),
        }
    }
}

impl Validate for Soil {
    fn validate(&self) -> Result<(), ValidationError> {
        non_empty("name", &self.name)
    }
}

impl Validate for AnalysisInput {
    fn validate(&self) -> Result<(), ValidationError> {
        let Some(data) = &self.data else {
            return Ok(());
        };
        let values = [
            ("target_overpull", &data.target_overpull),
            ("bop_L2", &data.bop_l2),
            ("lmrp_submerged_weight", &data.lmrp_submerged_weight),
            ("flex_joint_stiffness", &data.flex_joint_stiffness),
            ("OD_riser_adapter", &data.od_riser_adapter),
            ("ID_riser_adapter", &data.id_riser_adapter),
        ];
        for (field, value) in values {
            if let Some(v) = value {
                finite("value", v.value).map_err(|e| e.nested(&format!("data.{field}")))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Location, Method, ResultType};

    fn update(hs: f64, tp: f64, value: f64) -> PointUpdate {
        PointUpdate {
            hs,
            tp,
            location: Location::WhDatum,
            result_type: ResultType::AngleRx,
            method: Method::Std,
            value,
        }
    }

    #[test]
    fn update_bounds() {
        assert!(update(0.5, 5.5, -3.0).validate().is_ok());
        assert_eq!(update(0.0, 5.5, 1.0).validate().unwrap_err().field, "hs");
        assert_eq!(update(0.5, -1.0, 1.0).validate().unwrap_err().field, "tp");
        assert_eq!(
            update(0.5, 5.5, f64::NAN).validate().unwrap_err().field,
            "value"
        );
    }

    #[test]
    fn nested_field_paths() {
        let req = UpdateRequest {
            id: uuid::Uuid::nil(),
            updates: vec![update(0.5, 5.5, 1.0), update(0.5, 0.0, 1.0)],
        };
        assert_eq!(req.validate().unwrap_err().field, "updates[1].tp");
    }

    #[test]
    fn vessel_rules() {
        let vessel = Vessel {
            id: None,
            name: "Deep Explorer".into(),
            imo: 9_000_001,
            year_built: Some(2011),
        };
        assert!(vessel.validate().is_ok());
        let nameless = Vessel {
            name: String::new(),
            ..vessel.clone()
        };
        assert_eq!(nameless.validate().unwrap_err().field, "name");
        let bad_imo = Vessel { imo: 0, ..vessel };
        assert_eq!(bad_imo.validate().unwrap_err().field, "imo");
    }
}
