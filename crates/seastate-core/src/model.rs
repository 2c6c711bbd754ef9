// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Typed analysis records.
//!
//! The store keeps schema-free JSON; these records are what the merge engine
//! and the read-side queries operate on once a document has crossed the
//! service boundary. Wire names match the stored JSON exactly.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a closed wire enumeration with a stable string form.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire spelling of the variant.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// Physical measurement position along the riser/well system.
    Location {
        /// Wellhead datum.
        WhDatum => "wh_datum",
        /// Below the lower flex joint.
        LfjBelow => "lfj_below",
        /// Above the lower flex joint.
        LfjAbove => "lfj_above",
        /// Above the upper flex joint.
        UfjAbove => "ufj_above",
        /// Below the upper flex joint.
        UfjBelow => "ufj_below",
        /// Rig center.
        RigCenter => "rig_center",
        /// Rig rotary kelly bushing.
        RigRkb => "rig_rkb",
    }
}

wire_enum! {
    /// Physical quantity reported by a result series.
    ResultType {
        /// Vessel heave motion.
        VesselHeave => "vessel heave",
        /// Vessel surge motion.
        VesselSurge => "vessel surge",
        /// Vessel sway motion.
        VesselSway => "vessel sway",
        /// Vessel roll motion.
        VesselRoll => "vessel roll",
        /// Vessel pitch motion.
        VesselPitch => "vessel pitch",
        /// Vessel yaw motion.
        VesselYaw => "vessel yaw",
        /// Rotation about x.
        AngleRx => "angle rx",
        /// Rotation about y.
        AngleRy => "angle ry",
        /// Rotation about z.
        AngleRz => "angle rz",
        /// Bending moment about local x.
        BendingMomentLocalX => "bending moment local x",
        /// Bending moment about local y.
        BendingMomentLocalY => "bending moment local y",
        /// Bending moment in the dominant direction.
        BendingMomentDominantDirection => "bending moment dominant direction",
        /// Shear force along local x.
        ShearForceLocalX => "shear force local x",
        /// Shear force along local y.
        ShearForceLocalY => "shear force local y",
        /// Shear force in the dominant direction.
        ShearForceDominantDirection => "shear force dominant direction",
        /// Effective tension.
        EffectiveTension => "effective tension",
        /// Displacement along x.
        DisplacementX => "displacement x",
        /// Displacement along y.
        DisplacementY => "displacement y",
        /// Displacement along z.
        DisplacementZ => "displacement z",
        /// Position along x.
        PositionX => "position x",
        /// Position along y.
        PositionY => "position y",
        /// Position along z.
        PositionZ => "position z",
        /// Velocity along x.
        VelocityX => "velocity x",
        /// Velocity along y.
        VelocityY => "velocity y",
        /// Velocity along z.
        VelocityZ => "velocity z",
    }
}

wire_enum! {
    /// Physical unit of a result series or an input value.
    Unit {
        /// Metres.
        Metre => "m",
        /// Newtons.
        Newton => "N",
        /// Kilonewtons.
        KiloNewton => "kN",
        /// Newton metres.
        NewtonMetre => "Nm",
        /// Kilonewton metres.
        KiloNewtonMetre => "kNm",
        /// Degrees.
        Degree => "deg",
        /// Radians.
        Radian => "rad",
        /// Metres per second.
        MetrePerSecond => "m/s",
    }
}

wire_enum! {
    /// Statistical aggregation applied to a simulated time series.
    Method {
        /// Standard deviation.
        Std => "std",
        /// Maximum.
        Max => "max",
        /// Minimum.
        Min => "min",
        /// Mean.
        Mean => "mean",
        /// Damage-equivalent moment.
        MEq => "m_eq",
    }
}

wire_enum! {
    /// Current condition applied in the analysis.
    Current {
        /// No current.
        Calm => "None",
        /// One-year return period.
        OneYear => "1yr",
        /// Ten-year return period.
        TenYear => "10yr",
        /// 10th percentile.
        P10 => "10pct",
        /// 25th percentile.
        P25 => "25pct",
        /// 75th percentile.
        P75 => "75pct",
        /// 90th percentile.
        P90 => "90pct",
        /// Median.
        Median => "median",
    }
}

wire_enum! {
    /// How the well is represented at the lower boundary.
    WellBoundaryType {
        /// Fixed at the wellhead.
        Fixed => "fixed",
        /// Well modelled explicitly.
        WellIncluded => "well_included",
        /// Rotational spring.
        RotationalSpring => "rotational_spring",
    }
}

wire_enum! {
    /// Structural design of the well.
    WellDesignType {
        /// Suction can.
        Can => "can",
        /// Satellite well.
        Satelite => "satelite",
        /// Template well.
        Template => "template",
    }
}

wire_enum! {
    /// Load-relief feature installed on the well.
    WellFeature {
        /// Wellhead load relief.
        Wlr => "wlr",
        /// Riser flex joint.
        Rfj => "rfj",
    }
}

wire_enum! {
    /// Soil model family.
    SoilType {
        /// API soil curves.
        Api => "api",
        /// Jeanjean soil curves.
        Jeanjean => "jeanjean",
        /// Zakeri soil curves.
        Zakeri => "zakeri",
    }
}

wire_enum! {
    /// Soil parameter estimate.
    SoilVersion {
        /// High estimate.
        High => "high",
        /// Low estimate.
        Low => "low",
        /// Best estimate.
        Best => "best",
    }
}

wire_enum! {
    /// Dominant soil behaviour.
    SoilSensitivity {
        /// Clay.
        Clay => "clay",
        /// Sand.
        Sand => "sand",
    }
}

/// One named statistic of a sea-state point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistic {
    /// Aggregation method.
    pub method: Method,
    /// Statistic value.
    pub value: f64,
}

impl Statistic {
    /// Convenience constructor.
    pub fn new(method: Method, value: f64) -> Self {
        Self { method, value }
    }
}

/// Results recorded for one environmental condition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointResult {
    /// At most one entry per method.
    #[serde(default)]
    pub summary_values: Vec<Statistic>,
    /// Reference to an external raw time-series record.
    #[serde(default)]
    pub time_series_id: Option<String>,
}

/// One environmental condition within a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeaStatePoint {
    /// Significant wave height.
    pub hs: f64,
    /// Peak wave period.
    pub tp: f64,
    /// Statistics and time-series reference.
    pub result: PointResult,
}

/// Identity and unit of a result series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesMeta {
    /// Measurement position.
    pub location: Location,
    /// Physical quantity.
    pub result_type: ResultType,
    /// Unit of every value in the series.
    pub unit: Unit,
}

/// All sea-state points for one `(location, result_type)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSeries {
    /// Series identity.
    pub meta: SeriesMeta,
    /// Points in insertion order.
    #[serde(default)]
    pub data: Vec<SeaStatePoint>,
}

/// Natural key of a result series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    /// Measurement position.
    pub location: Location,
    /// Physical quantity.
    pub result_type: ResultType,
}

impl SeriesKey {
    /// The `location__result_type` string used as a map key on the wire.
    pub fn wire_key(&self) -> String {
        format!("{}__{}", self.location, self.result_type)
    }
}

impl ResultSeries {
    /// Natural key of this series.
    pub fn key(&self) -> SeriesKey {
        SeriesKey {
            location: self.meta.location,
            result_type: self.meta.result_type,
        }
    }
}

/// Geographic position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    /// Degrees east, in `[-180, 180]`.
    pub longitude: f64,
    /// Degrees north, in `[-90, 90]`.
    pub latitude: f64,
}

/// Soil description attached to a well.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SoilData {
    /// Soil model family.
    #[serde(default)]
    pub soil_type: Option<SoilType>,
    /// Parameter estimate.
    #[serde(default)]
    pub soil_version: Option<SoilVersion>,
    /// Dominant behaviour.
    #[serde(default)]
    pub soil_sensitivity: Option<SoilSensitivity>,
}

/// Well description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellInfo {
    /// Well name.
    #[serde(default)]
    pub name: Option<String>,
    /// Lower boundary representation.
    pub well_boundary_type: WellBoundaryType,
    /// Structural design.
    #[serde(default)]
    pub design_type: Option<WellDesignType>,
    /// Geographic position.
    #[serde(default)]
    pub location: Option<LonLat>,
    /// Rotational stiffness, non-negative.
    pub stiffness: f64,
    /// Installed load-relief feature.
    #[serde(default)]
    pub feature: Option<WellFeature>,
    /// Soil description.
    #[serde(default)]
    pub soil: Option<SoilData>,
}

/// Engineering metadata of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Responsible engineer.
    pub responsible_engineer: String,
    /// Project number, above 1000.
    pub project_id: i64,
    /// Well description.
    pub well: WellInfo,
    /// Analysis version label.
    pub version: String,
    /// Free-form analysis type.
    pub analysis_type: String,
    /// Simulated duration in seconds.
    #[serde(alias = "simulation_lenght")]
    pub simulation_length: f64,
    /// Water depth in metres.
    pub water_depth: f64,
    /// Wave direction in degrees.
    pub wave_direction: f64,
    /// Vessel heading in degrees.
    pub vessel_heading: f64,
    /// Current condition.
    pub current: Current,
    /// Id of the vessel document.
    pub vessel_id: String,
    /// Whether a christmas tree is installed.
    pub xt: bool,
    /// Soil profile label.
    pub soil_profile: String,
    /// Overpull.
    pub overpull: f64,
    /// Drill pipe tension.
    pub drillpipe_tension: f64,
    /// Free-form comment.
    #[serde(default)]
    pub comment: Option<String>,
    /// Vessel offset as a percentage of water depth.
    pub offset_percent_of_wd: f64,
    /// Client name.
    pub client: String,
}

/// Scalar summary quantities of an analysis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeneralResults {
    /// Damage-equivalent moment in the dominant direction.
    #[serde(default)]
    pub m_eq_dominant_direction: Option<f64>,
    /// Extreme moment while drilling.
    #[serde(default)]
    pub m_extreme_drilling: Option<f64>,
    /// Extreme moment while not drilling.
    #[serde(default)]
    pub m_extreme_nondrilling: Option<f64>,
}

/// Root aggregate stored in the `analyses` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDocument {
    /// Store-assigned identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Engineering metadata.
    pub metadata: AnalysisMetadata,
    /// Scalar summary quantities.
    #[serde(default)]
    pub general_results: GeneralResults,
    /// Result series in insertion order.
    #[serde(default)]
    pub all_seastate_results: Vec<ResultSeries>,
}

/// One statistic update addressed by its full natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointUpdate {
    /// Significant wave height.
    pub hs: f64,
    /// Peak wave period.
    pub tp: f64,
    /// Measurement position.
    pub location: Location,
    /// Physical quantity.
    pub result_type: ResultType,
    /// Aggregation method.
    pub method: Method,
    /// New value.
    pub value: f64,
}

/// Batch of statistic updates for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// Analysis document id.
    pub id: Uuid,
    /// Updates applied in order.
    pub updates: Vec<PointUpdate>,
}

/// Attaches a raw time-series reference to a sea-state point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesLink {
    /// Significant wave height.
    pub hs: f64,
    /// Peak wave period.
    pub tp: f64,
    /// Measurement position.
    pub location: Location,
    /// Physical quantity.
    pub result_type: ResultType,
    /// External time-series id.
    pub time_series_id: String,
    /// Unit used if a new series has to be created.
    #[serde(default)]
    pub unit: Option<Unit>,
}

/// Batch of time-series links for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesLinkRequest {
    /// Analysis document id.
    pub id: Uuid,
    /// Links applied in order.
    pub links: Vec<TimeSeriesLink>,
}

/// Vessel record stored in the `vessels` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Vessel {
    /// Store-assigned identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Vessel name.
    pub name: String,
    /// IMO number.
    pub imo: i64,
    /// Year of construction.
    #[serde(default)]
    pub year_built: Option<i64>,
}

/// Soil record stored in the `soil` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Soil {
    /// Store-assigned identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Soil profile name.
    pub name: String,
}

/// A scalar with its unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValueWithUnit {
    /// Magnitude.
    pub value: f64,
    /// Unit of `value`.
    pub unit: Unit,
}

/// Model inputs captured for an analysis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisInputData {
    /// Target overpull.
    #[serde(default)]
    pub target_overpull: Option<ValueWithUnit>,
    /// BOP height above the wellhead.
    #[serde(default, rename = "bop_L2")]
    pub bop_l2: Option<ValueWithUnit>,
    /// Submerged weight of the LMRP.
    #[serde(default)]
    pub lmrp_submerged_weight: Option<ValueWithUnit>,
    /// Flex joint rotational stiffness.
    #[serde(default)]
    pub flex_joint_stiffness: Option<ValueWithUnit>,
    /// Riser adapter outer diameter.
    #[serde(default, rename = "OD_riser_adapter")]
    pub od_riser_adapter: Option<ValueWithUnit>,
    /// Riser adapter inner diameter.
    #[serde(default, rename = "ID_riser_adapter")]
    pub id_riser_adapter: Option<ValueWithUnit>,
}

/// Analysis input record stored in the `analysis_input` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisInput {
    /// Store-assigned identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Vessel the inputs belong to.
    pub vessel_id: Uuid,
    /// Where the raw input file lives.
    pub input_data_file_location: String,
    /// Riser tally sheet name.
    #[serde(default)]
    pub tally_sheet_name: Option<String>,
    /// Free-form comments.
    #[serde(default)]
    pub comments: Option<String>,
    /// Captured input values.
    #[serde(default)]
    pub data: Option<AnalysisInputData>,
}
