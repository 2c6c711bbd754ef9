// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Seastate analysis results: typed records and the summary-result merge engine.
//!
//! An analysis document holds a list of result series, each keyed by
//! `(location, result_type)` and holding sea-state points keyed by `(hs, tp)`.
//! Every point carries at most one statistic per aggregation method.
//!
//! - [`merge`] folds point updates and time-series links into a document,
//!   creating series and points on demand.
//! - [`flatten`] derives the read-side views (flat rows, scatter groups, key
//!   and method sets, time-series index).
//! - [`summary`] renders listing rows across many documents.
//! - [`validate`] range-checks records at the service boundary.
//!
//! # Purity
//!
//! Nothing in this crate performs I/O. Every operation takes its input by
//! reference and returns an owned result; callers' documents are never
//! modified.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::module_name_repetitions,
    clippy::float_cmp,
    clippy::use_self
)]

pub mod error;
pub mod filter;
pub mod flatten;
pub mod merge;
pub mod model;
pub mod summary;
pub mod units;
pub mod validate;

pub use error::{MergeError, ValidationError};
pub use filter::{filter_records, find, Constraint, FieldValue, Fields, Matches};
pub use flatten::{
    available_methods, flatten, group_by_series_key, hs_tp_label, series_key_types,
    timeseries_index, FlatRow, Scatter, ScatterGroup, ScatterGroupMeta, ScatterPoint,
    TimeSeriesEntry,
};
pub use merge::{
    apply_point_update, apply_timeseries_link, apply_timeseries_links, apply_updates,
    upsert_method,
};
pub use model::{
    AnalysisDocument, AnalysisInput, AnalysisInputData, AnalysisMetadata, Current,
    GeneralResults, Location, LonLat, Method, PointResult, PointUpdate, ResultSeries, ResultType,
    SeaStatePoint, SeriesKey, SeriesMeta, Soil, SoilData, SoilSensitivity, SoilType, SoilVersion,
    Statistic, TimeSeriesLink, TimeSeriesLinkRequest, Unit, UpdateRequest, ValueWithUnit, Vessel,
    WellBoundaryType, WellDesignType, WellFeature, WellInfo,
};
pub use summary::{summarize, well_summary, SummaryLevel};
pub use units::{default_unit, resolve_unit};
pub use validate::Validate;
