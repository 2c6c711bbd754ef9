// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! HTTP service for seastate analysis results.
//!
//! [`app`] assembles the axum router: an unauthenticated `/ping` plus every
//! `/api` route behind [`auth::require_user`]. Handlers share an
//! [`AppState`] holding the document store and the authorizer; nothing is
//! global, so tests build as many independent apps as they like.
//!
//! Result updates are read-merge-replace cycles guarded by the document
//! version. A cycle that loses a race reloads and merges again.
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
    clippy::multiple_crate_versions,
    clippy::missing_errors_doc,
    clippy::use_self
)]

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

pub use auth::{AuthError, Authorizer, User};
pub use config::{load_service_config, Environment, ServiceConfig};
pub use error::ApiError;
pub use state::AppState;

/// The complete service router.
pub fn app(state: Arc<AppState>) -> Router {
    let api = routes::api_router().route_layer(from_fn_with_state(state.clone(), auth::require_user));
    Router::new()
        .route("/ping", get(|| async { Json("pong") }))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
