// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error types for the merge engine and record validation.

use crate::model::ResultType;
use thiserror::Error;

/// Errors raised while merging updates into a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// A new series was needed, no unit was supplied, and the result type has
    /// no default unit.
    #[error("no default unit for result type `{0}`")]
    NoDefaultUnit(ResultType),
}

/// A record field outside its domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// What is wrong with it.
    pub reason: String,
}

impl ValidationError {
    /// Build an error for `field`.
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Prefix the field path with `parent.`.
    pub fn nested(self, parent: &str) -> Self {
        Self {
            field: format!("{parent}.{}", self.field),
            reason: self.reason,
        }
    }
}
