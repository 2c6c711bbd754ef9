// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Versioned JSON document store for the seastate service.
//!
//! `seastate-store` provides the [`DocumentStore`] port plus two adapters:
//! [`MemoryStore`] for tests and ephemeral runs, and [`FsStore`] which keeps
//! one JSON file per document.
//!
//! # Versions
//!
//! Every stored document carries a version that starts at 1 and increases by
//! one on each replace. [`DocumentStore::replace`] accepts the version the
//! caller last saw and refuses to overwrite a newer one. This is what keeps
//! concurrent read-merge-write cycles from losing updates.
//!
//! # Ids
//!
//! `create` assigns a v4 uuid and writes it into the body's `id` field;
//! `replace` forces the same field to the addressed id. Bodies must be JSON
//! objects.
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
    clippy::use_self
)]

mod disk;
mod error;
mod memory;
mod patch;

pub use disk::FsStore;
pub use error::{PatchError, StoreError};
pub use memory::MemoryStore;
pub use patch::{apply_patch, PatchOp, PatchOperation};

use seastate_core::filter::{filter_records, Constraint};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A document body paired with its store version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioned<T> {
    /// Monotonic per-document counter, starting at 1.
    pub version: u64,
    /// Document body.
    pub body: T,
}

/// Port for schema-free document collections.
///
/// Collections spring into existence on first write; listing or querying an
/// unknown collection yields nothing.
pub trait DocumentStore: Send + Sync {
    /// Fetch one document.
    fn get(&self, collection: &str, id: &str) -> Result<Versioned<Value>, StoreError>;

    /// Every document of `collection`, ordered by id.
    fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError>;

    /// Insert `body` under a fresh id.
    fn create(&self, collection: &str, body: Value) -> Result<Versioned<Value>, StoreError>;

    /// Overwrite an existing document.
    ///
    /// With `expected_version`, fails with [`StoreError::Conflict`] unless the
    /// stored version equals it.
    fn replace(
        &self,
        collection: &str,
        id: &str,
        body: Value,
        expected_version: Option<u64>,
    ) -> Result<Versioned<Value>, StoreError>;

    /// Remove one document.
    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Documents whose fields (or `sub_level` mapping) satisfy `constraints`.
    fn query(
        &self,
        collection: &str,
        constraints: &[Constraint<'_>],
        sub_level: Option<&str>,
    ) -> Result<Vec<Value>, StoreError> {
        let documents = self.list(collection)?;
        Ok(filter_records(&documents, constraints, sub_level)
            .into_iter()
            .map(|(_, doc)| doc.clone())
            .collect())
    }
}

/// Collections and ids are restricted to `[A-Za-z0-9_-]` so they can double
/// as file names.
pub(crate) fn check_key(key: &str) -> Result<(), StoreError> {
    let ok = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_owned()))
    }
}

/// Ensure `body` is an object and stamp `id` into it.
pub(crate) fn with_id(mut body: Value, id: &str) -> Result<Value, StoreError> {
    let Some(map) = body.as_object_mut() else {
        return Err(StoreError::InvalidDocument(
            "document body must be a JSON object".into(),
        ));
    };
    map.insert("id".to_owned(), Value::String(id.to_owned()));
    Ok(body)
}

pub(crate) fn not_found(collection: &str, id: &str) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_owned(),
        id: id.to_owned(),
    }
}

pub(crate) fn check_version(
    collection: &str,
    id: &str,
    expected: Option<u64>,
    actual: u64,
) -> Result<(), StoreError> {
    match expected {
        Some(expected) if expected != actual => Err(StoreError::Conflict {
            collection: collection.to_owned(),
            id: id.to_owned(),
            expected,
            actual,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_are_path_safe() {
        assert!(check_key("analysis_input").is_ok());
        assert!(check_key("683807f5-5823-49fe-95fb-f3a3a1cebdb4").is_ok());
        assert!(check_key("").is_err());
        assert!(check_key("../etc").is_err());
        assert!(check_key("a/b").is_err());
    }

    #[test]
    fn with_id_overwrites_and_rejects_non_objects() {
        let body = with_id(json!({"id": "old", "name": "x"}), "new").unwrap();
        assert_eq!(body, json!({"id": "new", "name": "x"}));
        assert!(matches!(
            with_id(json!([1, 2]), "new"),
            Err(StoreError::InvalidDocument(_))
        ));
    }
}
