// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Store and patch errors.

use thiserror::Error;

/// Errors returned by [`DocumentStore`](crate::DocumentStore) implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No document with this id in the collection.
    #[error("document `{id}` not found in `{collection}`")]
    NotFound {
        /// Collection name.
        collection: String,
        /// Requested id.
        id: String,
    },
    /// The stored version differs from the one the caller expected.
    #[error("document `{id}` in `{collection}` is at version {actual}, expected {expected}")]
    Conflict {
        /// Collection name.
        collection: String,
        /// Document id.
        id: String,
        /// Version the caller loaded.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },
    /// Collection or id contains characters the store cannot address.
    #[error("invalid key `{0}`")]
    InvalidKey(String),
    /// Document bodies must be JSON objects.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    /// A lock holder panicked.
    #[error("store lock poisoned")]
    Poisoned,
    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Stored bytes are not a valid document record.
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

/// Errors raised while applying a JSON patch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// Path is not a JSON pointer.
    #[error("invalid JSON pointer `{0}`")]
    InvalidPointer(String),
    /// Path does not resolve inside the document.
    #[error("path `{0}` does not exist")]
    PathNotFound(String),
    /// Path addresses a field that may not change.
    #[error("`{0}` cannot be modified")]
    ImmutableField(String),
    /// `add` or `replace` without a `value`.
    #[error("`{op}` at `{path}` requires a value")]
    MissingValue {
        /// Operation name.
        op: &'static str,
        /// Target path.
        path: String,
    },
    /// Array index is malformed or out of bounds.
    #[error("invalid array index at `{0}`")]
    InvalidIndex(String),
}
