// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory document store.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::{check_key, check_version, not_found, with_id, DocumentStore, StoreError, Versioned};

type Collection = BTreeMap<String, Versioned<Value>>;

/// Document store held entirely in process memory.
///
/// Collections are `BTreeMap`s so listing comes out id-ordered without a
/// sort. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, collection: &str, id: &str) -> Result<Versioned<Value>, StoreError> {
        let guard = self.collections.read().map_err(|_| StoreError::Poisoned)?;
        guard
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
            .ok_or_else(|| not_found(collection, id))
    }

    fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let guard = self.collections.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard
            .get(collection)
            .map(|docs| docs.values().map(|v| v.body.clone()).collect())
            .unwrap_or_default())
    }

    fn create(&self, collection: &str, body: Value) -> Result<Versioned<Value>, StoreError> {
        check_key(collection)?;
        let id = Uuid::new_v4().to_string();
        let entry = Versioned {
            version: 1,
            body: with_id(body, &id)?,
        };
        let mut guard = self.collections.write().map_err(|_| StoreError::Poisoned)?;
        guard
            .entry(collection.to_owned())
            .or_default()
            .insert(id.clone(), entry.clone());
        debug!(collection, id = %id, "document created");
        Ok(entry)
    }

    fn replace(
        &self,
        collection: &str,
        id: &str,
        body: Value,
        expected_version: Option<u64>,
    ) -> Result<Versioned<Value>, StoreError> {
        let body = with_id(body, id)?;
        let mut guard = self.collections.write().map_err(|_| StoreError::Poisoned)?;
        let slot = guard
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| not_found(collection, id))?;
        check_version(collection, id, expected_version, slot.version)?;
        *slot = Versioned {
            version: slot.version + 1,
            body,
        };
        debug!(collection, id, version = slot.version, "document replaced");
        Ok(slot.clone())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut guard = self.collections.write().map_err(|_| StoreError::Poisoned)?;
        guard
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .ok_or_else(|| not_found(collection, id))?;
        debug!(collection, id, "document deleted");
        Ok(())
    }
}
